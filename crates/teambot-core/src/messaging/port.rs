use async_trait::async_trait;

use crate::domain::ChatId;

/// Parse mode for outbound messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormattingMode {
    Plain,
    Markdown,
}

/// Failure of a single outbound send.
///
/// All transport causes (network error, blocked recipient, invalid address)
/// are deliberately coalesced into one category; the dispatcher counts
/// failures, it does not distinguish them.
#[derive(Debug, thiserror::Error)]
#[error("send failed: {0}")]
pub struct SendError(pub String);

/// Outbound message transport.
///
/// Telegram is the first implementation; the shape is small enough that a
/// Slack or Discord adapter fits behind it unchanged.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(
        &self,
        to: ChatId,
        text: &str,
        mode: FormattingMode,
    ) -> Result<(), SendError>;
}
