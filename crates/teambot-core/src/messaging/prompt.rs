use async_trait::async_trait;

use crate::{broadcast::scope::ScopeKind, domain::ChatId, Result};

/// A named action attached to a prompt. The adapter decides how these are
/// presented (inline keyboard buttons on Telegram).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Confirm,
    Edit,
    Cancel,
    /// Restart the flow after a failed dispatch.
    Retry(ScopeKind),
    /// Start another broadcast right after a completed one.
    NewBroadcast(ScopeKind),
    BackToMenu,
}

impl MenuAction {
    pub fn label(self) -> &'static str {
        match self {
            MenuAction::Confirm => "✅ Send",
            MenuAction::Edit => "✏️ Edit text",
            MenuAction::Cancel => "❌ Cancel",
            MenuAction::Retry(_) => "🔄 Try again",
            MenuAction::NewBroadcast(_) => "📨 New broadcast",
            MenuAction::BackToMenu => "◀️ Back to menu",
        }
    }
}

/// Instructional / preview / report text with attached actions.
#[derive(Clone, Debug)]
pub struct Prompt {
    pub text: String,
    pub actions: Vec<MenuAction>,
}

impl Prompt {
    pub fn new(text: impl Into<String>, actions: Vec<MenuAction>) -> Self {
        Self {
            text: text.into(),
            actions,
        }
    }
}

/// Render sink for the conversational flow.
///
/// The flow treats presentation as opaque: a text plus named actions, or a
/// short popup-style notice.
#[async_trait]
pub trait PromptSink: Send + Sync {
    async fn prompt(&self, chat: ChatId, prompt: Prompt) -> Result<()>;

    /// Short notice without actions (callback answer on Telegram).
    async fn alert(&self, chat: ChatId, text: &str) -> Result<()>;
}
