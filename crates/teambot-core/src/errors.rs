/// Core error type for the bot.
///
/// Adapter crates should map their specific errors into this type so the
/// conversation flow can handle failures consistently (user-facing alert vs.
/// aborted dispatch).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("directory error: {0}")]
    Directory(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
