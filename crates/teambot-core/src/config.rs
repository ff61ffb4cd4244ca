use std::{env, fs, path::Path, path::PathBuf, time::Duration};

use crate::{errors::Error, Result};

/// Typed configuration for the bot, loaded from the environment (with an
/// optional `.env` file that never overrides existing variables).
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    /// JSON file backing the user/organization directory.
    pub directory_file: PathBuf,

    /// Pause between consecutive broadcast sends (outbound flood control).
    pub send_interval: Duration,

    /// How long an idle broadcast conversation survives before eviction.
    pub context_ttl: Duration,

    /// Text messages matching one of these (case-insensitive) cancel an
    /// active broadcast conversation.
    pub cancel_keywords: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let directory_file = env_path("TEAMBOT_DIRECTORY_FILE").ok_or_else(|| {
            Error::Config("TEAMBOT_DIRECTORY_FILE environment variable is required".to_string())
        })?;

        let send_interval =
            Duration::from_millis(env_u64("TEAMBOT_SEND_INTERVAL_MS").unwrap_or(100));
        let context_ttl = Duration::from_secs(env_u64("TEAMBOT_CONTEXT_TTL_SECS").unwrap_or(3600));

        let cancel_keywords = parse_csv_lower(
            env_str("TEAMBOT_CANCEL_KEYWORDS").or_else(|| Some("cancel,/cancel".to_string())),
        );

        Ok(Self {
            telegram_bot_token,
            directory_file,
            send_interval,
            context_ttl,
            cancel_keywords,
        })
    }

    pub fn is_cancel_keyword(&self, text: &str) -> bool {
        let lower = text.trim().to_lowercase();
        self.cancel_keywords.iter().any(|k| k == &lower)
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn parse_csv_lower(v: Option<String>) -> Vec<String> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
