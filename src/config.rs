//! Client configuration parsed from environment variables.

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Chat responses can take minutes on long retrievals.
    pub chat_secs: u64,
    /// Uploads include server-side text extraction.
    pub upload_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub timeouts: Timeouts,
    /// Ask the backend to use conversation memory for follow-up questions.
    pub use_memory: bool,
    /// Prefer the streaming chat endpoint over the blocking one.
    pub streaming: bool,
}

impl Config {
    /// Build typed client config from environment variables.
    ///
    /// All variables are optional:
    /// - `ADMITCHAT_BASE_URL`: backend base URL (default `http://localhost:8000`)
    /// - `ADMITCHAT_CHAT_TIMEOUT_SECS`: default 300
    /// - `ADMITCHAT_UPLOAD_TIMEOUT_SECS`: default 120
    /// - `ADMITCHAT_CONNECT_TIMEOUT_SECS`: default 10
    /// - `ADMITCHAT_USE_MEMORY`: default true
    /// - `ADMITCHAT_STREAMING`: default true
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("ADMITCHAT_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = Timeouts {
            chat_secs: env_parse("ADMITCHAT_CHAT_TIMEOUT_SECS", DEFAULT_CHAT_TIMEOUT_SECS),
            upload_secs: env_parse("ADMITCHAT_UPLOAD_TIMEOUT_SECS", DEFAULT_UPLOAD_TIMEOUT_SECS),
            connect_secs: env_parse("ADMITCHAT_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Self {
            base_url,
            timeouts,
            use_memory: env_parse("ADMITCHAT_USE_MEMORY", true),
            streaming: env_parse("ADMITCHAT_STREAMING", true),
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
