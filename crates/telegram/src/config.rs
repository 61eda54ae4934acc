use std::time::Duration;

use {
    serde::{Deserialize, Serialize},
    url::Url,
};

/// Bot API settings shared by every bot the connector establishes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API base URL. `None` uses `https://api.telegram.org/`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<Url>,

    /// Long-poll timeout for `getUpdates` (seconds).
    pub poll_timeout_secs: u64,

    /// HTTP client timeout (seconds). Must exceed the long-poll timeout or
    /// the client aborts requests before Telegram answers.
    pub request_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            poll_timeout_secs: 60,
            request_timeout_secs: 75,
        }
    }
}

impl TelegramConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    /// HTTP timeout, raised to 15 s past the poll timeout when configured
    /// too low.
    pub fn request_timeout(&self) -> Duration {
        let floor = self.poll_timeout_secs.saturating_add(15);
        Duration::from_secs(self.request_timeout_secs.max(floor))
    }
}
