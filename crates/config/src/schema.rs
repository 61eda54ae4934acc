//! Config schema types (bots, queues, telegram).

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotmuxConfig {
    pub bots: Vec<BotConfig>,
    pub queues: QueueConfig,
    pub telegram: TelegramSettings,
}

impl BotmuxConfig {
    /// Bots with `enabled = true`, in file order.
    pub fn enabled_bots(&self) -> impl Iterator<Item = &BotConfig> {
        self.bots.iter().filter(|b| b.enabled)
    }
}

/// One bot to register at startup.
#[derive(Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Human-readable label used in logs.
    pub name: String,

    /// Bot token from @BotFather, `<id>:<secret>`.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("name", &self.name)
            .field("token", &"[REDACTED]")
            .field("enabled", &self.enabled)
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn default_true() -> bool {
    true
}

/// Shared queue sizes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueueConfig {
    /// Slots in the inbound message queue (default: 10000).
    pub message_capacity: usize,
    /// Slots in the lifecycle event queue (default: 1000).
    pub event_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            message_capacity: 10_000,
            event_capacity: 1_000,
        }
    }
}

/// Bot API connection and polling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TelegramSettings {
    /// Alternative Bot API server, e.g. a self-hosted `telegram-bot-api`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// `getUpdates` long-poll timeout in seconds (default: 60).
    pub poll_timeout_secs: u64,

    /// HTTP request timeout in seconds (default: 75).
    pub request_timeout_secs: u64,

    /// First retry delay after a failed poll, in milliseconds (default: 1000).
    pub backoff_initial_ms: u64,

    /// Retry delay ceiling in seconds (default: 60).
    pub backoff_max_secs: u64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_url: None,
            poll_timeout_secs: 60,
            request_timeout_secs: 75,
            backoff_initial_ms: 1_000,
            backoff_max_secs: 60,
        }
    }
}
