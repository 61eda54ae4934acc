//! Metric name and label definitions.
//!
//! Centralizing the names keeps dashboards and the code that records them
//! in agreement.

/// Connection registry and receive loop metrics
pub mod channels {
    /// Envelopes pushed onto the shared message queue
    pub const MESSAGES_RECEIVED_TOTAL: &str = "botmux_channel_messages_received_total";
    /// Outbound messages accepted by the transport
    pub const MESSAGES_SENT_TOTAL: &str = "botmux_channel_messages_sent_total";
    /// Updates skipped because they carried no supported payload
    pub const UPDATES_SKIPPED_TOTAL: &str = "botmux_channel_updates_skipped_total";
    /// Failed update polls
    pub const POLL_ERRORS_TOTAL: &str = "botmux_channel_poll_errors_total";
    /// Outbound sends rejected for an unknown bot id
    pub const UNKNOWN_BOT_TOTAL: &str = "botmux_channel_unknown_bot_total";
    /// Lifecycle events dropped because the event queue was full
    pub const EVENTS_DROPPED_TOTAL: &str = "botmux_channel_events_dropped_total";
    /// Number of registered connections
    pub const ACTIVE: &str = "botmux_channels_active";
}

/// Telegram transport metrics
pub mod telegram {
    /// Bot API `getUpdates` round trips
    pub const POLLS_TOTAL: &str = "botmux_telegram_polls_total";
    /// Update polling duration in seconds
    pub const POLL_DURATION_SECONDS: &str = "botmux_telegram_poll_duration_seconds";
    /// Message send errors by method
    pub const MESSAGE_SEND_ERRORS_TOTAL: &str = "botmux_telegram_message_send_errors_total";
    /// Bot connection (getMe) errors
    pub const BOT_CONNECTION_ERRORS_TOTAL: &str = "botmux_telegram_bot_connection_errors_total";
}

/// Common label keys
pub mod labels {
    pub const MESSAGE_TYPE: &str = "message_type";
    pub const METHOD: &str = "method";
}
