//! Multi-bot connection registry.
//!
//! A [`BotRegistry`] holds one [`Connection`] per bot. Each connection runs a
//! long-poll receive loop that converts inbound updates into [`Message`]
//! envelopes and pushes them onto a single bounded queue shared by every bot.
//! Lifecycle notifications go to a second, smaller [`Event`] queue. Outbound
//! sends are routed to the owning connection by bot id.

pub mod connection;
pub mod credential;
pub mod error;
pub mod event;
pub mod message;
pub mod payload;
pub mod queue;
pub mod registry;
pub mod transport;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod test_support;

/// Numeric bot identifier, the part of a token before the `:`.
pub type BotId = i64;

pub use {
    connection::{Backoff, Connection, ConnectionOptions, ConnectionState, build_envelope},
    credential::bot_id_from_token,
    error::{Error, Result},
    event::{Event, TerminationReason},
    message::{ChatInfo, ChatType, Document, FromInfo, Message, MessageContent, MessageType, PhotoSize},
    payload::{DocumentConfig, FileData, PhotoConfig},
    queue::{EventStream, MessageStream, QueueReceiver},
    registry::{BotRegistry, DEFAULT_EVENT_CAPACITY, DEFAULT_MESSAGE_CAPACITY, RegistryOptions},
    transport::{Connector, Identity, RawMessage, RawUpdate, Transport},
};
