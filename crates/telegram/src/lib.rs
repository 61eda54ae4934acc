//! Telegram Bot API transport for botmux.
//!
//! Implements the registry's `Connector` and `Transport` seams with teloxide:
//! `getMe` to authenticate, manual `getUpdates` long polling for inbound
//! messages, and `sendMessage`/`sendPhoto`/`sendDocument`/`getFile` outbound.

pub mod config;
pub mod connector;
pub mod convert;
mod error;
pub mod transport;

pub use {config::TelegramConfig, connector::TelegramConnector, transport::TelegramTransport};
