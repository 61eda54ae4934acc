//! Seams to the chat protocol.
//!
//! A [`Connector`] turns a credential into a live [`Transport`]; the
//! registry never talks to the wire directly.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    BotId, Result,
    message::{ChatInfo, Document, FromInfo, PhotoSize},
    payload::FileData,
};

/// Identity the remote side reports for an established credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub bot_id: BotId,
    pub username: String,
}

/// One entry of a polled update batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RawUpdate {
    pub update_id: i64,
    /// `None` for updates that are not messages (callbacks, edits, ...).
    pub message: Option<RawMessage>,
}

/// Transport-neutral view of an inbound message. Several payload fields may
/// be populated at once; the connection decides which one wins.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub message_id: i32,
    pub chat: ChatInfo,
    pub from: Option<FromInfo>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub photo: Vec<PhotoSize>,
    pub document: Option<Document>,
}

/// Establishes transports from credentials.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Validate `credential` against the remote side and bind a transport.
    async fn establish(&self, credential: &str) -> Result<(Identity, Arc<dyn Transport>)>;
}

/// A live, authenticated connection to the chat provider.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Long-poll for updates with ids `>= offset`.
    ///
    /// Returns `Ok(None)` once the update stream has ended for good.
    async fn poll_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Option<Vec<RawUpdate>>>;

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<i32>;

    async fn send_photo(&self, chat_id: i64, file: FileData, caption: &str) -> Result<i32>;

    async fn send_document(&self, chat_id: i64, file: FileData, caption: &str) -> Result<i32>;

    /// Resolve a provider file id to a directly fetchable URL.
    async fn resolve_file_url(&self, file_id: &str) -> Result<String>;
}
