//! Registry of live bot connections.
//!
//! Owns the identifier → connection map and the two shared bounded queues.
//! Every connection pushes onto the same queues; outbound calls are routed
//! to the owning connection by identifier.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use {
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use botmux_metrics::{channels as ch_metrics, counter, gauge};

use crate::{
    BotId, Error, Result,
    connection::{
        Backoff, Connection, ConnectionOptions, ConnectionState, DEFAULT_POLL_TIMEOUT,
    },
    credential::bot_id_from_token,
    event::Event,
    message::Message,
    payload::{DocumentConfig, PhotoConfig},
    queue::{self, EventStream, MessageStream},
    transport::Connector,
};

/// Slots in the shared message queue.
pub const DEFAULT_MESSAGE_CAPACITY: usize = 10_000;
/// Slots in the shared event queue.
pub const DEFAULT_EVENT_CAPACITY: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryOptions {
    pub message_capacity: usize,
    pub event_capacity: usize,
    /// Long-poll timeout handed to every transport poll.
    pub poll_timeout: Duration,
    pub backoff: Backoff,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            message_capacity: DEFAULT_MESSAGE_CAPACITY,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            backoff: Backoff::default(),
        }
    }
}

/// Connection registry with shared inbound queues.
pub struct BotRegistry {
    connector: Arc<dyn Connector>,
    bots: RwLock<HashMap<BotId, Arc<Connection>>>,
    message_tx: mpsc::Sender<Message>,
    event_tx: mpsc::Sender<Event>,
    messages: MessageStream,
    events: EventStream,
    connection_options: ConnectionOptions,
}

impl BotRegistry {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self::with_options(connector, RegistryOptions::default())
    }

    /// # Panics
    ///
    /// Panics if either queue capacity is zero.
    pub fn with_options(connector: Arc<dyn Connector>, options: RegistryOptions) -> Self {
        let (message_tx, messages) = queue::bounded(options.message_capacity);
        let (event_tx, events) = queue::bounded(options.event_capacity);
        Self {
            connector,
            bots: RwLock::new(HashMap::new()),
            message_tx,
            event_tx,
            messages,
            events,
            connection_options: ConnectionOptions {
                poll_timeout: options.poll_timeout,
                backoff: options.backoff,
            },
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<BotId, Arc<Connection>>> {
        self.bots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<BotId, Arc<Connection>>> {
        self.bots.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn get(&self, bot_id: BotId) -> Result<Arc<Connection>> {
        let conn = self.read().get(&bot_id).cloned();
        conn.ok_or_else(|| {
            debug!(bot_id, "bot not registered");
            #[cfg(feature = "metrics")]
            counter!(ch_metrics::UNKNOWN_BOT_TOTAL).increment(1);
            Error::not_found(bot_id)
        })
    }

    /// Connect a bot and start its receive loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn add_bot(&self, token: &str) -> Result<BotId> {
        let claimed = bot_id_from_token(token)?;
        if self.contains(claimed) {
            return Err(Error::duplicate(claimed));
        }

        let (identity, transport) = self.connector.establish(token).await.inspect_err(|e| {
            warn!(bot_id = claimed, error = %e, "failed to connect bot");
        })?;
        if identity.bot_id != claimed {
            warn!(
                bot_id = identity.bot_id,
                token_id = claimed,
                "transport identity differs from token id"
            );
        }

        let bot_id = identity.bot_id;
        let username = identity.username.clone();
        let conn = Arc::new(Connection::new(
            identity,
            transport,
            self.message_tx.clone(),
            self.event_tx.clone(),
            self.connection_options,
        ));

        {
            // Re-check under the write lock: a concurrent add_bot for the same
            // id may have won while we were establishing.
            let mut bots = self.write();
            if bots.contains_key(&bot_id) {
                return Err(Error::duplicate(bot_id));
            }
            bots.insert(bot_id, Arc::clone(&conn));
            conn.offer_event(Event::ConnectionStarted {
                bot_id,
                username: username.clone(),
            });
            conn.spawn();

            #[cfg(feature = "metrics")]
            gauge!(ch_metrics::ACTIVE).set(bots.len() as f64);
        }

        info!(bot_id, username = %username, "bot registered");
        Ok(bot_id)
    }

    /// Stop a bot's receive loop and forget it.
    pub fn remove_bot(&self, bot_id: BotId) -> Result<()> {
        let conn = {
            let mut bots = self.write();
            let conn = bots.remove(&bot_id).ok_or_else(|| Error::not_found(bot_id))?;
            #[cfg(feature = "metrics")]
            gauge!(ch_metrics::ACTIVE).set(bots.len() as f64);
            conn
        };
        conn.stop();
        info!(bot_id, "bot removed");
        Ok(())
    }

    /// Stop every receive loop. Entries stay registered.
    pub fn shutdown(&self) {
        let bots = self.read();
        info!(count = bots.len(), "stopping all receive loops");
        for conn in bots.values() {
            conn.stop();
        }
    }

    /// Read handle to the shared message queue.
    pub fn message_stream(&self) -> MessageStream {
        self.messages.clone()
    }

    /// Read handle to the shared event queue.
    pub fn event_stream(&self) -> EventStream {
        self.events.clone()
    }

    /// Push a caller-defined event onto the event queue, waiting for space.
    pub async fn publish_event(&self, event: Event) {
        if self.event_tx.send(event).await.is_err() {
            debug!("event queue closed");
        }
    }

    pub async fn send_message_text(&self, bot_id: BotId, chat_id: i64, text: &str) -> Result<i32> {
        self.get(bot_id)?.send_message_text(chat_id, text).await
    }

    pub async fn send_message_photo(
        &self,
        bot_id: BotId,
        chat_id: i64,
        photo: PhotoConfig,
    ) -> Result<i32> {
        self.get(bot_id)?.send_message_photo(chat_id, photo).await
    }

    pub async fn send_message_document(
        &self,
        bot_id: BotId,
        chat_id: i64,
        document: DocumentConfig,
    ) -> Result<i32> {
        self.get(bot_id)?
            .send_message_document(chat_id, document)
            .await
    }

    pub async fn get_file_url(&self, bot_id: BotId, file_id: &str) -> Result<String> {
        self.get(bot_id)?.get_file_url(file_id).await
    }

    pub fn get_bot_username(&self, bot_id: BotId) -> Result<String> {
        Ok(self.get(bot_id)?.username().to_string())
    }

    pub fn state(&self, bot_id: BotId) -> Result<ConnectionState> {
        Ok(self.get(bot_id)?.state())
    }

    pub fn contains(&self, bot_id: BotId) -> bool {
        self.read().contains_key(&bot_id)
    }

    /// Registered bot ids, sorted.
    pub fn bot_ids(&self) -> Vec<BotId> {
        let mut ids: Vec<BotId> = self.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
