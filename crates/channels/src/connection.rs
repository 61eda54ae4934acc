//! A single bot connection and its receive loop.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
    time::Duration,
};

use {
    tokio::{
        sync::mpsc::{self, error::TrySendError},
        task::JoinHandle,
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use botmux_metrics::{channels as ch_metrics, counter, labels};

use crate::{
    BotId, Result,
    event::{Event, TerminationReason},
    message::{Message, MessageContent},
    payload::{DocumentConfig, PhotoConfig},
    transport::{Identity, RawMessage, Transport},
};

/// Long-poll timeout used when none is configured.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(60);

/// Exponential backoff applied after failed polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(60),
        }
    }
}

impl Backoff {
    /// Delay before the retry that follows `failures` consecutive failures
    /// (0-based), doubling from `initial` and capped at `max`.
    pub fn delay(&self, failures: u32) -> Duration {
        let factor = 1u32.checked_shl(failures.min(31)).unwrap_or(u32::MAX);
        self.initial.saturating_mul(factor).min(self.max)
    }
}

/// Receive loop tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub poll_timeout: Duration,
    pub backoff: Backoff,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            backoff: Backoff::default(),
        }
    }
}

/// Lifecycle of a connection. There is no way back from `Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Created,
    Running,
    Terminated,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Created,
            1 => Self::Running,
            _ => Self::Terminated,
        }
    }
}

/// One registered bot: its transport plus the shared queue senders.
pub struct Connection {
    bot_id: BotId,
    username: String,
    transport: Arc<dyn Transport>,
    messages: mpsc::Sender<Message>,
    events: mpsc::Sender<Event>,
    cancel: CancellationToken,
    state: AtomicU8,
    options: ConnectionOptions,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("bot_id", &self.bot_id)
            .field("username", &self.username)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Connection {
    pub(crate) fn new(
        identity: Identity,
        transport: Arc<dyn Transport>,
        messages: mpsc::Sender<Message>,
        events: mpsc::Sender<Event>,
        options: ConnectionOptions,
    ) -> Self {
        Self {
            bot_id: identity.bot_id,
            username: identity.username,
            transport,
            messages,
            events,
            cancel: CancellationToken::new(),
            state: AtomicU8::new(ConnectionState::Created as u8),
            options,
        }
    }

    pub fn bot_id(&self) -> BotId {
        self.bot_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Ask the receive loop to exit. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Spawn [`Connection::receive_loop`] on the current runtime.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<TerminationReason> {
        tokio::spawn(Arc::clone(self).receive_loop())
    }

    /// Poll the transport and push envelopes onto the shared message queue
    /// until stopped, the update stream ends, or the queue is closed.
    pub async fn receive_loop(self: Arc<Self>) -> TerminationReason {
        self.set_state(ConnectionState::Running);
        info!(
            bot_id = self.bot_id,
            username = %self.username,
            "starting receive loop"
        );

        let reason = self.pump().await;

        self.set_state(ConnectionState::Terminated);
        info!(
            bot_id = self.bot_id,
            reason = reason.as_str(),
            "receive loop stopped"
        );
        self.offer_event(Event::ConnectionTerminated {
            bot_id: self.bot_id,
            reason,
        });
        reason
    }

    async fn pump(&self) -> TerminationReason {
        let mut offset: Option<i64> = None;
        let mut failures: u32 = 0;

        loop {
            let polled = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return TerminationReason::Cancelled,
                polled = self.transport.poll_updates(offset, self.options.poll_timeout) => polled,
            };

            let updates = match polled {
                Ok(Some(updates)) => {
                    failures = 0;
                    updates
                },
                Ok(None) => return TerminationReason::StreamEnded,
                Err(e) => {
                    let delay = self.options.backoff.delay(failures);
                    failures = failures.saturating_add(1);
                    warn!(
                        bot_id = self.bot_id,
                        error = %e,
                        failures,
                        retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "polling updates failed"
                    );
                    #[cfg(feature = "metrics")]
                    counter!(ch_metrics::POLL_ERRORS_TOTAL).increment(1);

                    tokio::select! {
                        biased;
                        () = self.cancel.cancelled() => return TerminationReason::Cancelled,
                        () = tokio::time::sleep(delay) => {},
                    }
                    continue;
                },
            };

            if !updates.is_empty() {
                debug!(bot_id = self.bot_id, count = updates.len(), "got updates");
            }

            for update in updates {
                offset = Some(update.update_id + 1);

                let Some(raw) = update.message else {
                    continue;
                };
                let Some(envelope) = build_envelope(self.bot_id, raw) else {
                    debug!(
                        bot_id = self.bot_id,
                        update_id = update.update_id,
                        "skipping message without text, photo or document"
                    );
                    #[cfg(feature = "metrics")]
                    counter!(ch_metrics::UPDATES_SKIPPED_TOTAL).increment(1);
                    continue;
                };

                #[cfg(feature = "metrics")]
                let message_type = envelope.message_type();

                // Blocks while the queue is full; only this connection stalls.
                tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => return TerminationReason::Cancelled,
                    sent = self.messages.send(envelope) => {
                        if sent.is_err() {
                            return TerminationReason::QueueClosed;
                        }
                    },
                }

                #[cfg(feature = "metrics")]
                counter!(
                    ch_metrics::MESSAGES_RECEIVED_TOTAL,
                    labels::MESSAGE_TYPE => message_type.as_str()
                )
                .increment(1);
            }
        }
    }

    /// Push a lifecycle event without waiting for queue space.
    pub(crate) fn offer_event(&self, event: Event) {
        match self.events.try_send(event) {
            Ok(()) => {},
            Err(TrySendError::Full(event)) => {
                warn!(bot_id = self.bot_id, ?event, "event queue full, dropping event");
                #[cfg(feature = "metrics")]
                counter!(ch_metrics::EVENTS_DROPPED_TOTAL).increment(1);
            },
            Err(TrySendError::Closed(_)) => {
                debug!(bot_id = self.bot_id, "event queue closed");
            },
        }
    }

    pub async fn send_message_text(&self, chat_id: i64, text: &str) -> Result<i32> {
        let message_id = self.transport.send_text(chat_id, text).await?;
        self.record_sent(chat_id, message_id, "text");
        Ok(message_id)
    }

    pub async fn send_message_photo(&self, chat_id: i64, photo: PhotoConfig) -> Result<i32> {
        let message_id = self
            .transport
            .send_photo(chat_id, photo.file, &photo.caption)
            .await?;
        self.record_sent(chat_id, message_id, "photo");
        Ok(message_id)
    }

    pub async fn send_message_document(
        &self,
        chat_id: i64,
        document: DocumentConfig,
    ) -> Result<i32> {
        let message_id = self
            .transport
            .send_document(chat_id, document.file, &document.caption)
            .await?;
        self.record_sent(chat_id, message_id, "document");
        Ok(message_id)
    }

    pub async fn get_file_url(&self, file_id: &str) -> Result<String> {
        self.transport.resolve_file_url(file_id).await
    }

    fn record_sent(&self, chat_id: i64, message_id: i32, kind: &'static str) {
        debug!(bot_id = self.bot_id, chat_id, message_id, kind, "message sent");
        #[cfg(feature = "metrics")]
        counter!(ch_metrics::MESSAGES_SENT_TOTAL, labels::MESSAGE_TYPE => kind).increment(1);
    }
}

/// Normalize a raw message into an envelope.
///
/// Payloads are tried in order text, photo, document; the first present one
/// wins. Empty text and empty photo lists count as absent. Returns `None`
/// when none of the three is present.
pub fn build_envelope(bot_id: BotId, raw: RawMessage) -> Option<Message> {
    let RawMessage {
        message_id,
        chat,
        from,
        text,
        caption,
        photo,
        document,
    } = raw;

    let content = if let Some(text) = text.filter(|t| !t.is_empty()) {
        MessageContent::Text { text }
    } else if !photo.is_empty() {
        MessageContent::Photo {
            caption: caption.unwrap_or_default(),
            photos: photo,
        }
    } else if let Some(document) = document {
        MessageContent::Document {
            caption: caption.unwrap_or_default(),
            document,
        }
    } else {
        return None;
    };

    Some(Message {
        bot_id,
        message_id,
        chat,
        from,
        content,
    })
}
