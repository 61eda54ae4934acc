//! In-memory transport and connector for unit tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicI32, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    BotId, Error, Result,
    credential::bot_id_from_token,
    message::{ChatInfo, ChatType, Document, FromInfo, PhotoSize},
    payload::FileData,
    transport::{Connector, Identity, RawMessage, RawUpdate, Transport},
};

type PollResult = Result<Option<Vec<RawUpdate>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Sent {
    Text {
        chat_id: i64,
        text: String,
    },
    Photo {
        chat_id: i64,
        name: String,
        caption: String,
        len: usize,
    },
    Document {
        chat_id: i64,
        name: String,
        caption: String,
        len: usize,
    },
}

/// Replays a fixed script of poll results, then long-polls forever.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<PollResult>>,
    offsets: Mutex<Vec<Option<i64>>>,
    polls: AtomicUsize,
    sent: Mutex<Vec<Sent>>,
    next_message_id: AtomicI32,
    fail_sends: bool,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn batch(self, updates: Vec<RawUpdate>) -> Self {
        self.push(Ok(Some(updates)))
    }

    pub(crate) fn error(self, message: &str) -> Self {
        self.push(Err(Error::transport_message("getUpdates", message)))
    }

    pub(crate) fn end(self) -> Self {
        self.push(Ok(None))
    }

    pub(crate) fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    fn push(self, result: PollResult) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(result);
        self
    }

    pub(crate) fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub(crate) fn offsets(&self) -> Vec<Option<i64>> {
        self.offsets.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub(crate) fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub(crate) async fn wait_for_polls(&self, count: usize) {
        for _ in 0..200 {
            if self.poll_count() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("transport was polled {} times, expected {count}", self.poll_count());
    }

    fn record(&self, sent: Sent) -> Result<i32> {
        if self.fail_sends {
            return Err(Error::transport_message(
                "send message",
                "Bad Request: chat not found",
            ));
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(sent);
        Ok(self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn poll_updates(&self, offset: Option<i64>, _timeout: Duration) -> PollResult {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.offsets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(offset);
        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<i32> {
        self.record(Sent::Text {
            chat_id,
            text: text.to_string(),
        })
    }

    async fn send_photo(&self, chat_id: i64, file: FileData, caption: &str) -> Result<i32> {
        self.record(Sent::Photo {
            chat_id,
            name: file.name,
            caption: caption.to_string(),
            len: file.bytes.len(),
        })
    }

    async fn send_document(&self, chat_id: i64, file: FileData, caption: &str) -> Result<i32> {
        self.record(Sent::Document {
            chat_id,
            name: file.name,
            caption: caption.to_string(),
            len: file.bytes.len(),
        })
    }

    async fn resolve_file_url(&self, file_id: &str) -> Result<String> {
        if file_id.starts_with("known-") {
            Ok(format!("https://files.test/{file_id}"))
        } else {
            Err(Error::transport_message(
                "get file",
                "Bad Request: invalid file_id",
            ))
        }
    }
}

/// Accepts any well-formed token except those whose secret is `bad`.
#[derive(Default)]
pub(crate) struct MockConnector {
    scripts: Mutex<HashMap<BotId, ScriptedTransport>>,
    transports: Mutex<HashMap<BotId, Arc<ScriptedTransport>>>,
    establish_calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Slow down `establish` so concurrent registrations overlap.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Use `transport` for the next connection established for `bot_id`.
    pub(crate) fn with_script(self, bot_id: BotId, transport: ScriptedTransport) -> Self {
        self.scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(bot_id, transport);
        self
    }

    pub(crate) fn transport(&self, bot_id: BotId) -> Option<Arc<ScriptedTransport>> {
        self.transports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&bot_id)
            .cloned()
    }

    pub(crate) fn establish_calls(&self) -> usize {
        self.establish_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn establish(&self, credential: &str) -> Result<(Identity, Arc<dyn Transport>)> {
        self.establish_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let bot_id = bot_id_from_token(credential)?;
        if credential.ends_with(":bad") {
            return Err(Error::authentication_failed("Unauthorized"));
        }

        let transport = self
            .scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&bot_id)
            .unwrap_or_default();
        let transport = Arc::new(transport);
        self.transports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(bot_id, Arc::clone(&transport));

        Ok((
            Identity {
                bot_id,
                username: format!("bot{bot_id}"),
            },
            transport,
        ))
    }
}

pub(crate) fn chat() -> ChatInfo {
    ChatInfo {
        chat_id: 42,
        title: None,
        chat_type: ChatType::Private,
        username: Some("alice".into()),
    }
}

pub(crate) fn raw_message(message_id: i32) -> RawMessage {
    RawMessage {
        message_id,
        chat: chat(),
        from: Some(FromInfo {
            id: 1001,
            username: Some("alice".into()),
            first_name: "Alice".into(),
            last_name: None,
        }),
        text: None,
        caption: None,
        photo: Vec::new(),
        document: None,
    }
}

pub(crate) fn photo_size(file_id: &str, width: u32) -> PhotoSize {
    PhotoSize {
        file_id: file_id.into(),
        file_unique_id: format!("u-{file_id}"),
        width,
        height: width / 2,
        file_size: width * 10,
    }
}

pub(crate) fn document(file_id: &str) -> Document {
    Document {
        file_id: file_id.into(),
        file_unique_id: format!("u-{file_id}"),
        thumbnail: None,
        file_name: Some(format!("{file_id}.pdf")),
        mime_type: Some("application/pdf".into()),
        file_size: 2048,
    }
}

fn message_id(update_id: i64) -> i32 {
    i32::try_from(update_id).unwrap_or(i32::MAX)
}

pub(crate) fn text_update(update_id: i64, text: &str) -> RawUpdate {
    let mut raw = raw_message(message_id(update_id));
    raw.text = Some(text.into());
    RawUpdate {
        update_id,
        message: Some(raw),
    }
}

pub(crate) fn photo_update(update_id: i64, caption: &str, sizes: usize) -> RawUpdate {
    let mut raw = raw_message(message_id(update_id));
    raw.caption = Some(caption.into());
    raw.photo = (0..sizes)
        .map(|i| photo_size(&format!("p{update_id}-{i}"), 90 * (i as u32 + 1)))
        .collect();
    RawUpdate {
        update_id,
        message: Some(raw),
    }
}

pub(crate) fn document_update(update_id: i64, caption: &str) -> RawUpdate {
    let mut raw = raw_message(message_id(update_id));
    raw.caption = Some(caption.into());
    raw.document = Some(document(&format!("d{update_id}")));
    RawUpdate {
        update_id,
        message: Some(raw),
    }
}

pub(crate) fn empty_update(update_id: i64) -> RawUpdate {
    RawUpdate {
        update_id,
        message: None,
    }
}
