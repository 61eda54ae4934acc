use std::time::Duration;

use {
    async_trait::async_trait,
    teloxide::{
        Bot,
        payloads::{GetUpdatesSetters, SendDocumentSetters, SendPhotoSetters},
        prelude::Requester,
        types::{AllowedUpdate, ChatId, InputFile},
    },
    tracing::{debug, warn},
};

#[cfg(feature = "metrics")]
use botmux_metrics::{counter, histogram, labels, telegram as tg_metrics};

use botmux_channels::{BotId, Error, FileData, RawUpdate, Result, Transport};

use crate::{convert, error};

/// Bot API transport for one authenticated bot.
pub struct TelegramTransport {
    bot: Bot,
    bot_id: BotId,
}

impl TelegramTransport {
    pub fn new(bot: Bot, bot_id: BotId) -> Self {
        Self { bot, bot_id }
    }

    fn send_failed(&self, method: &'static str, err: teloxide::RequestError) -> Error {
        warn!(bot_id = self.bot_id, method, error = %err, "telegram send failed");
        #[cfg(feature = "metrics")]
        counter!(tg_metrics::MESSAGE_SEND_ERRORS_TOTAL, labels::METHOD => method).increment(1);
        error::request(method, err)
    }
}

/// `https://api.telegram.org/file/bot<token>/<path>` relative to `api_url`.
pub(crate) fn file_url(api_url: &url::Url, token: &str, file_path: &str) -> Result<String> {
    api_url
        .join(&format!("file/bot{token}/{file_path}"))
        .map(String::from)
        .map_err(|e| Error::transport("build file url", e))
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn poll_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Option<Vec<RawUpdate>>> {
        let mut req = self
            .bot
            .get_updates()
            .timeout(u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX))
            .allowed_updates(vec![AllowedUpdate::Message]);
        if let Some(offset) = offset {
            let offset = i32::try_from(offset)
                .map_err(|e| Error::transport("getUpdates offset", e))?;
            req = req.offset(offset);
        }

        #[cfg(feature = "metrics")]
        let started = std::time::Instant::now();
        let result = req.await;
        #[cfg(feature = "metrics")]
        {
            counter!(tg_metrics::POLLS_TOTAL).increment(1);
            histogram!(tg_metrics::POLL_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        }

        match result {
            Ok(updates) => {
                debug!(bot_id = self.bot_id, count = updates.len(), "got telegram updates");
                Ok(Some(updates.into_iter().map(convert::raw_update).collect()))
            },
            Err(e) => {
                // Conflicts are retried by the receive loop like any other failure.
                if error::is_conflict(&e) {
                    warn!(
                        bot_id = self.bot_id,
                        "another instance is polling with this token"
                    );
                }
                Err(error::request("getUpdates", e))
            },
        }
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<i32> {
        match self.bot.send_message(ChatId(chat_id), text).await {
            Ok(message) => Ok(message.id.0),
            Err(e) => Err(self.send_failed("sendMessage", e)),
        }
    }

    async fn send_photo(&self, chat_id: i64, file: FileData, caption: &str) -> Result<i32> {
        let input = InputFile::memory(file.bytes).file_name(file.name);
        let mut req = self.bot.send_photo(ChatId(chat_id), input);
        if !caption.is_empty() {
            req = req.caption(caption);
        }
        match req.await {
            Ok(message) => Ok(message.id.0),
            Err(e) => Err(self.send_failed("sendPhoto", e)),
        }
    }

    async fn send_document(&self, chat_id: i64, file: FileData, caption: &str) -> Result<i32> {
        let input = InputFile::memory(file.bytes).file_name(file.name);
        let mut req = self.bot.send_document(ChatId(chat_id), input);
        if !caption.is_empty() {
            req = req.caption(caption);
        }
        match req.await {
            Ok(message) => Ok(message.id.0),
            Err(e) => Err(self.send_failed("sendDocument", e)),
        }
    }

    async fn resolve_file_url(&self, file_id: &str) -> Result<String> {
        let file = self
            .bot
            .get_file(file_id)
            .await
            .map_err(|e| error::request("getFile", e))?;
        file_url(&self.bot.api_url(), self.bot.token(), &file.path)
    }
}
