use std::sync::Arc;

use {
    async_trait::async_trait,
    teloxide::{Bot, prelude::Requester},
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use botmux_metrics::{counter, telegram as tg_metrics};

use botmux_channels::{Connector, Error, Identity, Result, Transport};

use crate::{config::TelegramConfig, error, transport::TelegramTransport};

/// Establishes Bot API transports from bot tokens.
#[derive(Debug, Clone, Default)]
pub struct TelegramConnector {
    config: TelegramConfig,
}

impl TelegramConnector {
    pub fn new(config: TelegramConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    fn build_bot(&self, token: &str) -> Result<Bot> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(self.config.request_timeout())
            .build()
            .map_err(|e| Error::transport("build http client", e))?;
        let bot = Bot::with_client(token, client);
        Ok(match &self.config.api_url {
            Some(url) => bot.set_api_url(url.clone()),
            None => bot,
        })
    }
}

#[async_trait]
impl Connector for TelegramConnector {
    async fn establish(&self, credential: &str) -> Result<(Identity, Arc<dyn Transport>)> {
        let bot = self.build_bot(credential)?;

        let me = bot.get_me().await.map_err(|e| {
            #[cfg(feature = "metrics")]
            counter!(tg_metrics::BOT_CONNECTION_ERRORS_TOTAL).increment(1);
            error::identity(e)
        })?;
        let bot_id = i64::try_from(me.id.0)
            .map_err(|e| Error::transport("getMe returned an out-of-range id", e))?;
        let username = me.user.username.clone().unwrap_or_default();

        // Long polling is refused while a webhook is set.
        if let Err(e) = bot.delete_webhook().await {
            warn!(bot_id, error = %e, "failed to clear telegram webhook");
        } else {
            debug!(bot_id, "telegram webhook cleared");
        }

        info!(bot_id, username = %username, "telegram bot authenticated");
        let transport = TelegramTransport::new(bot, bot_id);
        Ok((Identity { bot_id, username }, Arc::new(transport)))
    }
}
