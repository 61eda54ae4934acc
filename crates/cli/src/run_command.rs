//! `botmux run`: register every enabled bot and stream envelopes to stdout.

use std::{io::Write, sync::Arc, time::Duration};

use {
    anyhow::{Context, Result},
    secrecy::ExposeSecret,
    tracing::{error, info, warn},
};

use {
    botmux_channels::{
        Backoff, BotRegistry, Event, EventStream, Message, MessageStream, RegistryOptions,
    },
    botmux_config::{BotmuxConfig, QueueConfig, TelegramSettings},
    botmux_telegram::{TelegramConfig, TelegramConnector},
};

pub async fn run(config: BotmuxConfig) -> Result<()> {
    let telegram = telegram_config(&config.telegram)?;
    let options = registry_options(&config.queues, &config.telegram);
    let registry = BotRegistry::with_options(Arc::new(TelegramConnector::new(telegram)), options);

    for bot in config.enabled_bots() {
        match registry.add_bot(bot.token.expose_secret()).await {
            Ok(bot_id) => info!(name = %bot.name, bot_id, "bot started"),
            Err(e) => error!(name = %bot.name, error = %e, kind = e.kind(), "failed to start bot"),
        }
    }
    if registry.is_empty() {
        warn!("no bots running; waiting for Ctrl-C");
    }

    let result = forward(
        &registry.message_stream(),
        &registry.event_stream(),
        tokio::signal::ctrl_c(),
        &mut std::io::stdout().lock(),
    )
    .await;
    registry.shutdown();
    result
}

/// Print envelopes to `out` and log events until `shutdown` resolves.
async fn forward(
    messages: &MessageStream,
    events: &EventStream,
    shutdown: impl Future<Output = std::io::Result<()>>,
    out: &mut impl Write,
) -> Result<()> {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            signal = &mut shutdown => {
                signal.context("listen for Ctrl-C")?;
                info!("shutting down");
                return Ok(());
            },
            Some(event) = events.recv() => log_event(&event),
            Some(message) = messages.recv() => {
                writeln!(out, "{}", envelope_line(&message)?)?;
                out.flush()?;
            },
        }
    }
}

fn log_event(event: &Event) {
    match event {
        Event::ConnectionStarted { bot_id, username } => {
            info!(bot_id, username = %username, "connection started");
        },
        Event::ConnectionTerminated { bot_id, reason } => {
            warn!(bot_id, reason = reason.as_str(), "connection terminated");
        },
        Event::Custom { bot_id, name, .. } => {
            info!(bot_id = ?bot_id, name = %name, "event");
        },
    }
}

fn envelope_line(message: &Message) -> Result<String> {
    serde_json::to_string(message).context("serialize envelope")
}

fn telegram_config(settings: &TelegramSettings) -> Result<TelegramConfig> {
    let api_url = settings
        .api_url
        .as_deref()
        .map(url::Url::parse)
        .transpose()
        .context("telegram.api_url")?;
    Ok(TelegramConfig {
        api_url,
        poll_timeout_secs: settings.poll_timeout_secs,
        request_timeout_secs: settings.request_timeout_secs,
    })
}

fn registry_options(queues: &QueueConfig, telegram: &TelegramSettings) -> RegistryOptions {
    RegistryOptions {
        message_capacity: queues.message_capacity.max(1),
        event_capacity: queues.event_capacity.max(1),
        poll_timeout: Duration::from_secs(telegram.poll_timeout_secs),
        backoff: Backoff {
            initial: Duration::from_millis(telegram.backoff_initial_ms),
            max: Duration::from_secs(telegram.backoff_max_secs),
        },
    }
}
