//! `botmux check`: validate the config and tokens offline.
//!
//! Prints one `[ok]`, `[warn]` or `[fail]` line per item. Exits non-zero when
//! anything failed.

use {
    anyhow::{Result, bail},
    secrecy::ExposeSecret,
};

use {
    botmux_channels::bot_id_from_token,
    botmux_config::{BotConfig, ConfigSource, LoadedConfig, Severity},
};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
    Skip,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
            Self::Skip => "skip",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Ok => GREEN,
            Self::Warn => YELLOW,
            Self::Fail => RED,
            Self::Skip => DIM,
        }
    }
}

#[derive(Debug)]
struct CheckItem {
    status: Status,
    message: String,
}

fn source_item(source: &ConfigSource) -> CheckItem {
    let status = match source {
        ConfigSource::File(_) => Status::Ok,
        ConfigSource::Defaults { rejected: None } => Status::Skip,
        ConfigSource::Defaults { rejected: Some(_) } => Status::Warn,
    };
    CheckItem {
        status,
        message: format!("config: {source}"),
    }
}

fn bot_item(bot: &BotConfig) -> CheckItem {
    let (status, detail) = if !bot.enabled {
        (Status::Skip, "disabled".to_string())
    } else {
        match bot_id_from_token(bot.token.expose_secret()) {
            Ok(bot_id) => (Status::Ok, format!("bot id {bot_id}")),
            Err(e) => (Status::Fail, e.to_string()),
        }
    };
    CheckItem {
        status,
        message: format!("{}: {detail}", bot.name),
    }
}

fn check_items(loaded: &LoadedConfig) -> Vec<CheckItem> {
    let mut items = vec![source_item(&loaded.source)];
    items.extend(loaded.config.bots.iter().map(bot_item));
    items.extend(
        botmux_config::validate(&loaded.config)
            .into_iter()
            .map(|d| CheckItem {
                status: match d.severity {
                    Severity::Error => Status::Fail,
                    Severity::Warning => Status::Warn,
                },
                message: format!("{}: {}", d.path, d.message),
            }),
    );
    items
}

pub fn check(loaded: &LoadedConfig) -> Result<()> {
    let items = check_items(loaded);
    for item in &items {
        println!(
            "  {}[{}]{} {}",
            item.status.color(),
            item.status.label(),
            RESET,
            item.message
        );
    }

    let failed = items.iter().filter(|i| i.status == Status::Fail).count();
    if failed > 0 {
        bail!("{failed} check(s) failed");
    }
    Ok(())
}
