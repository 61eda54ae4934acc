//! Semantic checks on a parsed configuration.

use std::collections::HashSet;

use {secrecy::ExposeSecret, url::Url};

use crate::schema::BotmuxConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. `bots[1].name`.
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

#[must_use]
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}

/// Check values serde cannot reject on its own. Token format is left to the
/// registry, which reports it per bot.
#[must_use]
pub fn validate(config: &BotmuxConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let mut names = HashSet::new();
    for (i, bot) in config.bots.iter().enumerate() {
        if bot.name.trim().is_empty() {
            diagnostics.push(Diagnostic::error(format!("bots[{i}].name"), "name is empty"));
        } else if !names.insert(bot.name.as_str()) {
            diagnostics.push(Diagnostic::error(
                format!("bots[{i}].name"),
                format!("duplicate bot name \"{}\"", bot.name),
            ));
        }
        if bot.token.expose_secret().contains("${") {
            diagnostics.push(Diagnostic::error(
                format!("bots[{i}].token"),
                "token still contains an unresolved ${...} placeholder",
            ));
        }
    }
    if config.enabled_bots().next().is_none() {
        diagnostics.push(Diagnostic::warning("bots", "no enabled bots"));
    }

    if config.queues.message_capacity == 0 {
        diagnostics.push(Diagnostic::error(
            "queues.message_capacity",
            "capacity must be at least 1",
        ));
    }
    if config.queues.event_capacity == 0 {
        diagnostics.push(Diagnostic::error(
            "queues.event_capacity",
            "capacity must be at least 1",
        ));
    }

    let telegram = &config.telegram;
    if let Some(api_url) = &telegram.api_url
        && let Err(e) = Url::parse(api_url)
    {
        diagnostics.push(Diagnostic::error(
            "telegram.api_url",
            format!("invalid URL: {e}"),
        ));
    }
    if telegram.request_timeout_secs <= telegram.poll_timeout_secs {
        diagnostics.push(Diagnostic::warning(
            "telegram.request_timeout_secs",
            "should exceed poll_timeout_secs; it will be raised automatically",
        ));
    }
    if telegram.backoff_initial_ms == 0 {
        diagnostics.push(Diagnostic::warning(
            "telegram.backoff_initial_ms",
            "zero backoff retries failed polls in a tight loop",
        ));
    }

    diagnostics
}
