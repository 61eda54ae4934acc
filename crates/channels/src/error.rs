use std::error::Error as StdError;

use crate::BotId;

/// Crate-wide result type for registry and connection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors shared by the registry, connections and transports.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The credential is not `<integer>:<secret>`.
    #[error("invalid credential format: {reason}")]
    InvalidCredentialFormat { reason: String },

    /// The remote side rejected the credential.
    #[error("authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// A connection with this identifier is already registered.
    #[error("bot already registered: {bot_id}")]
    DuplicateConnection { bot_id: BotId },

    /// No connection is registered under this identifier.
    #[error("unknown bot: {bot_id}")]
    ConnectionNotFound { bot_id: BotId },

    /// Failure reported by the underlying transport, passed through as-is.
    #[error("transport error: {context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn invalid_credential(reason: impl std::fmt::Display) -> Self {
        Self::InvalidCredentialFormat {
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn authentication_failed(message: impl std::fmt::Display) -> Self {
        Self::AuthenticationFailed {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn duplicate(bot_id: BotId) -> Self {
        Self::DuplicateConnection { bot_id }
    }

    #[must_use]
    pub fn not_found(bot_id: BotId) -> Self {
        Self::ConnectionNotFound { bot_id }
    }

    #[must_use]
    pub fn transport(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Transport failure that only carries a provider-supplied description.
    #[must_use]
    pub fn transport_message(context: impl Into<String>, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Transport {
            context: context.into(),
            source: message.into(),
        }
    }

    /// Short machine-readable name, used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentialFormat { .. } => "invalid_credential_format",
            Self::AuthenticationFailed { .. } => "authentication_failed",
            Self::DuplicateConnection { .. } => "duplicate_connection",
            Self::ConnectionNotFound { .. } => "connection_not_found",
            Self::Transport { .. } => "transport",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_keeps_provider_detail() {
        let err = Error::transport_message("send message", "Bad Request: chat not found");
        assert_eq!(
            err.to_string(),
            "transport error: send message: Bad Request: chat not found"
        );
        assert_eq!(err.kind(), "transport");
    }

    #[test]
    fn not_found_names_the_bot() {
        assert_eq!(Error::not_found(42).to_string(), "unknown bot: 42");
    }
}
