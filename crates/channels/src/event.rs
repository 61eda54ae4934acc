use serde::{Deserialize, Serialize};

use crate::BotId;

/// Non-message notifications delivered on the shared event queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// A connection was registered and its receive loop spawned.
    ConnectionStarted { bot_id: BotId, username: String },
    /// A receive loop exited; the connection no longer produces messages.
    ConnectionTerminated {
        bot_id: BotId,
        reason: TerminationReason,
    },
    /// Caller-defined notification passed through untouched.
    Custom {
        #[serde(skip_serializing_if = "Option::is_none")]
        bot_id: Option<BotId>,
        name: String,
        payload: serde_json::Value,
    },
}

impl Event {
    pub fn custom(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::Custom {
            bot_id: None,
            name: name.into(),
            payload,
        }
    }

    pub fn bot_id(&self) -> Option<BotId> {
        match self {
            Self::ConnectionStarted { bot_id, .. } | Self::ConnectionTerminated { bot_id, .. } => {
                Some(*bot_id)
            },
            Self::Custom { bot_id, .. } => *bot_id,
        }
    }
}

/// Why a receive loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The connection was stopped or removed.
    Cancelled,
    /// The transport reported that no more updates will arrive.
    StreamEnded,
    /// Every reader of the message queue is gone.
    QueueClosed,
}

impl TerminationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::StreamEnded => "stream_ended",
            Self::QueueClosed => "queue_closed",
        }
    }
}
