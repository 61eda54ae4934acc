//! Normalized inbound envelope carried on the shared message queue.

use serde::{Deserialize, Serialize};

use crate::BotId;

/// A message received by one of the registered bots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Bot that received the message.
    pub bot_id: BotId,
    /// Provider-assigned message id, unique within the chat.
    pub message_id: i32,
    pub chat: ChatInfo,
    /// Sender; absent for anonymous channel posts.
    pub from: Option<FromInfo>,
    #[serde(flatten)]
    pub content: MessageContent,
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        self.content.message_type()
    }
}

/// Chat the message was posted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatInfo {
    pub chat_id: i64,
    pub title: Option<String>,
    pub chat_type: ChatType,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Group => "group",
            Self::Supergroup => "supergroup",
            Self::Channel => "channel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FromInfo {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

/// Message payload, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text {
        text: String,
    },
    Photo {
        caption: String,
        /// Every size the provider generated, in provider order.
        photos: Vec<PhotoSize>,
    },
    Document {
        caption: String,
        document: Document,
    },
}

impl MessageContent {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Text { .. } => MessageType::Text,
            Self::Photo { .. } => MessageType::Photo,
            Self::Document { .. } => MessageType::Document,
        }
    }

    /// Text body for text messages, caption for media.
    pub fn text(&self) -> &str {
        match self {
            Self::Text { text } => text,
            Self::Photo { caption, .. } | Self::Document { caption, .. } => caption,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Photo,
    Document,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Document => "document",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One size variant of a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub file_unique_id: String,
    pub width: u32,
    pub height: u32,
    pub file_size: u32,
}

/// A generic file attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_unique_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PhotoSize>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn chat() -> ChatInfo {
        ChatInfo {
            chat_id: 42,
            title: None,
            chat_type: ChatType::Private,
            username: Some("alice".into()),
        }
    }

    #[test]
    fn serializes_type_tag_next_to_envelope_fields() {
        let msg = Message {
            bot_id: 7,
            message_id: 3,
            chat: chat(),
            from: None,
            content: MessageContent::Text {
                text: "hello".into(),
            },
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["text"], "hello");
        assert_eq!(value["bot_id"], 7);
        assert_eq!(value["chat"]["chat_type"], "private");
    }

    #[test]
    fn document_without_thumbnail_omits_field() {
        let content = MessageContent::Document {
            caption: String::new(),
            document: Document {
                file_id: "f".into(),
                file_unique_id: "u".into(),
                thumbnail: None,
                file_name: Some("report.pdf".into()),
                mime_type: Some("application/pdf".into()),
                file_size: 10,
            },
        };
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(value["type"], "document");
        assert!(value["document"].get("thumbnail").is_none());
    }

    #[test]
    fn deserializes_photo_envelope() {
        let msg: Message = serde_json::from_value(json!({
            "bot_id": 1,
            "message_id": 9,
            "chat": { "chat_id": -100, "title": "ops", "chat_type": "supergroup", "username": null },
            "from": { "id": 5, "username": null, "first_name": "Bob", "last_name": null },
            "type": "photo",
            "caption": "look",
            "photos": [
                { "file_id": "a", "file_unique_id": "ua", "width": 90, "height": 60, "file_size": 100 }
            ]
        }))
        .unwrap();
        assert_eq!(msg.message_type(), MessageType::Photo);
        assert_eq!(msg.content.text(), "look");
        assert_eq!(msg.chat.chat_type, ChatType::Supergroup);
    }
}
