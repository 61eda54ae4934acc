//! teloxide types → transport-neutral [`RawUpdate`]s.

use teloxide::types::{self as tg, Update, UpdateKind};

use botmux_channels::{
    ChatInfo, ChatType, Document, FromInfo, PhotoSize, RawMessage, RawUpdate,
};

pub fn raw_update(update: Update) -> RawUpdate {
    let update_id = i64::from(update.id.0);
    let message = match update.kind {
        UpdateKind::Message(msg) => Some(raw_message(&msg)),
        _ => None,
    };
    RawUpdate { update_id, message }
}

pub fn raw_message(msg: &tg::Message) -> RawMessage {
    RawMessage {
        message_id: msg.id.0,
        chat: chat_info(&msg.chat),
        from: msg.from.as_ref().map(from_info),
        text: msg.text().map(str::to_string),
        caption: msg.caption().map(str::to_string),
        photo: msg
            .photo()
            .map(|sizes| sizes.iter().map(photo_size).collect())
            .unwrap_or_default(),
        document: msg.document().map(document),
    }
}

fn chat_info(chat: &tg::Chat) -> ChatInfo {
    let chat_type = if chat.is_private() {
        ChatType::Private
    } else if chat.is_supergroup() {
        ChatType::Supergroup
    } else if chat.is_channel() {
        ChatType::Channel
    } else {
        ChatType::Group
    };
    ChatInfo {
        chat_id: chat.id.0,
        title: chat.title().map(str::to_string),
        chat_type,
        username: chat.username().map(str::to_string),
    }
}

fn from_info(user: &tg::User) -> FromInfo {
    FromInfo {
        id: i64::try_from(user.id.0).unwrap_or(i64::MAX),
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    }
}

fn photo_size(size: &tg::PhotoSize) -> PhotoSize {
    PhotoSize {
        file_id: size.file.id.clone(),
        file_unique_id: size.file.unique_id.clone(),
        width: size.width,
        height: size.height,
        file_size: size.file.size,
    }
}

fn document(doc: &tg::Document) -> Document {
    Document {
        file_id: doc.file.id.clone(),
        file_unique_id: doc.file.unique_id.clone(),
        thumbnail: doc.thumbnail.as_ref().map(photo_size),
        file_name: doc.file_name.clone(),
        mime_type: doc.mime_type.as_ref().map(ToString::to_string),
        file_size: doc.file.size,
    }
}
