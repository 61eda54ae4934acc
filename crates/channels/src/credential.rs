use crate::{BotId, Error, Result};

/// Derive the bot identifier from a `<id>:<secret>` bot token.
///
/// The token must contain exactly one `:` and the part before it must parse
/// as a signed 64-bit integer.
pub fn bot_id_from_token(token: &str) -> Result<BotId> {
    let mut parts = token.split(':');
    let (Some(id), Some(_secret), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(Error::invalid_credential(
            "expected exactly one ':' separator",
        ));
    };
    id.parse::<BotId>()
        .map_err(|e| Error::invalid_credential(format!("bot id {id:?} is not an integer: {e}")))
}
