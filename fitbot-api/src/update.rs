//! The slice of a Telegram `Update` the bot reads.

use fitbot_bot::IncomingMessage;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Update {
    pub message: Option<Message>,
    pub edited_message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
}

impl Update {
    /// The message to answer, if the update carries one with a known sender.
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        let message = self.message.or(self.edited_message)?;
        let from = message.from?;
        Some(IncomingMessage {
            user_id: from.id,
            chat_id: message.chat.id,
            text: message.text.unwrap_or_default(),
        })
    }
}
