pub mod command;
pub mod dispatcher;

use fitbot_client::Notifier;
use fitbot_db::ProfileRepository;
use log::{info, warn};

use crate::dispatcher::{Dispatcher, Sender};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("storage failure")]
    Storage(#[from] fitbot_db::Error),
}

/// A chat message addressed to the bot.
#[derive(Clone, Debug, PartialEq)]
pub struct IncomingMessage {
    pub user_id: i64,
    pub chat_id: i64,
    pub text: String,
}

pub struct Bot {
    dispatcher: Dispatcher,
    notifier: Box<dyn Notifier>,
}

impl Bot {
    pub fn new(repository: Box<dyn ProfileRepository>, notifier: Box<dyn Notifier>) -> Self {
        Self {
            dispatcher: Dispatcher::new(repository),
            notifier,
        }
    }

    /// Answers a single message. A reply that cannot be delivered is logged
    /// and dropped; storage failures are returned before anything is sent.
    pub async fn handle_message(&self, message: IncomingMessage) -> Result<(), Error> {
        let command = command::parse(&message.text);
        info!(
            "Handling {} from user {} in chat {}",
            command_name(&command),
            message.user_id,
            message.chat_id
        );

        let sender = Sender {
            user_id: message.user_id,
            chat_id: message.chat_id,
        };
        let reply = self.dispatcher.dispatch(sender, command).await?;

        if let Err(e) = self.notifier.send(message.chat_id, reply).await {
            warn!("Failed to deliver reply to chat {}: {}", message.chat_id, e);
        }
        Ok(())
    }
}

fn command_name(command: &command::Command) -> &'static str {
    use command::Command::*;
    match command {
        NoCommand => "plain text",
        ShowHelp => "/help",
        ShowProfile => "/profile",
        SetProfile(_) | SetProfileInvalid(_) => "/setprofile",
        Edit(_) | EditInvalid(_) | EditUnknownField(_) => "/edit",
        ComputeBmi => "/bmi",
        ComputeCutCalories => "/cutcal",
        Unrecognized(_) => "unknown command",
    }
}
