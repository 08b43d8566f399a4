use std::sync::Arc;
use crate::application::context::AppContext;
use crate::application::errors::BotError;
use crate::domain::entities::{Action, Message};
use crate::domain::traits::Bot;

/// Reply sent when handling a message fails
pub const ERROR_REPLY: &str = "Oops, an error occurred";

/// Service for processing messages
pub struct MessageService<B: Bot> {
    bot: Arc<B>,
    context: Arc<AppContext>,
}

impl<B: Bot> MessageService<B> {
    pub fn new(bot: Arc<B>, context: Arc<AppContext>) -> Self {
        Self { bot, context }
    }

    /// Process an incoming message and return the reply, if any
    pub async fn process(&self, message: &Message) -> Result<Option<String>, BotError> {
        let bot_id = self.bot.bot_info().id;
        let action = self.context.commands.resolve(&bot_id, message);
        tracing::debug!(
            "[{}] {} (message {}) -> {}",
            message.channel_id,
            message.author,
            message.id,
            action.as_str()
        );

        match action {
            Action::Ignore => Ok(None),
            Action::Help => Ok(Some(self.context.commands.get_help())),
            Action::Search(term) => self.context.search.search(&term).await.map(Some),
            Action::Respond(response) => Ok(Some(response)),
        }
    }

    /// Process a message and send the reply. Failures are logged and reported
    /// to the originating channel with a generic message.
    pub async fn respond(&self, message: &Message) {
        if let Err(e) = self.try_respond(message).await {
            tracing::error!("[{}] Failed to handle message: {}", message.channel_id, e);
            if let Err(e) = self.bot.send_message(&message.channel_id, ERROR_REPLY).await {
                tracing::warn!("[{}] Failed to send error reply: {}", message.channel_id, e);
            }
        }
    }

    async fn try_respond(&self, message: &Message) -> Result<(), BotError> {
        if let Some(reply) = self.process(message).await? {
            self.bot.send_message(&message.channel_id, &reply).await?;
        }
        Ok(())
    }
}
