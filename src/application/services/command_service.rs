use crate::domain::entities::{Action, Message};
use crate::infrastructure::config::UserCommand;

/// Built-in help trigger
pub const HELP_COMMAND: &str = "!help";

/// Built-in GitHub search prefix
pub const SEARCH_PREFIX: &str = "!gh";

/// Service for matching messages against built-in and configured commands
pub struct CommandService {
    commands: Vec<UserCommand>,
}

impl CommandService {
    pub fn new(commands: Vec<UserCommand>) -> Self {
        Self { commands }
    }

    /// Decide what to do with a message. `bot_id` is the bot's own user id.
    pub fn resolve(&self, bot_id: &str, message: &Message) -> Action {
        if message.author.id == bot_id {
            return Action::Ignore;
        }

        let content = message.trimmed();
        if content == HELP_COMMAND || (!bot_id.is_empty() && content.contains(bot_id)) {
            Action::Help
        } else if let Some(term) = content.strip_prefix(SEARCH_PREFIX) {
            Action::Search(term.trim().to_string())
        } else {
            self.find(content)
                .map(|cmd| Action::Respond(cmd.response.clone()))
                .unwrap_or(Action::Ignore)
        }
    }

    /// First configured command whose trigger equals `input` exactly
    pub fn find(&self, input: &str) -> Option<&UserCommand> {
        self.commands.iter().find(|cmd| cmd.command == input)
    }

    pub fn get_help(&self) -> String {
        let user_commands = self
            .commands
            .iter()
            .map(|cmd| format!("`{}` - {}", cmd.command, cmd.description))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            ":wave: Hi, I'm a tiny bot that can do some ntfy specific things:\n\n\
             `{} <search-term>` - Search GitHub\n{}\n`{}` - Show this help",
            SEARCH_PREFIX,
            user_commands.trim(),
            HELP_COMMAND,
        )
    }
}
