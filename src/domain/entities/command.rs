/// What the bot should do about an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Not addressed to the bot, or sent by the bot itself
    Ignore,
    /// Show the help text
    Help,
    /// Search GitHub issues for the (trimmed) term
    Search(String),
    /// Reply with a configured canned response
    Respond(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Ignore => "ignore",
            Action::Help => "help",
            Action::Search(_) => "search",
            Action::Respond(_) => "respond",
        }
    }
}
