//! Domain entities - Core business objects with no external dependencies

pub mod user;
pub mod message;
pub mod command;
pub mod issue;

pub use user::User;
pub use message::Message;
pub use command::Action;
pub use issue::{Item, SearchResult};
