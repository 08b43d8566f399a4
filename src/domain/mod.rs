//! Domain layer - Core business objects and seams
//! 
//! This layer contains:
//! - Entities: Messages, users, search results, dispatch actions
//! - Traits: Abstractions for infrastructure (Bot, IssueSearch)

pub mod entities;
pub mod traits;
