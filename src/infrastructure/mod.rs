//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - GitHub: Issue search over the REST API
//! - Adapters: Platform integrations (Discord)

pub mod config;
pub mod github;
pub mod adapters;
