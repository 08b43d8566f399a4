//! Application context shared by every message handler

use std::sync::Arc;
use crate::application::services::{CommandService, SearchService};
use crate::domain::traits::IssueSearch;
use crate::infrastructure::config::Config;

/// Read-only state built once at startup
pub struct AppContext {
    pub commands: CommandService,
    pub search: SearchService,
}

impl AppContext {
    pub fn new(config: &Config, search: Arc<dyn IssueSearch>) -> Self {
        Self {
            commands: CommandService::new(config.user_commands.clone()),
            search: SearchService::new(search),
        }
    }
}
