use async_trait::async_trait;
use crate::application::errors::BotError;
use crate::domain::entities::SearchResult;

/// IssueSearch trait - abstraction over the issue search backend
#[async_trait]
pub trait IssueSearch: Send + Sync {
    /// Run a search with the effective query (qualifiers included)
    async fn search(&self, query: &str) -> Result<SearchResult, BotError>;
}
