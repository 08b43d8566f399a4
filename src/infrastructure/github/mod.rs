//! GitHub issue search client

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::application::errors::BotError;
use crate::domain::entities::SearchResult;
use crate::domain::traits::IssueSearch;

/// GitHub REST API base URL
pub const API_BASE: &str = "https://api.github.com";

/// Repository every search is scoped to
pub const REPOSITORY: &str = "binwiederhier/ntfy";

/// Searches issues and pull requests of a single repository
pub struct GithubClient {
    client: Client,
    api_base: String,
}

impl GithubClient {
    pub fn new() -> Result<Self, BotError> {
        Self::with_api_base(API_BASE)
    }

    pub fn with_api_base(api_base: impl Into<String>) -> Result<Self, BotError> {
        let client = Client::builder()
            .user_agent(concat!("ntfy-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BotError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build the search URL for an effective query
    pub fn search_url(&self, query: &str) -> Result<Url, BotError> {
        let q = format!("{} repo:{}", query, REPOSITORY);
        Url::parse_with_params(&format!("{}/search/issues", self.api_base), &[("q", q)])
            .map_err(|e| BotError::Internal(format!("Invalid search URL: {}", e)))
    }
}

#[async_trait]
impl IssueSearch for GithubClient {
    async fn search(&self, query: &str) -> Result<SearchResult, BotError> {
        let url = self.search_url(query)?;

        let response = self.client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!("GitHub API error: {}", response.status())));
        }

        response
            .json::<SearchResult>()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))
    }
}
