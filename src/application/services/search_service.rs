use std::sync::Arc;
use crate::application::errors::BotError;
use crate::domain::entities::{Item, SearchResult};
use crate::domain::traits::IssueSearch;

/// Qualifier appended when the user gives no `is:` scope
const DEFAULT_SCOPE: &str = "is:open";

/// Number of items rendered per reply
const MAX_SHOWN: usize = 3;

pub const USAGE_HINT: &str =
    ":person_facepalming: You're doing it wrong! Try `!gh <search-term>`, e.g. `!gh dark mode`";

/// Service for turning a search term into a formatted reply
pub struct SearchService {
    backend: Arc<dyn IssueSearch>,
}

impl SearchService {
    pub fn new(backend: Arc<dyn IssueSearch>) -> Self {
        Self { backend }
    }

    /// Search for `term` (already trimmed) and format the reply
    pub async fn search(&self, term: &str) -> Result<String, BotError> {
        if term.is_empty() {
            return Ok(USAGE_HINT.to_string());
        }

        let query = effective_query(term);
        tracing::debug!("Searching GitHub for: {}", query);

        let result = self.backend.search(&query).await?;
        tracing::debug!("Search for {} returned {} results", query, result.total_count);

        Ok(format_result(&query, &result))
    }
}

/// Default the search to open issues unless a scope is given
pub fn effective_query(term: &str) -> String {
    if term.contains("is:") {
        term.to_string()
    } else {
        format!("{} {}", term, DEFAULT_SCOPE)
    }
}

fn format_item(item: &Item) -> String {
    format!("**#{}**: {} - {}", item.number, item.title, item.html_url)
}

/// Frame the first items by the total count reported by the API
pub fn format_result(query: &str, result: &SearchResult) -> String {
    let items = result
        .items
        .iter()
        .take(MAX_SHOWN)
        .map(format_item)
        .collect::<Vec<_>>()
        .join("\n");

    match result.total_count {
        0 => format!(":astonished: Nothing found for `{}`", query),
        1 => format!(":tada: Exactly one GitHub issue found for `{}`:\n\n{}", query, items),
        n if n > 4 => format!(
            ":face_with_spiral_eyes: I found {} results for `{}` (showing only {}):\n\n{}",
            n, query, MAX_SHOWN, items
        ),
        n => format!(":sunglasses: I found {} results for `{}`:\n\n{}", n, query, items),
    }
}
