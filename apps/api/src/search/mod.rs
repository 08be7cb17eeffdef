//! Web search: the second upstream dependency of an analysis.
//!
//! A search failure is never fatal: callers receive a tagged `SearchError` and carry on
//! with a search-less prompt.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod tavily;

pub use tavily::TavilyClient;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search API returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Search request failed: {0}")]
    Transport(String),

    #[error("Search timed out")]
    Timeout,

    #[error("Search is not configured")]
    NotConfigured,
}

impl SearchError {
    /// HTTP status carried by the error, when the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            SearchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A single ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    /// Highest score first.
    pub hits: Vec<SearchHit>,
}

impl SearchResult {
    pub fn new(query: &str, mut hits: Vec<SearchHit>) -> Self {
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Self {
            query: query.to_string(),
            hits,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Renders the top `limit` hits as a numbered block for prompt embedding.
    pub fn as_context(&self, limit: usize) -> String {
        self.hits
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, hit)| {
                format!(
                    "{}. {} ({})\n   {}",
                    i + 1,
                    hit.title.trim(),
                    hit.url,
                    hit.snippet.trim()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchResult, SearchError>;
}

/// Used when no search key is configured.
pub struct DisabledSearch;

#[async_trait]
impl WebSearch for DisabledSearch {
    async fn search(&self, _query: &str) -> Result<SearchResult, SearchError> {
        Err(SearchError::NotConfigured)
    }
}
