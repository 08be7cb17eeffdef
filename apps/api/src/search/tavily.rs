//! Tavily search API client.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{SearchError, SearchHit, SearchResult, WebSearch};

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";
const MAX_RESULTS: u32 = 8;

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: f64,
}

pub struct TavilyClient {
    client: Client,
    api_key: String,
    timeout: Duration,
}

impl TavilyClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key,
            timeout,
        })
    }

    async fn send(&self, query: &str) -> Result<SearchResult, SearchError> {
        let request_body = TavilyRequest {
            api_key: &self.api_key,
            query,
            search_depth: "basic",
            max_results: MAX_RESULTS,
        };

        let response = self
            .client
            .post(TAVILY_SEARCH_URL)
            .json(&request_body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport)?;

        if !status.is_success() {
            warn!("Search API returned {}: {}", status, body);
            return Err(SearchError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let result = parse_tavily_response(query, &body)?;
        debug!("Search '{}' returned {} hits", query, result.hits.len());
        Ok(result)
    }
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, query: &str) -> Result<SearchResult, SearchError> {
        tokio::time::timeout(self.timeout, self.send(query))
            .await
            .map_err(|_| SearchError::Timeout)?
    }
}

fn classify_transport(e: reqwest::Error) -> SearchError {
    if e.is_timeout() {
        SearchError::Timeout
    } else {
        SearchError::Transport(e.to_string())
    }
}

fn parse_tavily_response(query: &str, body: &str) -> Result<SearchResult, SearchError> {
    let parsed: TavilyResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Transport(format!("Malformed search response: {e}")))?;

    let hits = parsed
        .results
        .into_iter()
        .filter(|r| !r.content.trim().is_empty())
        .map(|r| SearchHit {
            title: r.title,
            url: r.url,
            snippet: r.content,
            score: r.score,
        })
        .collect();

    Ok(SearchResult::new(query, hits))
}
