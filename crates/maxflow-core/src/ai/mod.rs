//! AI search backend.
//!
//! Free-text messages inside a managed flow are forwarded to an external
//! semantic search service. The service answers either with a plain text
//! answer or with a list of result cards; both are folded into
//! [`SearchOutcome`] so the engine never touches raw response JSON.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT_SECS: u64 = 15;
const RETRY_ATTEMPTS: u32 = 3;
const RETRY_DELAY_SECS: u64 = 1;

/// How many results to request when pagination is on.
const PAGINATED_TOP_K: u32 = 10;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchRequest {
    pub search_type: String,
    pub top_k: u32,
    pub database_name: String,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoryEntry {
    pub role: String,
    pub text: String,
}

impl SearchRequest {
    /// Build a request from the user's session search type and query.
    ///
    /// Session search types map onto backend/database pairs; anything
    /// unrecognized falls back to the FAQ database.
    pub fn from_user_query(search_type: &str, use_pagination: bool, query: &str) -> Self {
        let (backend, database) = match search_type {
            "companies" => ("semfuz", "cmp"),
            "products" => ("semfuz", "prdcts"),
            _ => ("gpt", "faq"),
        };
        Self {
            search_type: backend.to_string(),
            top_k: if use_pagination { PAGINATED_TOP_K } else { 1 },
            database_name: database.to_string(),
            history: vec![HistoryEntry {
                role: "user".to_string(),
                text: query.to_string(),
            }],
        }
    }
}

/// What the search service produced, with response-shape priority already
/// applied: cards win over a plain answer.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Answer(String),
    Cards(Vec<Value>),
    Empty,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub cards: Option<Vec<Value>>,
    #[serde(default)]
    pub product_cards: Option<Vec<Value>>,
}

impl SearchResponse {
    pub fn into_outcome(self) -> SearchOutcome {
        if let Some(cards) = self.cards.filter(|c| !c.is_empty()) {
            return SearchOutcome::Cards(cards);
        }
        if let Some(cards) = self.product_cards.filter(|c| !c.is_empty()) {
            return SearchOutcome::Cards(cards);
        }
        if let Some(answer) = self.answer.filter(|a| !a.is_empty()) {
            return SearchOutcome::Answer(answer);
        }
        SearchOutcome::Empty
    }
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, request: SearchRequest) -> Result<SearchOutcome>;
}

/// HTTP client for the search service with bounded fixed-delay retries.
pub struct HttpSearchClient {
    client: reqwest::Client,
    base_url: String,
    enabled: bool,
    attempts: u32,
    retry_delay: Duration,
}

impl HttpSearchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            enabled: true,
            attempts: RETRY_ATTEMPTS,
            retry_delay: Duration::from_secs(RETRY_DELAY_SECS),
        }
    }

    /// A disabled client answers every query with no results, which lets the
    /// bot run without the search service deployed.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    async fn post_search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let url = format!("{}/search/", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(request)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("search service returned {status}"));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SearchBackend for HttpSearchClient {
    async fn search(&self, request: SearchRequest) -> Result<SearchOutcome> {
        if !self.enabled {
            debug!("search service disabled, returning no results");
            return Ok(SearchOutcome::Empty);
        }

        let mut last_error = anyhow!("search service unavailable");
        for attempt in 1..=self.attempts {
            match self.post_search(&request).await {
                Ok(response) => return Ok(response.into_outcome()),
                Err(error) => {
                    warn!(attempt, "search request failed: {error:#}");
                    last_error = error;
                    if attempt < self.attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }
        Err(last_error)
    }
}
