//! Static Search Client
//!
//! For testing and offline demos.

use std::sync::Mutex;

use async_trait::async_trait;

use super::SearchClient;
use crate::error::{Result, ToolError};
use crate::model::SearchHit;

enum Mode {
    Hits(Vec<SearchHit>),
    RateLimited,
    Failing(String),
}

/// Search client returning canned results and recording queries
pub struct StaticSearchClient {
    mode: Mode,
    queries: Mutex<Vec<String>>,
}

impl StaticSearchClient {
    /// Always return these hits (truncated to the requested cap)
    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self::from_mode(Mode::Hits(hits))
    }

    /// Always report provider throttling
    pub fn rate_limited() -> Self {
        Self::from_mode(Mode::RateLimited)
    }

    /// Always fail with a provider error
    pub fn failing(message: impl Into<String>) -> Self {
        Self::from_mode(Mode::Failing(message.into()))
    }

    fn from_mode(mode: Mode) -> Self {
        Self {
            mode,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SearchClient for StaticSearchClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }

        match &self.mode {
            Mode::Hits(hits) => Ok(hits.iter().take(max_results).cloned().collect()),
            Mode::RateLimited => Err(ToolError::RateLimited("StaticSearch".into())),
            Mode::Failing(message) => Err(ToolError::Provider(message.clone())),
        }
    }

    fn name(&self) -> &str {
        "StaticSearch"
    }
}
