//! Web Search Integration
//!
//! Abstractions and implementations for web search providers.

mod duckduckgo;
mod mock;

pub use duckduckgo::{DuckDuckGoClient, DuckDuckGoConfig};
pub use mock::StaticSearchClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::SearchHit;

/// Search client trait (Strategy pattern)
///
/// Each call is a fresh round trip. Implementations must report provider
/// throttling as [`ToolError::RateLimited`](crate::error::ToolError) and
/// must not retry on their own.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Run a query, returning at most `max_results` hits in provider order
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;

    /// Provider name
    fn name(&self) -> &str;
}
