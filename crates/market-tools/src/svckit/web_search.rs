//! Web Search Tool
//!
//! Searches for recent analyst opinions on a stock or company.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use chain_core::{tool::ParameterSchema, Arguments, Tool, ToolOutcome, ToolSpec};

use crate::search::SearchClient;

/// Failure text relayed when the search provider throttles us
pub const RATE_LIMIT_MESSAGE: &str =
    "Search temporarily unavailable due to rate limiting. Please try again in a few moments.";

const NO_RESULTS_MESSAGE: &str = "No recent analyst opinions found.";

const OPINION_SOURCES: &str =
    "site:seekingalpha.com OR site:marketwatch.com OR site:finance.yahoo.com";

/// Narrow a query toward analyst-opinion sources
pub fn refine_query(query: &str) -> String {
    format!(
        "{} stock analyst ratings investment opinion {}",
        query.trim(),
        OPINION_SOURCES
    )
}

/// Web search tool configuration
#[derive(Clone, Debug)]
pub struct WebSearchConfig {
    /// Courtesy pause before every provider call
    pub delay: Duration,

    /// Result cap when the caller gives none
    pub default_max_results: usize,

    /// Upper bound on any requested cap
    pub max_results_limit: usize,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            default_max_results: 3,
            max_results_limit: 10,
        }
    }
}

/// Tool for searching analyst opinions
pub struct WebSearchTool {
    client: Arc<dyn SearchClient>,
    config: WebSearchConfig,
}

impl WebSearchTool {
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        Self::with_config(client, WebSearchConfig::default())
    }

    pub fn with_config(client: Arc<dyn SearchClient>, config: WebSearchConfig) -> Self {
        Self { client, config }
    }

    fn result_cap(&self, arguments: &Arguments) -> usize {
        let requested = arguments
            .get("max_results")
            .and_then(|v| v.as_u64())
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(self.config.default_max_results);
        requested.clamp(1, self.config.max_results_limit)
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "web_search".into(),
            description: "Search the web for recent stock analysis and investment opinions".into(),
            parameters: vec![
                ParameterSchema {
                    name: "query".into(),
                    param_type: "string".into(),
                    description: "The search query".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
                ParameterSchema {
                    name: "max_results".into(),
                    param_type: "integer".into(),
                    description: format!(
                        "Maximum number of results to return, between 1 and {} (default: {})",
                        self.config.max_results_limit, self.config.default_max_results
                    ),
                    required: false,
                    default: Some(json!(self.config.default_max_results)),
                    enum_values: None,
                },
            ],
            category: Some("research".into()),
        }
    }

    async fn execute(&self, arguments: &Arguments) -> ToolOutcome {
        let Some(query) = arguments.get("query").and_then(|v| v.as_str()) else {
            return ToolOutcome::failure("Error performing search: missing query");
        };
        let max_results = self.result_cap(arguments);
        let refined = refine_query(query);

        tokio::time::sleep(self.config.delay).await;

        let hits = match self.client.search(&refined, max_results).await {
            Ok(hits) => hits,
            Err(e) if e.is_rate_limited() => {
                tracing::warn!(provider = self.client.name(), "Search rate limited");
                return ToolOutcome::failure(RATE_LIMIT_MESSAGE);
            }
            Err(e) => {
                tracing::warn!(provider = self.client.name(), error = %e, "Search failed");
                return ToolOutcome::failure(format!("Error performing search: {}", e));
            }
        };

        if hits.is_empty() {
            return ToolOutcome::success(NO_RESULTS_MESSAGE);
        }

        match serde_json::to_value(&hits) {
            Ok(value) => ToolOutcome::Success(value),
            Err(e) => ToolOutcome::failure(format!("Error performing search: {}", e)),
        }
    }
}
