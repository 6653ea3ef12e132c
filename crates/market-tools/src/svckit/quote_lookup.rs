//! Quote Lookup Tool
//!
//! Fetches the current stock price for a ticker symbol or company name.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;

use chain_core::{tool::ParameterSchema, Arguments, Tool, ToolOutcome, ToolSpec};

use crate::market::MarketDataClient;
use crate::model::Quote;

/// Company names resolved to tickers before querying the provider
const COMPANY_TICKERS: &[(&str, &str)] = &[
    ("microsoft", "MSFT"),
    ("apple", "AAPL"),
    ("google", "GOOGL"),
    ("amazon", "AMZN"),
    ("meta", "META"),
];

/// Best-effort company name to ticker resolution.
///
/// Short purely alphabetic queries are taken to be tickers already.
pub fn resolve_symbol(query: &str) -> String {
    let query = query.trim();
    let looks_like_ticker = !query.is_empty()
        && query.chars().all(char::is_alphabetic)
        && query.chars().count() <= 5;

    if looks_like_ticker {
        return query.to_string();
    }

    let lowered = query.to_lowercase();
    COMPANY_TICKERS
        .iter()
        .find(|(name, _)| *name == lowered)
        .map_or_else(|| query.to_string(), |(_, ticker)| (*ticker).to_string())
}

/// Tool for looking up stock prices
pub struct QuoteLookupTool {
    market: Arc<dyn MarketDataClient>,
}

impl QuoteLookupTool {
    pub fn new(market: Arc<dyn MarketDataClient>) -> Self {
        Self { market }
    }

    async fn lookup(&self, query: &str) -> ToolOutcome {
        let symbol = resolve_symbol(query).to_uppercase();

        let snapshot = match self.market.snapshot(&symbol).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(provider = self.market.name(), %symbol, error = %e, "Quote lookup failed");
                return ToolOutcome::failure(format!("Error looking up stock price: {}", e));
            }
        };

        let Some(price) = snapshot.price else {
            return ToolOutcome::failure(format!("Error: Could not find price for {}", query));
        };

        let quote = Quote {
            symbol,
            company_name: snapshot.long_name.unwrap_or_else(|| query.to_string()),
            price,
            currency: snapshot.currency.unwrap_or_else(|| "USD".into()),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        match serde_json::to_value(&quote) {
            Ok(value) => ToolOutcome::Success(value),
            Err(e) => ToolOutcome::failure(format!("Error looking up stock price: {}", e)),
        }
    }
}

#[async_trait]
impl Tool for QuoteLookupTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "get_stock_price".into(),
            description: "Get the current stock price for a given stock symbol or company name".into(),
            parameters: vec![
                ParameterSchema {
                    name: "query".into(),
                    param_type: "string".into(),
                    description: "Stock symbol (e.g., MSFT) or company name (e.g., Microsoft)".into(),
                    required: true,
                    default: None,
                    enum_values: None,
                },
            ],
            category: Some("market_data".into()),
        }
    }

    async fn execute(&self, arguments: &Arguments) -> ToolOutcome {
        match arguments.get("query").and_then(|v| v.as_str()) {
            Some(query) => self.lookup(query).await,
            None => ToolOutcome::failure("Error looking up stock price: missing query"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ToolError};
    use crate::market::MockMarketData;
    use crate::model::MarketSnapshot;
    use serde_json::json;

    struct DownMarket;

    #[async_trait]
    impl MarketDataClient for DownMarket {
        async fn snapshot(&self, _symbol: &str) -> Result<MarketSnapshot> {
            Err(ToolError::Provider("service unavailable".into()))
        }

        fn name(&self) -> &str {
            "Down"
        }
    }

    fn args(query: &str) -> Arguments {
        let mut args = Arguments::new();
        args.insert("query".into(), json!(query));
        args
    }

    #[test]
    fn test_resolve_symbol() {
        assert_eq!(resolve_symbol("AAPL"), "AAPL");
        assert_eq!(resolve_symbol("apple"), "apple");
        assert_eq!(resolve_symbol("Microsoft"), "MSFT");
        assert_eq!(resolve_symbol("Amazon"), "AMZN");
        assert_eq!(resolve_symbol("BRK.B"), "BRK.B");
        assert_eq!(resolve_symbol("Unknown Corp"), "Unknown Corp");
    }

    #[tokio::test]
    async fn test_lookup_ticker() {
        let tool = QuoteLookupTool::new(Arc::new(MockMarketData::new()));
        let outcome = tool.execute(&args("AAPL")).await;

        let ToolOutcome::Success(value) = outcome else {
            panic!("expected success, got {:?}", outcome);
        };
        assert_eq!(value["symbol"], "AAPL");
        assert_eq!(value["company_name"], "Apple Inc.");
        assert_eq!(value["price"], json!(189.84));
        assert_eq!(value["currency"], "USD");
        assert_eq!(value["timestamp"].as_str().map(str::len), Some(19));
    }

    #[tokio::test]
    async fn test_lookup_company_name() {
        let tool = QuoteLookupTool::new(Arc::new(MockMarketData::new()));
        let outcome = tool.execute(&args("Microsoft")).await;

        let ToolOutcome::Success(value) = outcome else {
            panic!("expected success, got {:?}", outcome);
        };
        assert_eq!(value["symbol"], "MSFT");
    }

    #[tokio::test]
    async fn test_missing_price_keeps_query() {
        let tool = QuoteLookupTool::new(Arc::new(MockMarketData::new()));
        let outcome = tool.execute(&args("Acme Widgets")).await;
        assert_eq!(
            outcome,
            ToolOutcome::failure("Error: Could not find price for Acme Widgets")
        );
    }

    #[tokio::test]
    async fn test_provider_error_is_failure() {
        let tool = QuoteLookupTool::new(Arc::new(DownMarket));
        let outcome = tool.execute(&args("AAPL")).await;
        assert_eq!(
            outcome,
            ToolOutcome::failure("Error looking up stock price: Provider error: service unavailable")
        );
    }
}
