//! # market-tools
//!
//! The three tools the chain orchestrator can dispatch:
//!
//! - **`calculate`** - arithmetic over `+ - * / ( )` through a restricted
//!   recursive-descent parser; nothing else is ever evaluated
//! - **`get_stock_price`** - current quote for a ticker or company name
//! - **`web_search`** - recent analyst opinions from a handful of finance sites
//!
//! Each tool reports problems as a failure descriptor rather than an error,
//! so the reasoning service can explain or work around them.
//!
//! ```text
//! "Calculate AAPL stock value in HKD"
//!   └─▶ get_stock_price {query: "AAPL"}      → {"symbol":"AAPL","price":189.84,...}
//!   └─▶ calculate {expression: "189.84*7.8"} → 1480.752
//!   └─▶ "AAPL is worth about 1,480.75 HKD per share."
//! ```

pub mod error;
pub mod expr;
pub mod market;
pub mod model;
pub mod search;
pub mod svckit;

use std::sync::Arc;

use chain_core::ToolRegistry;

pub use error::{Result, ToolError};
pub use model::{MarketSnapshot, Quote, SearchHit};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{CalculatorTool, QuoteLookupTool, WebSearchTool};
}

/// Registry holding all three tools, in catalog order
pub fn default_registry(
    market: Arc<dyn market::MarketDataClient>,
    search: Arc<dyn search::SearchClient>,
    search_config: svckit::WebSearchConfig,
) -> chain_core::Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(svckit::CalculatorTool::new())?;
    registry.register(svckit::QuoteLookupTool::new(market))?;
    registry.register(svckit::WebSearchTool::with_config(search, search_config))?;
    Ok(registry)
}

/// System prompt for the market assistant
pub const MARKET_ASSISTANT_PROMPT: &str = r#"You are a helpful assistant that can:
1. Look up stock prices using the get_stock_price function
2. Evaluate mathematical expressions using the calculate function
3. Search the web using the web_search function

When handling queries:
- For stock prices, use get_stock_price
- For news about a company, use web_search only if specifically requested
- For calculations, use the calculate function
- Combine tools only when explicitly asked by the user

Examples:
- "What's AAPL stock price?" → Use get_stock_price only
- "What's AAPL stock price and latest news?" → Use both get_stock_price and web_search
- "Calculate AAPL stock value in HKD" → Use get_stock_price then calculate

Keep responses concise but informative."#;
