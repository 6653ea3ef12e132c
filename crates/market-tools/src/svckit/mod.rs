//! Service Kit - Agent Tools
//!
//! Tools that implement `chain_core::Tool` for the calculator, quote lookup
//! and analyst-opinion search.

mod calculator;
mod quote_lookup;
mod web_search;

pub use calculator::CalculatorTool;
pub use quote_lookup::{resolve_symbol, QuoteLookupTool};
pub use web_search::{refine_query, WebSearchConfig, WebSearchTool, RATE_LIMIT_MESSAGE};
