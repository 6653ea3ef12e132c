//! Market Data Integration
//!
//! Abstractions and implementations for stock quote providers.

mod mock;
mod yahoo;

pub use mock::MockMarketData;
pub use yahoo::{YahooConfig, YahooFinanceClient};

use async_trait::async_trait;

use crate::error::Result;
use crate::model::MarketSnapshot;

/// Market data client trait (Strategy pattern)
///
/// A symbol the provider does not know is not an error: it comes back as a
/// snapshot without a price.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Get the latest snapshot for a ticker symbol
    async fn snapshot(&self, symbol: &str) -> Result<MarketSnapshot>;

    /// Provider name
    fn name(&self) -> &str;
}
