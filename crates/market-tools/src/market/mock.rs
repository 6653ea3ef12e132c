//! Mock Market Data
//!
//! For testing and offline demos. Returns static prices.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::MarketDataClient;
use crate::error::Result;
use crate::model::MarketSnapshot;

/// Mock market data with static prices
#[derive(Default)]
pub struct MockMarketData;

impl MockMarketData {
    pub fn new() -> Self {
        Self
    }

    /// (price, long name)
    fn base_price(symbol: &str) -> Option<(Decimal, &'static str)> {
        match symbol.to_uppercase().as_str() {
            "AAPL" => Some((dec!(189.84), "Apple Inc.")),
            "MSFT" => Some((dec!(415.50), "Microsoft Corporation")),
            "GOOGL" => Some((dec!(172.63), "Alphabet Inc.")),
            "AMZN" => Some((dec!(186.13), "Amazon.com, Inc.")),
            "META" => Some((dec!(502.30), "Meta Platforms, Inc.")),
            "NVDA" => Some((dec!(121.79), "NVIDIA Corporation")),
            "TSLA" => Some((dec!(248.50), "Tesla, Inc.")),
            _ => None,
        }
    }
}

#[async_trait]
impl MarketDataClient for MockMarketData {
    async fn snapshot(&self, symbol: &str) -> Result<MarketSnapshot> {
        let symbol = symbol.to_uppercase();
        let known = Self::base_price(&symbol);

        Ok(MarketSnapshot {
            price: known.map(|(price, _)| price),
            long_name: known.map(|(_, name)| name.to_string()),
            currency: known.map(|_| "USD".to_string()),
            symbol,
        })
    }

    fn name(&self) -> &str {
        "MockMarket"
    }
}
