//! Domain Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw market data for one symbol, as returned by a provider
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Symbol the provider resolved
    pub symbol: String,

    /// Current (or regular-market) price, if the provider has one
    pub price: Option<Decimal>,

    /// Long company name
    pub long_name: Option<String>,

    /// Quote currency (ISO 4217)
    pub currency: Option<String>,
}

/// Stock quote returned by the quote lookup tool
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub company_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub currency: String,
    /// Local time of the lookup, `%Y-%m-%d %H:%M:%S`
    pub timestamp: String,
}

/// One web search result
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
    /// Publication date when the provider reports one, otherwise empty
    #[serde(default)]
    pub date: String,
}
