//! Yahoo Finance Market Data
//!
//! Uses the public chart endpoint, which needs no API key.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use url::Url;

use super::MarketDataClient;
use crate::error::{Result, ToolError};
use crate::model::MarketSnapshot;

/// Yahoo Finance client configuration
#[derive(Clone, Debug)]
pub struct YahooConfig {
    /// API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".into(),
            timeout_secs: 10,
        }
    }
}

impl YahooConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("YAHOO_FINANCE_URL")
            .unwrap_or_else(|_| "https://query1.finance.yahoo.com".into());

        Self {
            base_url,
            ..Default::default()
        }
    }
}

/// Yahoo Finance market data client
pub struct YahooFinanceClient {
    http: Client,
    config: YahooConfig,
}

impl YahooFinanceClient {
    pub fn new(config: YahooConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("chained-ops/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(YahooConfig::from_env())
    }

    fn chart_url(&self, symbol: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| ToolError::Provider(format!("invalid Yahoo Finance URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ToolError::Provider("Yahoo Finance URL cannot have a path".into()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("interval", "1d")
            .append_pair("range", "1d");
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    regular_market_price: Option<f64>,
    currency: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

/// Decode a chart response body into a snapshot
pub(crate) fn parse_chart(symbol: &str, body: &str) -> Result<MarketSnapshot> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| ToolError::Parse(format!("unexpected Yahoo Finance response: {}", e)))?;

    if let Some(error) = envelope.chart.error {
        if error.code == "Not Found" {
            return Ok(MarketSnapshot {
                symbol: symbol.to_string(),
                ..Default::default()
            });
        }
        return Err(ToolError::Provider(
            error.description.unwrap_or(error.code),
        ));
    }

    let Some(meta) = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .map(|r| r.meta)
    else {
        return Ok(MarketSnapshot {
            symbol: symbol.to_string(),
            ..Default::default()
        });
    };

    Ok(MarketSnapshot {
        symbol: meta.symbol.unwrap_or_else(|| symbol.to_string()),
        price: meta.regular_market_price.and_then(Decimal::from_f64),
        long_name: meta.long_name.or(meta.short_name),
        currency: meta.currency,
    })
}

#[async_trait]
impl MarketDataClient for YahooFinanceClient {
    async fn snapshot(&self, symbol: &str) -> Result<MarketSnapshot> {
        let url = self.chart_url(symbol)?;
        tracing::debug!(%url, "Fetching Yahoo Finance chart");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ToolError::RateLimited("Yahoo Finance".into()));
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(MarketSnapshot {
                symbol: symbol.to_string(),
                ..Default::default()
            });
        }

        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(%status, symbol, "Yahoo Finance request failed");
            return Err(ToolError::Provider(format!(
                "Yahoo Finance error {}: {}",
                status, body
            )));
        }

        parse_chart(symbol, &body)
    }

    fn name(&self) -> &str {
        "Yahoo Finance"
    }
}
