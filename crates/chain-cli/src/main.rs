//! chain - answer one question with chained tool calls
//!
//! Reads a single line from stdin, lets the reasoning service drive the
//! calculator, quote lookup and web search tools, and prints the answer.
//!
//! ```text
//! $ echo "Calculate AAPL stock value in HKD" | chain
//! ```

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chain_core::{Orchestrator, OrchestratorConfig, ReasoningService};
use chain_runtime::{OllamaService, OpenAiService};
use market_tools::{
    MARKET_ASSISTANT_PROMPT, default_registry,
    market::{MarketDataClient, MockMarketData, YahooFinanceClient},
    search::{DuckDuckGoClient, SearchClient},
    svckit::WebSearchConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the answer
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn,chain_core=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let service = reasoning_service()?;
    match service.health_check().await {
        Ok(true) => tracing::debug!("✓ Connected to {}", service.name()),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ {} not reachable - requests will likely fail", service.name());
        }
    }

    let market = market_data()?;
    let search: Arc<dyn SearchClient> =
        Arc::new(DuckDuckGoClient::with_defaults().context("building search client")?);
    let tools = default_registry(market, search, WebSearchConfig::default())?;

    let config = OrchestratorConfig {
        system_prompt: MARKET_ASSISTANT_PROMPT.into(),
        ..OrchestratorConfig::from_env()
    };
    let orchestrator = Orchestrator::new(service, Arc::new(tools), config);

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("reading question from stdin")?;
    let question = line.trim();
    if question.is_empty() {
        anyhow::bail!("no question given on stdin");
    }

    match orchestrator.ask(question).await {
        Ok(answer) => {
            println!("{}", answer);
            Ok(())
        }
        Err(e) => {
            tracing::error!("request failed: {}", e);
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}

/// Select the adapter with `CHAIN_PROVIDER` (`openai` or `ollama`)
fn reasoning_service() -> anyhow::Result<Arc<dyn ReasoningService>> {
    let provider = std::env::var("CHAIN_PROVIDER").unwrap_or_else(|_| "openai".into());
    match provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiService::from_env()?)),
        "ollama" => Ok(Arc::new(OllamaService::from_env())),
        other => anyhow::bail!("unknown CHAIN_PROVIDER '{}' (expected openai or ollama)", other),
    }
}

/// Select the quote source with `CHAIN_MARKET` (`yahoo` or `mock`)
fn market_data() -> anyhow::Result<Arc<dyn MarketDataClient>> {
    let source = std::env::var("CHAIN_MARKET").unwrap_or_else(|_| "yahoo".into());
    match source.as_str() {
        "yahoo" => Ok(Arc::new(
            YahooFinanceClient::from_env().context("building market data client")?,
        )),
        "mock" => Ok(Arc::new(MockMarketData::new())),
        other => anyhow::bail!("unknown CHAIN_MARKET '{}' (expected yahoo or mock)", other),
    }
}
