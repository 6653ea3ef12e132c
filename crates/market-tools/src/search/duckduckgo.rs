//! DuckDuckGo Search
//!
//! Queries the HTML endpoint (free, no API key) and extracts results from
//! the returned markup.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use url::Url;

use super::SearchClient;
use crate::error::{Result, ToolError};
use crate::model::SearchHit;

static RESULT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a\b([^>]*\bclass="result__a"[^>]*)>(.*?)</a>"#).expect("valid regex")
});
static RESULT_SNIPPET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<(?:a|div|td)\b[^>]*\bclass="result__snippet"[^>]*>(.*?)</(?:a|div|td)>"#)
        .expect("valid regex")
});
static HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bhref="([^"]*)""#).expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// DuckDuckGo client configuration
#[derive(Clone, Debug)]
pub struct DuckDuckGoConfig {
    /// HTML endpoint
    pub endpoint: String,

    /// Region code (`wt-wt` = no region)
    pub region: String,

    /// Time filter: `d`, `w`, `m`, `y`, or empty for any time
    pub time_range: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DuckDuckGoConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://html.duckduckgo.com/html/".into(),
            region: "wt-wt".into(),
            time_range: "m".into(),
            timeout_secs: 15,
        }
    }
}

/// DuckDuckGo client (free, no API key required)
pub struct DuckDuckGoClient {
    http: Client,
    config: DuckDuckGoConfig,
}

impl DuckDuckGoClient {
    pub fn new(config: DuckDuckGoConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("Mozilla/5.0 (compatible; chained-ops/", env!("CARGO_PKG_VERSION"), ")"))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(DuckDuckGoConfig::default())
    }
}

#[async_trait]
impl SearchClient for DuckDuckGoClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        // kp=-2 turns safe search off
        let form = [
            ("q", query),
            ("kl", self.config.region.as_str()),
            ("df", self.config.time_range.as_str()),
            ("kp", "-2"),
        ];

        let response = self
            .http
            .post(&self.config.endpoint)
            .form(&form)
            .send()
            .await?;
        let status = response.status();

        // DuckDuckGo answers throttled clients with 202 and a challenge page
        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::ACCEPTED {
            tracing::warn!(%status, "DuckDuckGo rate limit");
            return Err(ToolError::RateLimited("DuckDuckGo".into()));
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(ToolError::Provider(format!("DuckDuckGo returned {}", status)));
        }
        if body.contains("anomaly-modal") {
            return Err(ToolError::RateLimited("DuckDuckGo".into()));
        }

        Ok(parse_results(&body, max_results))
    }

    fn name(&self) -> &str {
        "DuckDuckGo"
    }
}

/// Extract organic results from the HTML endpoint's markup
pub(crate) fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let links: Vec<_> = RESULT_LINK.captures_iter(html).collect();
    let mut hits = Vec::new();

    for (i, caps) in links.iter().enumerate() {
        let (Some(whole), Some(attrs), Some(title)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let Some(href) = HREF.captures(attrs.as_str()).and_then(|c| c.get(1)) else {
            continue;
        };

        let link = resolve_link(href.as_str());
        if link.is_empty() || is_ad(&link) {
            continue;
        }

        let segment_end = links
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(html.len(), |m| m.start());
        let snippet = RESULT_SNIPPET
            .captures(&html[whole.end()..segment_end])
            .and_then(|c| c.get(1))
            .map(|m| clean_text(m.as_str()))
            .unwrap_or_default();

        hits.push(SearchHit {
            title: clean_text(title.as_str()),
            link,
            snippet,
            date: String::new(),
        });

        if hits.len() >= max_results {
            break;
        }
    }

    hits
}

/// Unwrap DuckDuckGo's `/l/?uddg=` redirect links
fn resolve_link(href: &str) -> String {
    let href = html_escape::decode_html_entities(href);
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.into_owned()
    };

    match Url::parse(&absolute) {
        Ok(url) if url.path() == "/l/" => url
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, target)| target.into_owned())
            .unwrap_or(absolute),
        _ => absolute,
    }
}

fn is_ad(link: &str) -> bool {
    link.contains("duckduckgo.com/y.js")
}

fn clean_text(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, "");
    let decoded = html_escape::decode_html_entities(&stripped);
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}
