//! Yahoo Finance statements provider.
//!
//! Two requests per ticker: the fundamentals timeseries for the latest annual
//! balance sheet and income statement values, and `quoteSummary` for the
//! market capitalization and pass-through metrics.

use super::quote_summary::{QUOTE_SUMMARY_MODULES, parse_quote_summary};
use super::timeseries::{ANNUAL_STATEMENT_TYPES, parse_fundamentals_timeseries};
use crate::error::{DataError, Result};
use crate::provider::StatementProvider;
use chrono::Utc;
use fundus_ratios::FinancialRecord;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Yahoo Finance API base URL
const YAHOO_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Endpoint that hands out the session cookie the crumb is bound to
const COOKIE_URL: &str = "https://fc.yahoo.com";

/// Start of the timeseries window (2016-12-31 UTC)
const TIMESERIES_PERIOD_START: i64 = 1_483_142_400;

/// Default rate limit: 1 request per second
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(1000);

/// Browser-like user agent; Yahoo rejects unidentified clients
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)";

/// Rate limiter to keep requests spaced out
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// Yahoo Finance statements provider.
pub struct YahooStatementsProvider {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    crumb: Mutex<Option<String>>,
    base_url: String,
}

impl YahooStatementsProvider {
    /// Create a new provider with default rate limiting (1 req/sec).
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(DEFAULT_RATE_LIMIT)
    }

    /// Create a new provider with custom rate limiting.
    ///
    /// # Arguments
    /// * `min_interval` - Minimum duration between requests
    pub fn with_rate_limit(min_interval: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_interval))),
            crumb: Mutex::new(None),
            base_url: YAHOO_BASE_URL.to_string(),
        })
    }

    /// Point the provider at a different API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Session crumb, fetched once and reused.
    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // The cookie endpoint answers 404 but still sets the session cookie.
        self.client
            .get(COOKIE_URL)
            .send()
            .await
            .map_err(DataError::Network)?;

        let url = format!("{}/v1/test/getcrumb", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(DataError::Network)?;

        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "Failed to obtain session crumb: HTTP {}",
                response.status()
            )));
        }

        let crumb = response.text().await.map_err(DataError::Network)?;
        let crumb = crumb.trim();
        if crumb.is_empty() || crumb.contains('<') {
            return Err(DataError::YahooApi("Invalid session crumb".to_string()));
        }

        debug!("obtained Yahoo session crumb");
        *cached = Some(crumb.to_string());
        Ok(crumb.to_string())
    }

    fn normalize(symbol: &str) -> Result<String> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }
        Ok(symbol.to_uppercase())
    }

    /// Rate-limited GET with the session crumb appended. 404 bodies are
    /// returned as-is; Yahoo puts its error description there.
    async fn get_body(&self, url: &str, query: &[(&str, String)], what: &str) -> Result<String> {
        let crumb = self.crumb().await?;

        self.rate_limiter.lock().await.wait().await;

        debug!(%url, "requesting {}", what);
        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("crumb", crumb.as_str())])
            .send()
            .await
            .map_err(DataError::Network)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Stale crumb; the next call starts a new session.
            self.crumb.lock().await.take();
        }

        let body = response.text().await.map_err(DataError::Network)?;
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::Http(format!(
                "Failed to fetch {}: HTTP {}",
                what, status
            )));
        }
        Ok(body)
    }

    /// Fetch the raw quoteSummary JSON for a symbol.
    pub async fn fetch_quote_summary(&self, symbol: &str) -> Result<String> {
        let symbol = Self::normalize(symbol)?;
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);
        self.get_body(
            &url,
            &[("modules", QUOTE_SUMMARY_MODULES.to_string())],
            &format!("quoteSummary for {symbol}"),
        )
        .await
    }

    /// Fetch the raw annual fundamentals timeseries JSON for a symbol.
    pub async fn fetch_fundamentals_timeseries(&self, symbol: &str) -> Result<String> {
        let symbol = Self::normalize(symbol)?;
        let url = format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/{}",
            self.base_url, symbol
        );
        self.get_body(
            &url,
            &[
                ("symbol", symbol.clone()),
                ("type", ANNUAL_STATEMENT_TYPES.join(",")),
                ("period1", TIMESERIES_PERIOD_START.to_string()),
                ("period2", Utc::now().timestamp().to_string()),
            ],
            &format!("fundamentals timeseries for {symbol}"),
        )
        .await
    }
}

impl StatementProvider for YahooStatementsProvider {
    async fn fetch_record(&self, ticker: &str) -> Result<FinancialRecord> {
        let statement_body = self.fetch_fundamentals_timeseries(ticker).await?;
        let statement = parse_fundamentals_timeseries(ticker, &statement_body)?;

        let market_body = self.fetch_quote_summary(ticker).await?;
        let mut record = parse_quote_summary(ticker, &market_body)?;

        debug!(ticker, as_of = %statement.as_of, "using annual statement");
        statement.apply_to(&mut record);
        Ok(record)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

impl std::fmt::Debug for YahooStatementsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooStatementsProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
