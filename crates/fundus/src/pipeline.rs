//! Sequential fetch, compute and cache pipeline.
//!
//! Tickers are processed strictly in order, one awaited fetch at a time. A
//! ticker whose fetch or ratio computation fails is logged, recorded as a
//! [`TickerFailure`] and skipped; the run continues with the next ticker.

use crate::error::{PipelineError, Result};
use crate::universe::TickerList;
use fundus_data::{CsvCache, StatementProvider};
use fundus_output::{RunReport, TickerFailure};
use fundus_ratios::{EbitPriceConvention, RatioCalculator, TickerRatios};
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

/// Source label for rows loaded from the cache.
pub const CACHE_SOURCE: &str = "cache";

/// What to do when a cache file already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Load the existing file and skip the provider.
    Reuse,
    /// Fetch every ticker and overwrite the file.
    #[default]
    Refresh,
}

/// Configuration for a pipeline run.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchConfig {
    /// Cache policy.
    pub policy: CachePolicy,
    /// Denominator convention for `ebit_price_ratio`.
    pub convention: EbitPriceConvention,
}

/// Rows and failures gathered from a provider.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Computed rows, input order.
    pub rows: Vec<TickerRatios>,
    /// Skipped tickers, input order.
    pub failures: Vec<TickerFailure>,
    /// Provider name.
    pub source: String,
}

fn report_failure(progress: Option<&ProgressBar>, failure: &TickerFailure) {
    let log = || warn!(ticker = %failure.ticker, "skipping ticker: {}", failure.reason);
    match progress {
        Some(pb) => pb.suspend(log),
        None => log(),
    }
}

/// Fetch each ticker's record and compute its row.
pub async fn collect_ratios<P: StatementProvider>(
    provider: &P,
    tickers: &TickerList,
    calculator: &RatioCalculator,
    progress: Option<&ProgressBar>,
) -> Collection {
    let mut collection = Collection {
        source: provider.name().to_string(),
        ..Default::default()
    };

    if let Some(pb) = progress {
        pb.set_length(tickers.len() as u64);
        pb.set_position(0);
    }

    for ticker in tickers {
        if let Some(pb) = progress {
            pb.set_message(format!("Fetching {ticker}..."));
        }
        debug!(ticker = %ticker, provider = provider.name(), "fetching statements");

        let outcome = match provider.fetch_record(ticker).await {
            Ok(record) => calculator
                .compute_row(ticker, &record)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(row) => collection.rows.push(row),
            Err(reason) => {
                let failure = TickerFailure::new(ticker.as_str(), reason);
                report_failure(progress, &failure);
                collection.failures.push(failure);
            }
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    collection
}

/// Whether the existing cache can be reused for `convention`.
///
/// A cache stored under another convention, or with no recorded convention,
/// would mix denominators across runs, so it is refetched instead.
fn reusable(cache: &CsvCache, convention: EbitPriceConvention) -> Result<bool> {
    if !cache.exists() {
        return Ok(false);
    }
    match cache.convention()? {
        Some(stored) if stored == convention => Ok(true),
        Some(stored) => {
            warn!(
                path = %cache.path().display(),
                %stored,
                requested = %convention,
                "cached ratios use another convention; refetching"
            );
            Ok(false)
        }
        None => {
            warn!(
                path = %cache.path().display(),
                "cached ratios have no recorded convention; refetching"
            );
            Ok(false)
        }
    }
}

/// Load rows from the cache or fetch them, per `config.policy`.
///
/// With [`CachePolicy::Reuse`] and an existing cache stored under
/// `config.convention`, the file is loaded as-is and the provider is never
/// called. Otherwise every ticker is fetched and the cache is overwritten
/// with the rows that succeeded.
pub async fn load_or_collect<P: StatementProvider>(
    provider: &P,
    tickers: &TickerList,
    cache: &CsvCache,
    config: FetchConfig,
    progress: Option<&ProgressBar>,
) -> Result<RunReport> {
    if config.policy == CachePolicy::Reuse && reusable(cache, config.convention)? {
        info!(path = %cache.path().display(), "reusing cached ratios");
        let rows = cache.load()?;
        if let Some(pb) = progress {
            pb.set_length(rows.len() as u64);
            pb.set_position(rows.len() as u64);
        }
        return Ok(RunReport::new(config.convention, CACHE_SOURCE, rows, Vec::new()));
    }

    if tickers.is_empty() {
        return Err(PipelineError::EmptyTickerList);
    }

    let calculator = RatioCalculator::new(config.convention);
    let collection = collect_ratios(provider, tickers, &calculator, progress).await;

    cache.store(&collection.rows, config.convention)?;
    info!(
        rows = collection.rows.len(),
        skipped = collection.failures.len(),
        path = %cache.path().display(),
        "stored ratios"
    );

    Ok(RunReport::new(
        config.convention,
        collection.source,
        collection.rows,
        collection.failures,
    ))
}
