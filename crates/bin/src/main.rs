//! Fundus CLI binary.
//!
//! Fetches statements for a ticker list, derives ratios, caches them and
//! charts chosen indicators.

mod integration;

use clap::{ArgAction, Parser, Subcommand};
use fundus::data::{CsvCache, InMemoryProvider, StatementProvider, YahooStatementsProvider};
use fundus::output::{Chart, ChartKind, ChartSpec, RatioTable, RunReport};
use fundus::ratios::{EbitPriceConvention, IndicatorCategory, indicators_by_category};
use fundus::{CachePolicy, FetchConfig, TickerList, load_or_collect};
use indicatif::{ProgressBar, ProgressStyle};
use integration::cache_manager;
use integration::render::{OutputFormat, render_report, render_rows};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::warn;

#[derive(Parser)]
#[command(name = "fundus")]
#[command(about = "Fundus: financial ratio screener", long_about = None)]
#[command(version)]
struct Cli {
    /// Ratio cache file (defaults to the platform cache directory)
    #[arg(long, global = true, env = "FUNDUS_CACHE")]
    cache: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch statements, compute ratios and update the cache
    Fetch {
        /// Ticker symbols (defaults to AMZN)
        tickers: Vec<String>,

        /// File with ticker symbols, `#` starts a comment
        #[arg(long)]
        tickers_file: Option<PathBuf>,

        /// Denominator for the EBIT/price ratio
        #[arg(long, default_value = "market-cap")]
        convention: EbitPriceConvention,

        /// Load the existing cache instead of fetching
        #[arg(long)]
        reuse_cache: bool,

        /// Read records from a JSON snapshot instead of Yahoo Finance
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,

        /// Minimum milliseconds between Yahoo requests
        #[arg(long, default_value = "1000")]
        rate_limit_ms: u64,
    },

    /// Print the cached ratio table
    Show {
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Chart cached indicators
    Chart {
        /// Horizontal axis indicator
        #[arg(long)]
        x: String,

        /// Vertical axis indicator
        #[arg(long)]
        y: String,

        /// Third indicator: depth (scatter3d), size (bubble) or colour (scatter)
        #[arg(long)]
        z: Option<String>,

        /// Chart type: scatter, scatter3d or bubble
        #[arg(long, default_value = "scatter")]
        kind: ChartKind,

        /// HTML output file
        #[arg(long, default_value = "chart.html")]
        out: PathBuf,

        /// Print the Plotly figure JSON instead of writing HTML
        #[arg(long)]
        json: bool,
    },

    /// List indicators usable in charts
    Indicators,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    integration::logging::init(cli.verbose);
    let cache = cache_manager::open_cache(cli.cache);

    match cli.command {
        Commands::Fetch {
            tickers,
            tickers_file,
            convention,
            reuse_cache,
            snapshot,
            format,
            rate_limit_ms,
        } => {
            let mut list = TickerList::new(&tickers);
            if let Some(path) = tickers_file {
                list.extend(&TickerList::from_file(&path)?);
            }
            let config = FetchConfig {
                policy: if reuse_cache {
                    CachePolicy::Reuse
                } else {
                    CachePolicy::Refresh
                },
                convention,
            };
            let report = fetch(
                list.or_default_tickers(),
                &cache,
                config,
                snapshot.as_deref(),
                Duration::from_millis(rate_limit_ms),
            )
            .await?;
            println!("{}", render_report(&report, format)?);
        }
        Commands::Show { format } => {
            if format == OutputFormat::Text {
                cache_manager::print_cache_info(&cache);
                println!();
            }
            let rows = cache_manager::load_existing(&cache)?;
            println!("{}", render_rows(rows, cache.convention()?, format)?);
        }
        Commands::Chart {
            x,
            y,
            z,
            kind,
            out,
            json,
        } => {
            let mut spec = ChartSpec::new(kind, x, y);
            if let Some(z) = z {
                spec = spec.with_third(z);
            }
            chart(&cache, &spec, &out, json)?;
        }
        Commands::Indicators => list_indicators(),
    }

    Ok(())
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("█▓░"));
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn fetch(
    tickers: TickerList,
    cache: &CsvCache,
    config: FetchConfig,
    snapshot: Option<&Path>,
    rate_limit: Duration,
) -> Result<RunReport, Box<dyn std::error::Error>> {
    match snapshot {
        Some(path) => {
            let provider = InMemoryProvider::from_json_file(path)?;
            run_pipeline(&provider, &tickers, cache, config).await
        }
        None => {
            let provider = YahooStatementsProvider::with_rate_limit(rate_limit)?;
            run_pipeline(&provider, &tickers, cache, config).await
        }
    }
}

async fn run_pipeline<P: StatementProvider>(
    provider: &P,
    tickers: &TickerList,
    cache: &CsvCache,
    config: FetchConfig,
) -> Result<RunReport, Box<dyn std::error::Error>> {
    let pb = progress_bar();
    pb.set_message(format!("Fetching {} ticker(s)...", tickers.len()));

    let result = load_or_collect(provider, tickers, cache, config, Some(&pb)).await;
    pb.finish_and_clear();
    Ok(result?)
}

fn chart(
    cache: &CsvCache,
    spec: &ChartSpec,
    out: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    spec.validate()?;
    let rows = cache_manager::load_existing(cache)?;
    let table = RatioTable::from_rows(&rows)?;
    let chart = Chart::build(&table, spec)?;

    for ticker in chart.skipped() {
        warn!(ticker = %ticker, "no finite values for selected indicators");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&chart.to_plotly_json())?);
    } else {
        chart.write_html(out)?;
        println!(
            "Wrote {} chart of {} ticker(s) to {}",
            spec.kind,
            chart.points().len(),
            out.display()
        );
    }
    Ok(())
}

fn list_indicators() {
    for category in [
        IndicatorCategory::BalanceSheet,
        IndicatorCategory::IncomeStatement,
        IndicatorCategory::Market,
        IndicatorCategory::Derived,
        IndicatorCategory::Analyst,
    ] {
        println!("{}:", category.label());
        for info in indicators_by_category(category) {
            println!("  {:<22} {}", info.name, info.description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::try_parse_from([
            "fundus",
            "fetch",
            "aapl",
            "msft",
            "--convention",
            "enterprise-value",
            "--reuse-cache",
            "--format",
            "pretty-json",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch {
                tickers,
                convention,
                reuse_cache,
                format,
                rate_limit_ms,
                ..
            } => {
                assert_eq!(tickers, vec!["aapl", "msft"]);
                assert_eq!(convention, EbitPriceConvention::EnterpriseValue);
                assert!(reuse_cache);
                assert_eq!(format, OutputFormat::PrettyJson);
                assert_eq!(rate_limit_ms, 1000);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_parse_chart_with_global_cache() {
        let cli = Cli::try_parse_from([
            "fundus", "chart", "--x", "roa", "--y", "beta", "--z", "market_cap", "--kind",
            "bubble", "--cache", "/tmp/f.csv", "-vv",
        ])
        .unwrap();

        assert_eq!(cli.cache, Some(PathBuf::from("/tmp/f.csv")));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Chart { kind, z, .. } => {
                assert_eq!(kind, ChartKind::Bubble);
                assert_eq!(z.as_deref(), Some("market_cap"));
            }
            _ => panic!("expected chart"),
        }
    }

    #[test]
    fn test_rejects_unknown_convention() {
        assert!(Cli::try_parse_from(["fundus", "fetch", "--convention", "book"]).is_err());
    }
}
