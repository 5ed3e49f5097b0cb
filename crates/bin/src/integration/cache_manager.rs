//! Cache location handling.
//!
//! The ratio cache lives in a platform-specific directory unless `--cache`
//! or `FUNDUS_CACHE` points elsewhere:
//! - Linux: `~/.cache/fundus/financial_data.csv`
//! - macOS: `~/Library/Caches/fundus/financial_data.csv`
//! - Windows: `%LOCALAPPDATA%\fundus\financial_data.csv`

use chrono::Local;
use fundus_data::{CsvCache, DataError};
use std::path::PathBuf;

/// Open the cache at `path`, or at the default location.
pub(crate) fn open_cache(path: Option<PathBuf>) -> CsvCache {
    CsvCache::new(path.unwrap_or_else(CsvCache::default_path))
}

/// Load cached rows, failing with a hint when no cache exists yet.
pub(crate) fn load_existing(
    cache: &CsvCache,
) -> Result<Vec<fundus_ratios::TickerRatios>, DataError> {
    if !cache.exists() {
        return Err(DataError::Cache(format!(
            "no cache at {}; run `fundus fetch` first",
            cache.path().display()
        )));
    }
    cache.load()
}

/// Print the cache location and contents summary.
pub(crate) fn print_cache_info(cache: &CsvCache) {
    println!("  Cache location: {}", cache.path().display());
    match cache.info() {
        Ok(Some(info)) => {
            let modified = info.modified.map_or_else(
                || "unknown".to_string(),
                |m| m.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
            );
            let convention = info
                .convention
                .map_or_else(|| "unknown".to_string(), |c| c.to_string());
            println!(
                "  Cached data: {} rows (updated {}, convention {})",
                info.rows, modified, convention
            );
        }
        Ok(None) => println!("  Cached data: none"),
        Err(e) => println!("  Cached data: unreadable ({e})"),
    }
}
