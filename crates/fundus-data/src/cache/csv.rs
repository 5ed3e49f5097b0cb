//! Delimited-text cache of computed ratio rows.
//!
//! One header row with the exact [`TickerRatios`] column names, then one row
//! per ticker. Null values are written as empty cells.
//!
//! The EBIT/price convention that produced the rows is kept in a JSON sidecar
//! next to the data file (`financial_data.meta.json`), so the CSV stays a
//! plain table.

use crate::error::{DataError, Result};
use chrono::{DateTime, Utc};
use fundus_ratios::{EbitPriceConvention, TickerRatios};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name used when no explicit cache path is given.
pub const DEFAULT_CACHE_FILE: &str = "financial_data.csv";

/// Extension of the sidecar holding the cache metadata.
pub const META_EXTENSION: &str = "meta.json";

#[derive(Debug, Serialize, Deserialize)]
struct CacheMeta {
    convention: EbitPriceConvention,
}

/// Summary of an existing cache file.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheInfo {
    /// Cache file location
    pub path: PathBuf,
    /// Number of ticker rows
    pub rows: usize,
    /// Last modification time, when the filesystem reports one
    pub modified: Option<DateTime<Utc>>,
    /// Convention the rows were computed with; `None` for caches written
    /// without a sidecar
    pub convention: Option<EbitPriceConvention>,
}

/// CSV cache for ratio rows.
#[derive(Debug, Clone)]
pub struct CsvCache {
    path: PathBuf,
}

impl CsvCache {
    /// Create a cache backed by `path`. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Platform cache location.
    ///
    /// - Linux: `~/.cache/fundus/financial_data.csv`
    /// - macOS: `~/Library/Caches/fundus/financial_data.csv`
    /// - Windows: `%LOCALAPPDATA%\fundus\financial_data.csv`
    ///
    /// Falls back to the working directory when no cache dir is known.
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .map(|dir| dir.join("fundus"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_CACHE_FILE)
    }

    /// Cache file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the cache file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Location of the metadata sidecar.
    pub fn meta_path(&self) -> PathBuf {
        self.path.with_extension(META_EXTENSION)
    }

    /// EBIT/price convention recorded when the cache was stored.
    ///
    /// `None` when there is no sidecar.
    ///
    /// # Errors
    ///
    /// `Serialization` if the sidecar exists but cannot be parsed.
    pub fn convention(&self) -> Result<Option<EbitPriceConvention>> {
        let meta_path = self.meta_path();
        if !meta_path.is_file() {
            return Ok(None);
        }
        let meta: CacheMeta = serde_json::from_str(&fs::read_to_string(&meta_path)?)?;
        Ok(Some(meta.convention))
    }

    /// Read every row from the cache.
    ///
    /// # Errors
    ///
    /// `Cache` if the file is missing or its header differs from
    /// [`TickerRatios::COLUMNS`]; `Csv` for malformed rows.
    pub fn load(&self) -> Result<Vec<TickerRatios>> {
        if !self.exists() {
            return Err(DataError::Cache(format!(
                "no cache file at {}",
                self.path.display()
            )));
        }

        let mut reader = ::csv::Reader::from_path(&self.path)?;
        let headers = reader.headers()?.clone();
        if headers.iter().ne(TickerRatios::COLUMNS.iter().copied()) {
            return Err(DataError::Cache(format!(
                "unexpected header in {}: {}",
                self.path.display(),
                headers.iter().collect::<Vec<_>>().join(",")
            )));
        }

        let rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<TickerRatios>, _>>()?;
        info!(path = %self.path.display(), rows = rows.len(), "loaded ratio cache");
        Ok(rows)
    }

    /// Replace the cache contents with `rows`, recording the convention
    /// they were computed with.
    ///
    /// Parent directories are created as needed. The header is written even
    /// when `rows` is empty.
    pub fn store(&self, rows: &[TickerRatios], convention: EbitPriceConvention) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        TickerRatios::write_csv(rows, fs::File::create(&self.path)?)?;

        let meta = CacheMeta { convention };
        fs::write(self.meta_path(), serde_json::to_string_pretty(&meta)?)?;

        info!(
            path = %self.path.display(),
            rows = rows.len(),
            %convention,
            "stored ratio cache"
        );
        Ok(())
    }

    /// Row count and modification time, or `None` if there is no cache yet.
    pub fn info(&self) -> Result<Option<CacheInfo>> {
        if !self.exists() {
            return Ok(None);
        }

        let modified = fs::metadata(&self.path)?
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);
        let mut reader = ::csv::Reader::from_path(&self.path)?;
        let rows = reader.records().count();

        Ok(Some(CacheInfo {
            path: self.path.clone(),
            rows,
            modified,
            convention: self.convention()?,
        }))
    }
}
