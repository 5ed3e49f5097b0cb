//! Caching layer for computed ratio rows.

pub mod csv;

pub use self::csv::{CacheInfo, CsvCache, DEFAULT_CACHE_FILE, META_EXTENSION};
