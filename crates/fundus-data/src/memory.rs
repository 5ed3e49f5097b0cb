//! In-memory statement provider.
//!
//! Backs offline runs from a JSON snapshot of the form
//! `{"AAPL": {"total_assets": ..., "info": {...}}, ...}` and the pipeline tests.

use crate::error::{DataError, Result};
use crate::provider::StatementProvider;
use fundus_ratios::FinancialRecord;
use std::collections::BTreeMap;
use std::path::Path;

/// Provider serving records from a map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    records: BTreeMap<String, FinancialRecord>,
}

impl InMemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the record for `ticker`.
    pub fn insert(&mut self, ticker: &str, record: FinancialRecord) {
        self.records.insert(ticker.trim().to_uppercase(), record);
    }

    /// Builder-style [`InMemoryProvider::insert`].
    pub fn with_record(mut self, ticker: &str, record: FinancialRecord) -> Self {
        self.insert(ticker, record);
        self
    }

    /// Parse a JSON snapshot.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, FinancialRecord> = serde_json::from_str(json)?;
        let mut provider = Self::new();
        for (ticker, record) in raw {
            provider.insert(&ticker, record);
        }
        Ok(provider)
    }

    /// Load a JSON snapshot from disk.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Tickers with a record, sorted.
    pub fn tickers(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the provider holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl StatementProvider for InMemoryProvider {
    async fn fetch_record(&self, ticker: &str) -> Result<FinancialRecord> {
        let key = ticker.trim().to_uppercase();
        if key.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        self.records
            .get(&key)
            .cloned()
            .ok_or_else(|| DataError::MissingData {
                symbol: key,
                reason: "not present in snapshot".to_string(),
            })
    }

    fn name(&self) -> &str {
        "snapshot"
    }
}
