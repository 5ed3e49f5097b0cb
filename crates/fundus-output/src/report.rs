//! Run report: computed rows plus the tickers that were skipped.

use chrono::{DateTime, Utc};
use fundus_ratios::{EbitPriceConvention, TickerRatios};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A ticker that produced no row, with the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerFailure {
    /// Ticker symbol.
    pub ticker: String,

    /// Human-readable failure reason.
    pub reason: String,
}

impl TickerFailure {
    /// Create a new failure entry.
    pub fn new(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }
}

/// Summary of one fetch or load run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Report generation timestamp.
    pub generated_at: DateTime<Utc>,

    /// Denominator convention used for `ebit_price_ratio`.
    pub convention: EbitPriceConvention,

    /// Where the rows came from (provider name or `cache`).
    pub source: String,

    /// Computed rows, in input order.
    pub rows: Vec<TickerRatios>,

    /// Skipped tickers, in input order.
    pub failures: Vec<TickerFailure>,
}

const TABLE_COLUMNS: [&str; 7] = [
    "ticker",
    "market_cap",
    "financial_debt",
    "roa",
    "roa_adj",
    "ebit_price_ratio",
    "beta",
];

impl RunReport {
    /// Create a new report stamped with the current time.
    pub fn new(
        convention: EbitPriceConvention,
        source: impl Into<String>,
        rows: Vec<TickerRatios>,
        failures: Vec<TickerFailure>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            convention,
            source: source.into(),
            rows,
            failures,
        }
    }

    /// Whether every requested ticker produced a row.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Render the headline columns as a fixed-width text table, followed by
    /// any skipped tickers.
    pub fn to_ascii_table(&self) -> String {
        let mut out = rows_table(&self.rows);
        let _ = writeln!(
            out,
            "\n{} row(s), convention: {}, source: {}",
            self.rows.len(),
            self.convention,
            self.source
        );
        for failure in &self.failures {
            let _ = writeln!(out, "skipped {}: {}", failure.ticker, failure.reason);
        }
        out
    }

    /// Render the report as a Markdown document.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Fundamentals report\n");
        let _ = writeln!(
            out,
            "Generated {} from `{}` using the `{}` convention.\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.source,
            self.convention
        );

        let _ = writeln!(out, "| {} |", TABLE_COLUMNS.join(" | "));
        let _ = writeln!(out, "|{}", "---|".repeat(TABLE_COLUMNS.len()));
        for row in &self.rows {
            let _ = writeln!(out, "| {} |", cells(row).join(" | "));
        }

        if !self.failures.is_empty() {
            let _ = writeln!(out, "\n## Skipped\n");
            for failure in &self.failures {
                let _ = writeln!(out, "- **{}**: {}", failure.ticker, failure.reason);
            }
        }
        out
    }

    /// Convert the report to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn cells(row: &TickerRatios) -> [String; 7] {
    [
        row.ticker.clone(),
        format_money(row.market_cap),
        format_money(row.financial_debt),
        format_ratio(row.roa),
        format_ratio(row.roa_adj),
        format_ratio(row.ebit_price_ratio),
        format_ratio(row.beta),
    ]
}

/// Render the headline columns of `rows` as a fixed-width text table.
pub fn rows_table(rows: &[TickerRatios]) -> String {
    let body: Vec<[String; 7]> = rows.iter().map(cells).collect();
    let mut widths = TABLE_COLUMNS.map(str::len);
    for row_cells in &body {
        for (width, cell) in widths.iter_mut().zip(row_cells) {
            *width = (*width).max(cell.len());
        }
    }

    let rule: String = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");

    let mut out = String::new();
    let header: Vec<String> = TABLE_COLUMNS
        .iter()
        .zip(widths)
        .map(|(name, w)| format!(" {name:<w$} "))
        .collect();
    let _ = writeln!(out, "{}", header.join("|"));
    let _ = writeln!(out, "{rule}");
    for row_cells in &body {
        let line: Vec<String> = row_cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                if i == 0 {
                    format!(" {cell:<w$} ")
                } else {
                    format!(" {cell:>w$} ")
                }
            })
            .collect();
        let _ = writeln!(out, "{}", line.join("|"));
    }
    out
}

/// Format a currency amount with a K/M/B/T suffix; `-` for null.
pub fn format_money(value: Option<f64>) -> String {
    let Some(v) = value else {
        return "-".to_string();
    };
    if !v.is_finite() {
        return v.to_string();
    }
    let abs = v.abs();
    let (scaled, suffix) = if abs >= 1e12 {
        (v / 1e12, "T")
    } else if abs >= 1e9 {
        (v / 1e9, "B")
    } else if abs >= 1e6 {
        (v / 1e6, "M")
    } else if abs >= 1e3 {
        (v / 1e3, "K")
    } else {
        return format!("{v:.0}");
    };
    format!("{scaled:.2}{suffix}")
}

/// Format a ratio to four decimals; `-` for null.
pub fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.4}"),
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}
