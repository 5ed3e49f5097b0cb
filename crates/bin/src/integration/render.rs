//! Output rendering for the `fetch` and `show` commands.

use clap::ValueEnum;
use fundus_output::{
    ExportError, ExportFormat, Exporter, RatioTable, RunReport, format_ratio, rows_table,
};
use fundus::CACHE_SOURCE;
use fundus_ratios::{EbitPriceConvention, TickerRatios};
use std::fmt::Write;

/// Derived columns summarised by `show`.
const SUMMARY_COLUMNS: [&str; 3] = ["roa", "roa_adj", "ebit_price_ratio"];

/// Output format for row listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Fixed-width text table
    #[default]
    Text,
    /// Markdown report
    Markdown,
    /// CSV with the cache header
    Csv,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    PrettyJson,
}

impl OutputFormat {
    const fn export_format(self) -> Option<ExportFormat> {
        match self {
            Self::Csv => Some(ExportFormat::Csv),
            Self::Json => Some(ExportFormat::Json),
            Self::PrettyJson => Some(ExportFormat::PrettyJson),
            Self::Text | Self::Markdown => None,
        }
    }
}

/// Render a pipeline report.
pub(crate) fn render_report(
    report: &RunReport,
    format: OutputFormat,
) -> Result<String, ExportError> {
    match (format, format.export_format()) {
        (OutputFormat::Markdown, _) => Ok(report.to_markdown()),
        (_, Some(export)) => report.rows.export_to_string(export),
        _ => Ok(report.to_ascii_table()),
    }
}

/// Render cached rows, with per-column statistics in text mode.
///
/// `convention` is the one recorded with the cache. The markdown report
/// states it, so a cache without one is rejected there.
pub(crate) fn render_rows(
    rows: Vec<TickerRatios>,
    convention: Option<EbitPriceConvention>,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(export) = format.export_format() {
        return Ok(rows.export_to_string(export)?);
    }
    if format == OutputFormat::Markdown {
        let convention = convention.ok_or(
            "cache has no recorded EBIT/price convention; rerun `fundus fetch` to rebuild it",
        )?;
        let report = RunReport::new(convention, CACHE_SOURCE, rows, Vec::new());
        return Ok(report.to_markdown());
    }

    let mut out = rows_table(&rows);
    let table = RatioTable::from_rows(&rows)?;
    let convention = convention.map_or_else(|| "unknown".to_string(), |c| c.to_string());
    let _ = writeln!(out, "\n{} row(s), convention: {}", table.height(), convention);
    for name in SUMMARY_COLUMNS {
        if let Some(stats) = table.column_stats(name)? {
            let _ = writeln!(
                out,
                "  {name:<18} n={:<4} mean={:>10} min={:>10} max={:>10}",
                stats.count,
                format_ratio(Some(stats.mean)),
                format_ratio(Some(stats.min)),
                format_ratio(Some(stats.max)),
            );
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<TickerRatios> {
        vec![
            TickerRatios {
                ticker: "AMZN".to_string(),
                roa: Some(0.2),
                roa_adj: Some(0.125),
                ebit_price_ratio: Some(0.075),
                ..Default::default()
            },
            TickerRatios {
                ticker: "MSFT".to_string(),
                roa: Some(0.1),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_render_report_text() {
        let report = RunReport::new(EbitPriceConvention::MarketCap, "snapshot", rows(), vec![]);
        let text = render_report(&report, OutputFormat::Text).unwrap();
        assert!(text.contains("source: snapshot"));
    }

    #[test]
    fn test_render_report_csv() {
        let report = RunReport::new(EbitPriceConvention::MarketCap, "snapshot", rows(), vec![]);
        let csv = render_report(&report, OutputFormat::Csv).unwrap();
        assert!(csv.starts_with("ticker,total_assets"));
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_render_rows_text_has_stats() {
        let text = render_rows(rows(), Some(EbitPriceConvention::MarketCap), OutputFormat::Text)
            .unwrap();
        assert!(text.contains("2 row(s), convention: market-cap"));
        assert!(text.contains("roa                n=2"));
        assert!(text.contains("mean=    0.1500"));
        assert!(text.contains("ebit_price_ratio   n=1"));
    }

    #[test]
    fn test_render_rows_markdown_states_stored_convention() {
        let md = render_rows(
            rows(),
            Some(EbitPriceConvention::EnterpriseValue),
            OutputFormat::Markdown,
        )
        .unwrap();
        assert!(md.contains("| AMZN |"));
        assert!(md.contains("`enterprise-value`"));
        assert!(!md.contains("market-cap"));
    }

    #[test]
    fn test_render_rows_markdown_requires_convention() {
        let err = render_rows(rows(), None, OutputFormat::Markdown).unwrap_err();
        assert!(err.to_string().contains("fundus fetch"));

        let text = render_rows(rows(), None, OutputFormat::Text).unwrap();
        assert!(text.contains("convention: unknown"));
    }
}
