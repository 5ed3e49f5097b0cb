//! One output row per ticker.

use crate::calculator::DerivedRatios;
use crate::record::FinancialRecord;
use serde::{Deserialize, Serialize};
use std::io;

/// Computed ratios for one ticker, in cache-column order.
///
/// Field names double as the header of the delimited cache file and as the
/// indicator names accepted by the chart builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerRatios {
    /// Ticker symbol
    pub ticker: String,
    /// Total assets
    pub total_assets: Option<f64>,
    /// Total liabilities
    pub total_liabilities: Option<f64>,
    /// Total equity
    pub equity: Option<f64>,
    /// EBIT
    pub ebit: Option<f64>,
    /// Net income
    pub net_income: Option<f64>,
    /// Cash and cash equivalents
    pub cash_and_equivalents: Option<f64>,
    /// Market capitalization
    pub market_cap: Option<f64>,
    /// Total liabilities less accounts payable
    pub financial_debt: Option<f64>,
    /// Return on operating assets
    pub roa: Option<f64>,
    /// Net income over non-cash assets
    pub roa_adj: Option<f64>,
    /// EBIT over market value
    pub ebit_price_ratio: Option<f64>,
    /// Return on equity
    pub return_on_equity: Option<f64>,
    /// Trailing EPS
    pub trailing_eps: Option<f64>,
    /// Trailing P/E
    pub trailing_pe: Option<f64>,
    /// Forward P/E
    pub forward_pe: Option<f64>,
    /// Beta
    pub beta: Option<f64>,
    /// Price to book
    pub price_to_book: Option<f64>,
    /// Dividend yield
    pub dividend_yield: Option<f64>,
    /// Earnings growth estimate
    pub earnings_growth: Option<f64>,
    /// Revenue growth estimate
    pub revenue_growth: Option<f64>,
    /// Number of analyst opinions
    pub analyst_count: Option<u32>,
    /// Mean analyst price target
    pub target_mean_price: Option<f64>,
}

impl TickerRatios {
    /// Cache header, in column order.
    pub const COLUMNS: [&'static str; 23] = [
        "ticker",
        "total_assets",
        "total_liabilities",
        "equity",
        "ebit",
        "net_income",
        "cash_and_equivalents",
        "market_cap",
        "financial_debt",
        "roa",
        "roa_adj",
        "ebit_price_ratio",
        "return_on_equity",
        "trailing_eps",
        "trailing_pe",
        "forward_pe",
        "beta",
        "price_to_book",
        "dividend_yield",
        "earnings_growth",
        "revenue_growth",
        "analyst_count",
        "target_mean_price",
    ];

    /// Assemble a row from its record and derived ratios.
    pub fn from_parts(ticker: &str, record: &FinancialRecord, ratios: &DerivedRatios) -> Self {
        let info = &record.info;
        Self {
            ticker: ticker.to_string(),
            total_assets: record.total_assets,
            total_liabilities: record.total_liabilities,
            equity: record.equity,
            ebit: record.ebit,
            net_income: record.net_income,
            cash_and_equivalents: record.cash_and_equivalents,
            market_cap: record.market_cap,
            financial_debt: Some(ratios.financial_debt),
            roa: ratios.roa,
            roa_adj: Some(ratios.roa_adj),
            ebit_price_ratio: ratios.ebit_price_ratio,
            return_on_equity: info.return_on_equity,
            trailing_eps: info.trailing_eps,
            trailing_pe: info.trailing_pe,
            forward_pe: info.forward_pe,
            beta: info.beta,
            price_to_book: info.price_to_book,
            dividend_yield: info.dividend_yield,
            earnings_growth: info.earnings_growth,
            revenue_growth: info.revenue_growth,
            analyst_count: info.analyst_count,
            target_mean_price: info.target_mean_price,
        }
    }

    /// Numeric value of the named indicator column.
    ///
    /// Returns `None` both for unknown names and for null cells; check the
    /// name against the registry first when the difference matters.
    pub fn indicator(&self, name: &str) -> Option<f64> {
        match name {
            "total_assets" => self.total_assets,
            "total_liabilities" => self.total_liabilities,
            "equity" => self.equity,
            "ebit" => self.ebit,
            "net_income" => self.net_income,
            "cash_and_equivalents" => self.cash_and_equivalents,
            "market_cap" => self.market_cap,
            "financial_debt" => self.financial_debt,
            "roa" => self.roa,
            "roa_adj" => self.roa_adj,
            "ebit_price_ratio" => self.ebit_price_ratio,
            "return_on_equity" => self.return_on_equity,
            "trailing_eps" => self.trailing_eps,
            "trailing_pe" => self.trailing_pe,
            "forward_pe" => self.forward_pe,
            "beta" => self.beta,
            "price_to_book" => self.price_to_book,
            "dividend_yield" => self.dividend_yield,
            "earnings_growth" => self.earnings_growth,
            "revenue_growth" => self.revenue_growth,
            "analyst_count" => self.analyst_count.map(f64::from),
            "target_mean_price" => self.target_mean_price,
            _ => None,
        }
    }

    /// Write `rows` as delimited text: the [`COLUMNS`](Self::COLUMNS) header,
    /// then one record per row with null values as empty cells. The header is
    /// written even when `rows` is empty.
    ///
    /// Both the ratio cache and the CSV export go through here.
    pub fn write_csv<W: io::Write>(rows: &[Self], writer: W) -> Result<W, csv::Error> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        wtr.write_record(Self::COLUMNS)?;
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.into_inner().map_err(|e| e.into_error().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::RatioCalculator;
    use crate::record::MarketInfo;

    fn sample_record() -> FinancialRecord {
        FinancialRecord {
            total_assets: Some(1000.0),
            total_liabilities: Some(600.0),
            equity: Some(400.0),
            ebit: Some(150.0),
            net_income: Some(100.0),
            cash_and_equivalents: Some(200.0),
            accounts_payable: Some(50.0),
            intangible_assets: None,
            market_cap: None,
            info: MarketInfo {
                beta: Some(1.3),
                analyst_count: Some(42),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_from_parts_copies_inputs_and_ratios() {
        let record = sample_record();
        let row = RatioCalculator::default().compute_row("AMZN", &record).unwrap();

        assert_eq!(row.ticker, "AMZN");
        assert_eq!(row.total_assets, Some(1000.0));
        assert_eq!(row.financial_debt, Some(550.0));
        assert_eq!(row.roa, Some(0.2));
        assert_eq!(row.roa_adj, Some(0.125));
        assert_eq!(row.ebit_price_ratio, None);
        assert_eq!(row.market_cap, None);
    }

    #[test]
    fn test_pass_through_fields_are_copied() {
        let row = RatioCalculator::default()
            .compute_row("AMZN", &sample_record())
            .unwrap();

        assert_eq!(row.beta, Some(1.3));
        assert_eq!(row.analyst_count, Some(42));
        assert_eq!(row.trailing_pe, None);
    }

    #[test]
    fn test_indicator_lookup() {
        let row = RatioCalculator::default()
            .compute_row("AMZN", &sample_record())
            .unwrap();

        assert_eq!(row.indicator("roa"), Some(0.2));
        assert_eq!(row.indicator("analyst_count"), Some(42.0));
        assert_eq!(row.indicator("ebit_price_ratio"), None);
        assert_eq!(row.indicator("ticker"), None);
        assert_eq!(row.indicator("no_such_column"), None);
    }

    #[test]
    fn test_columns_cover_every_numeric_field() {
        let row = RatioCalculator::default()
            .compute_row("AMZN", &sample_record())
            .unwrap();
        let json = serde_json::to_value(&row).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), TickerRatios::COLUMNS.len());
        for column in TickerRatios::COLUMNS {
            assert!(object.contains_key(column), "missing column {column}");
        }
    }

    #[test]
    fn test_write_csv_header_and_empty_cells() {
        let row = RatioCalculator::default()
            .compute_row("AMZN", &sample_record())
            .unwrap();
        let bytes = TickerRatios::write_csv(&[row], Vec::new()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), TickerRatios::COLUMNS.join(","));
        let record = lines.next().unwrap();
        assert!(record.starts_with("AMZN,1000"));
        // No market cap, so no ebit_price_ratio.
        assert!(record.contains(",,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_write_csv_empty_rows_writes_header() {
        let bytes = TickerRatios::write_csv(&[], Vec::new()).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            format!("{}\n", TickerRatios::COLUMNS.join(","))
        );
    }
}
