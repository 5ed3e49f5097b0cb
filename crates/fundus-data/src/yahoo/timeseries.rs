//! Annual statement values from the Yahoo Finance fundamentals timeseries.
//!
//! Each requested type (`annualTotalAssets`, `annualEBIT`, ...) comes back as
//! its own series of dated points. The most recent period reported by any
//! series is selected, and each field takes its value for that period.

use super::quote_summary::{YahooErrorBody, raw_value};
use crate::error::{DataError, Result};
use chrono::NaiveDate;
use fundus_ratios::FinancialRecord;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Series requested from the timeseries endpoint.
pub const ANNUAL_STATEMENT_TYPES: [&str; 8] = [
    "annualTotalAssets",
    "annualTotalLiabilitiesNetMinorityInterest",
    "annualTotalEquityGrossMinorityInterest",
    "annualEBIT",
    "annualNetIncome",
    "annualCashAndCashEquivalents",
    "annualAccountsPayable",
    "annualOtherIntangibleAssets",
];

/// Statement values for one annual period.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualStatement {
    /// Period end date
    pub as_of: NaiveDate,
    /// Total assets
    pub total_assets: Option<f64>,
    /// Total liabilities net of minority interest
    pub total_liabilities: Option<f64>,
    /// Total equity including minority interest
    pub equity: Option<f64>,
    /// EBIT
    pub ebit: Option<f64>,
    /// Net income
    pub net_income: Option<f64>,
    /// Cash and cash equivalents
    pub cash_and_equivalents: Option<f64>,
    /// Accounts payable
    pub accounts_payable: Option<f64>,
    /// Intangible assets other than goodwill
    pub intangible_assets: Option<f64>,
}

impl AnnualStatement {
    const fn empty(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            total_assets: None,
            total_liabilities: None,
            equity: None,
            ebit: None,
            net_income: None,
            cash_and_equivalents: None,
            accounts_payable: None,
            intangible_assets: None,
        }
    }

    fn set(&mut self, series: &str, value: f64) {
        let slot = match series {
            "annualTotalAssets" => &mut self.total_assets,
            "annualTotalLiabilitiesNetMinorityInterest" => &mut self.total_liabilities,
            "annualTotalEquityGrossMinorityInterest" => &mut self.equity,
            "annualEBIT" => &mut self.ebit,
            "annualNetIncome" => &mut self.net_income,
            "annualCashAndCashEquivalents" => &mut self.cash_and_equivalents,
            "annualAccountsPayable" => &mut self.accounts_payable,
            "annualOtherIntangibleAssets" => &mut self.intangible_assets,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Copy the statement fields into `record`, leaving market fields alone.
    pub fn apply_to(&self, record: &mut FinancialRecord) {
        record.total_assets = self.total_assets;
        record.total_liabilities = self.total_liabilities;
        record.equity = self.equity;
        record.ebit = self.ebit;
        record.net_income = self.net_income;
        record.cash_and_equivalents = self.cash_and_equivalents;
        record.accounts_payable = self.accounts_payable;
        record.intangible_assets = self.intangible_assets;
    }
}

#[derive(Debug, Deserialize)]
struct TimeseriesEnvelope {
    timeseries: Timeseries,
}

#[derive(Debug, Deserialize)]
struct Timeseries {
    #[serde(default)]
    result: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    error: Option<YahooErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeseriesPoint {
    as_of_date: String,
    #[serde(default, deserialize_with = "raw_value")]
    reported_value: Option<f64>,
}

fn series_name(item: &Map<String, Value>) -> Option<String> {
    item.get("meta")?
        .get("type")?
        .get(0)?
        .as_str()
        .map(str::to_string)
}

/// Parse a fundamentals-timeseries response into the most recent
/// [`AnnualStatement`].
///
/// Series without data are skipped; their fields stay `None`.
///
/// # Errors
///
/// `Parse` for malformed JSON, `YahooApi` when Yahoo reports an error, and
/// `MissingData` when no series carries a dated value.
pub fn parse_fundamentals_timeseries(symbol: &str, body: &str) -> Result<AnnualStatement> {
    let parse_error =
        |e: serde_json::Error| DataError::Parse(format!("timeseries for {}: {}", symbol, e));

    let envelope: TimeseriesEnvelope = serde_json::from_str(body).map_err(parse_error)?;
    if let Some(error) = envelope.timeseries.error {
        return Err(error.into_error());
    }

    let mut series: Vec<(String, Vec<(NaiveDate, f64)>)> = Vec::new();
    for mut item in envelope.timeseries.result.unwrap_or_default() {
        let Some(name) = series_name(&item) else {
            continue;
        };
        let Some(raw_points) = item.remove(&name) else {
            continue;
        };
        let points: Vec<Option<TimeseriesPoint>> =
            serde_json::from_value(raw_points).map_err(parse_error)?;

        let values = points
            .into_iter()
            .flatten()
            .filter_map(|p| {
                let date = NaiveDate::parse_from_str(&p.as_of_date, "%Y-%m-%d").ok()?;
                Some((date, p.reported_value?))
            })
            .collect();
        series.push((name, values));
    }

    let latest = series
        .iter()
        .flat_map(|(_, values)| values.iter().map(|(date, _)| *date))
        .max()
        .ok_or_else(|| DataError::MissingData {
            symbol: symbol.to_string(),
            reason: "no annual statement values".to_string(),
        })?;

    let mut statement = AnnualStatement::empty(latest);
    for (name, values) in &series {
        if let Some((_, value)) = values.iter().find(|(date, _)| *date == latest) {
            statement.set(name, *value);
        }
    }
    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_ignores_unknown_series() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let mut statement = AnnualStatement::empty(date);
        statement.set("annualGrossProfit", 1.0);
        assert_eq!(statement, AnnualStatement::empty(date));

        statement.set("annualEBIT", 2.0);
        assert_eq!(statement.ebit, Some(2.0));
    }

    #[test]
    fn test_apply_keeps_market_fields() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let mut statement = AnnualStatement::empty(date);
        statement.set("annualTotalAssets", 100.0);

        let mut record = FinancialRecord {
            market_cap: Some(5.0),
            ..Default::default()
        };
        statement.apply_to(&mut record);

        assert_eq!(record.total_assets, Some(100.0));
        assert_eq!(record.market_cap, Some(5.0));
    }

    #[test]
    fn test_null_points_are_skipped() {
        let body = r#"{"timeseries": {"result": [{
            "meta": {"symbol": ["XYZ"], "type": ["annualEBIT"]},
            "timestamp": [1, 2],
            "annualEBIT": [null, {"asOfDate": "2023-12-31", "reportedValue": {"raw": 7}}]
        }], "error": null}}"#;

        let statement = parse_fundamentals_timeseries("XYZ", body).unwrap();
        assert_eq!(statement.ebit, Some(7.0));
        assert_eq!(statement.as_of, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }
}
