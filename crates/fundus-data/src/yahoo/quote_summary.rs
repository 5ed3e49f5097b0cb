//! Market data from the Yahoo Finance `quoteSummary` endpoint.
//!
//! Supplies the market capitalization and the pass-through metrics. Statement
//! values come from the fundamentals timeseries instead.

use crate::error::{DataError, Result};
use fundus_ratios::{FinancialRecord, MarketInfo};
use serde::{Deserialize, Deserializer};

/// Modules requested from quoteSummary
pub(crate) const QUOTE_SUMMARY_MODULES: &str =
    "price,summaryDetail,defaultKeyStatistics,financialData";

/// Yahoo wraps numbers as `{"raw": 1.0, "fmt": "1.00"}` and uses `{}` for
/// missing values. Bare numbers are accepted too.
pub(crate) fn raw_value<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::Object(map) => map.get("raw").and_then(serde_json::Value::as_f64),
        _ => None,
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct YahooErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooErrorBody {
    pub(crate) fn into_error(self) -> DataError {
        DataError::YahooApi(format!(
            "{}: {}",
            self.code.unwrap_or_else(|| "Error".to_string()),
            self.description
                .unwrap_or_else(|| "no description".to_string())
        ))
    }
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<YahooErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct QuoteSummaryResult {
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetail>,
    default_key_statistics: Option<KeyStatistics>,
    financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PriceModule {
    #[serde(deserialize_with = "raw_value")]
    market_cap: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SummaryDetail {
    #[serde(rename = "trailingPE", deserialize_with = "raw_value")]
    trailing_pe: Option<f64>,
    #[serde(rename = "forwardPE", deserialize_with = "raw_value")]
    forward_pe: Option<f64>,
    #[serde(deserialize_with = "raw_value")]
    beta: Option<f64>,
    #[serde(deserialize_with = "raw_value")]
    dividend_yield: Option<f64>,
    #[serde(deserialize_with = "raw_value")]
    market_cap: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct KeyStatistics {
    #[serde(deserialize_with = "raw_value")]
    trailing_eps: Option<f64>,
    #[serde(deserialize_with = "raw_value")]
    price_to_book: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FinancialDataModule {
    #[serde(deserialize_with = "raw_value")]
    return_on_equity: Option<f64>,
    #[serde(deserialize_with = "raw_value")]
    earnings_growth: Option<f64>,
    #[serde(deserialize_with = "raw_value")]
    revenue_growth: Option<f64>,
    #[serde(deserialize_with = "raw_value")]
    number_of_analyst_opinions: Option<f64>,
    #[serde(deserialize_with = "raw_value")]
    target_mean_price: Option<f64>,
}

fn to_count(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v.round() as u32)
}

/// Parse a quoteSummary response body into a [`FinancialRecord`] carrying
/// the market capitalization and pass-through metrics.
///
/// Statement fields are left `None`; see
/// [`AnnualStatement::apply_to`](super::AnnualStatement::apply_to).
///
/// # Errors
///
/// `Parse` for malformed JSON, `YahooApi` when Yahoo reports an error, and
/// `MissingData` when the response carries no result for the symbol.
pub fn parse_quote_summary(symbol: &str, body: &str) -> Result<FinancialRecord> {
    let envelope: QuoteSummaryEnvelope = serde_json::from_str(body)
        .map_err(|e| DataError::Parse(format!("quoteSummary for {}: {}", symbol, e)))?;

    if let Some(error) = envelope.quote_summary.error {
        return Err(error.into_error());
    }

    let result = envelope
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| DataError::MissingData {
            symbol: symbol.to_string(),
            reason: "empty quoteSummary result".to_string(),
        })?;

    let price = result.price.unwrap_or_default();
    let summary = result.summary_detail.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();

    Ok(FinancialRecord {
        market_cap: price.market_cap.or(summary.market_cap),
        info: MarketInfo {
            return_on_equity: financial.return_on_equity,
            trailing_eps: stats.trailing_eps,
            trailing_pe: summary.trailing_pe,
            forward_pe: summary.forward_pe,
            beta: summary.beta,
            price_to_book: stats.price_to_book,
            dividend_yield: summary.dividend_yield,
            earnings_growth: financial.earnings_growth,
            revenue_growth: financial.revenue_growth,
            analyst_count: to_count(financial.number_of_analyst_opinions),
            target_mean_price: financial.target_mean_price,
        },
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_value_shapes() {
        #[derive(Deserialize)]
        struct Wrapped {
            #[serde(default, deserialize_with = "raw_value")]
            v: Option<f64>,
        }

        let parse = |json: &str| serde_json::from_str::<Wrapped>(json).unwrap().v;
        assert_eq!(parse(r#"{"v": {"raw": 1.5, "fmt": "1.50"}}"#), Some(1.5));
        assert_eq!(parse(r#"{"v": {}}"#), None);
        assert_eq!(parse(r#"{"v": 3}"#), Some(3.0));
        assert_eq!(parse(r#"{"v": "n/a"}"#), None);
        assert_eq!(parse(r#"{}"#), None);
    }

    #[test]
    fn test_to_count() {
        assert_eq!(to_count(Some(41.0)), Some(41));
        assert_eq!(to_count(Some(-1.0)), None);
        assert_eq!(to_count(Some(f64::NAN)), None);
        assert_eq!(to_count(None), None);
    }

    #[test]
    fn test_statement_fields_left_empty() {
        let body = r#"{"quoteSummary": {"result": [{
            "price": {"marketCap": {"raw": 10}}
        }], "error": null}}"#;

        let record = parse_quote_summary("XYZ", body).unwrap();
        assert_eq!(record.market_cap, Some(10.0));
        assert_eq!(record.total_assets, None);
        assert_eq!(record.ebit, None);
    }
}
