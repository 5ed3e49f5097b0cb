//! Raw financial-statement input.
//!
//! A [`FinancialRecord`] holds the most recent balance-sheet and income-statement
//! values for one company, as reported by the upstream provider, together with a
//! [`MarketInfo`] block of provider metrics that are carried through unchanged.

use crate::error::{RatioError, Result};
use serde::{Deserialize, Serialize};

/// Statement fields that have no default and must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    /// Total assets
    TotalAssets,
    /// Total liabilities (net of minority interest)
    TotalLiabilities,
    /// Total equity (gross of minority interest)
    Equity,
    /// Earnings before interest and taxes
    Ebit,
    /// Net income
    NetIncome,
    /// Cash and cash equivalents
    CashAndEquivalents,
}

impl RequiredField {
    /// All required fields, in statement order.
    pub const ALL: [Self; 6] = [
        Self::TotalAssets,
        Self::TotalLiabilities,
        Self::Equity,
        Self::Ebit,
        Self::NetIncome,
        Self::CashAndEquivalents,
    ];

    /// Field name as used in records and cache headers.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TotalAssets => "total_assets",
            Self::TotalLiabilities => "total_liabilities",
            Self::Equity => "equity",
            Self::Ebit => "ebit",
            Self::NetIncome => "net_income",
            Self::CashAndEquivalents => "cash_and_equivalents",
        }
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Provider metrics copied verbatim into the output row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketInfo {
    /// Return on equity
    pub return_on_equity: Option<f64>,
    /// Trailing twelve-month earnings per share
    pub trailing_eps: Option<f64>,
    /// Trailing P/E ratio
    pub trailing_pe: Option<f64>,
    /// Forward P/E ratio
    pub forward_pe: Option<f64>,
    /// Beta
    pub beta: Option<f64>,
    /// Price to book ratio
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

/// Most recent statement values for one company.
///
/// Every field is optional because the upstream source may omit any of them.
/// `accounts_payable` and `intangible_assets` read as zero when absent; the
/// fields listed in [`RequiredField`] must be present for ratios to be derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialRecord {
    /// Total assets
    pub total_assets: Option<f64>,
    /// Total liabilities (net of minority interest)
    pub total_liabilities: Option<f64>,
    /// Total equity (gross of minority interest)
    pub equity: Option<f64>,
    /// Earnings before interest and taxes
    pub ebit: Option<f64>,
    /// Net income
    pub net_income: Option<f64>,
    /// Cash and cash equivalents
    pub cash_and_equivalents: Option<f64>,
    /// Accounts payable (zero when absent)
    pub accounts_payable: Option<f64>,
    /// Intangible assets (zero when absent)
    pub intangible_assets: Option<f64>,
    /// Market capitalization
    pub market_cap: Option<f64>,
    /// Pass-through provider metrics
    pub info: MarketInfo,
}

impl FinancialRecord {
    /// Value of a required field, or `MissingRequiredField` if absent.
    pub fn require(&self, field: RequiredField) -> Result<f64> {
        let value = match field {
            RequiredField::TotalAssets => self.total_assets,
            RequiredField::TotalLiabilities => self.total_liabilities,
            RequiredField::Equity => self.equity,
            RequiredField::Ebit => self.ebit,
            RequiredField::NetIncome => self.net_income,
            RequiredField::CashAndEquivalents => self.cash_and_equivalents,
        };
        value.ok_or(RatioError::MissingRequiredField {
            field: field.name(),
        })
    }

    /// Required fields absent from this record.
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        RequiredField::ALL
            .into_iter()
            .filter(|field| self.require(*field).is_err())
            .collect()
    }

    /// Accounts payable, defaulting to zero.
    pub fn accounts_payable_or_zero(&self) -> f64 {
        self.accounts_payable.unwrap_or(0.0)
    }

    /// Intangible assets, defaulting to zero.
    pub fn intangible_assets_or_zero(&self) -> f64 {
        self.intangible_assets.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_present_field() {
        let record = FinancialRecord {
            ebit: Some(150.0),
            ..Default::default()
        };
        assert_eq!(record.require(RequiredField::Ebit), Ok(150.0));
    }

    #[test]
    fn test_require_absent_field_names_it() {
        let record = FinancialRecord::default();
        assert_eq!(
            record.require(RequiredField::CashAndEquivalents),
            Err(RatioError::MissingRequiredField {
                field: "cash_and_equivalents"
            })
        );
    }

    #[test]
    fn test_missing_fields() {
        let record = FinancialRecord {
            total_assets: Some(1.0),
            equity: Some(1.0),
            net_income: Some(1.0),
            ..Default::default()
        };
        assert_eq!(
            record.missing_fields(),
            vec![
                RequiredField::TotalLiabilities,
                RequiredField::Ebit,
                RequiredField::CashAndEquivalents,
            ]
        );
    }

    #[test]
    fn test_defaulted_fields() {
        let record = FinancialRecord::default();
        assert_eq!(record.accounts_payable_or_zero(), 0.0);
        assert_eq!(record.intangible_assets_or_zero(), 0.0);

        let record = FinancialRecord {
            accounts_payable: Some(50.0),
            intangible_assets: Some(25.0),
            ..Default::default()
        };
        assert_eq!(record.accounts_payable_or_zero(), 50.0);
        assert_eq!(record.intangible_assets_or_zero(), 25.0);
    }

    #[test]
    fn test_record_deserializes_with_gaps() {
        let json = r#"{"total_assets": 10.0, "info": {"beta": 1.1}}"#;
        let record: FinancialRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.total_assets, Some(10.0));
        assert_eq!(record.market_cap, None);
        assert_eq!(record.info.beta, Some(1.1));
        assert_eq!(record.info.analyst_count, None);
    }

    #[test]
    fn test_required_field_display() {
        assert_eq!(RequiredField::NetIncome.to_string(), "net_income");
        assert_eq!(RequiredField::ALL.len(), 6);
    }
}
