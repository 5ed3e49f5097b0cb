//! Ratio derivation.
//!
//! Maps one [`FinancialRecord`] to its [`DerivedRatios`]:
//!
//! ```text
//! financial_debt   = total_liabilities - accounts_payable
//! roa              = ebit / (total_assets - intangible_assets - cash - accounts_payable)
//! roa_adj          = net_income / (total_assets - cash)
//! ebit_price_ratio = ebit / market_cap                      (MarketCap)
//!                  = ebit / (market_cap + financial_debt)   (EnterpriseValue)
//! ```
//!
//! `roa` and `ebit_price_ratio` are null when their denominator is exactly zero.
//! `roa_adj` is not guarded and carries the IEEE result (`inf` or `NaN`) instead.

use crate::error::{RatioError, Result};
use crate::record::{FinancialRecord, RequiredField};
use crate::row::TickerRatios;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Denominator used for the EBIT/price ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EbitPriceConvention {
    /// `market_cap + financial_debt`
    EnterpriseValue,
    /// `market_cap` alone
    #[default]
    MarketCap,
}

impl EbitPriceConvention {
    /// Canonical name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EnterpriseValue => "enterprise-value",
            Self::MarketCap => "market-cap",
        }
    }

    /// Denominator for the given market cap and financial debt.
    pub const fn denominator(&self, market_cap: f64, financial_debt: f64) -> f64 {
        match self {
            Self::EnterpriseValue => market_cap + financial_debt,
            Self::MarketCap => market_cap,
        }
    }
}

impl fmt::Display for EbitPriceConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EbitPriceConvention {
    type Err = RatioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "enterprise-value" | "ev" => Ok(Self::EnterpriseValue),
            "market-cap" | "mcap" => Ok(Self::MarketCap),
            _ => Err(RatioError::UnknownConvention(s.to_string())),
        }
    }
}

/// Ratios derived from one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedRatios {
    /// Total liabilities less accounts payable
    pub financial_debt: f64,
    /// Operating asset base used by `roa`
    pub roa_denominator: f64,
    /// Return on operating assets, null on a zero denominator
    pub roa: Option<f64>,
    /// Net income over non-cash assets, unguarded
    pub roa_adj: f64,
    /// EBIT over the convention's denominator
    pub ebit_price_ratio: Option<f64>,
}

/// Derives [`DerivedRatios`] from financial records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatioCalculator {
    convention: EbitPriceConvention,
}

impl RatioCalculator {
    /// Create a calculator using the given EBIT/price convention.
    pub const fn new(convention: EbitPriceConvention) -> Self {
        Self { convention }
    }

    /// The configured EBIT/price convention.
    pub const fn convention(&self) -> EbitPriceConvention {
        self.convention
    }

    /// Derive the ratio set for one record.
    ///
    /// # Errors
    ///
    /// Returns [`RatioError::MissingRequiredField`] for the first absent field
    /// among [`RequiredField::ALL`]. A zero denominator is never an error.
    pub fn compute(&self, record: &FinancialRecord) -> Result<DerivedRatios> {
        let total_assets = record.require(RequiredField::TotalAssets)?;
        let total_liabilities = record.require(RequiredField::TotalLiabilities)?;
        record.require(RequiredField::Equity)?;
        let ebit = record.require(RequiredField::Ebit)?;
        let net_income = record.require(RequiredField::NetIncome)?;
        let cash = record.require(RequiredField::CashAndEquivalents)?;

        let accounts_payable = record.accounts_payable_or_zero();
        let intangible_assets = record.intangible_assets_or_zero();

        let financial_debt = total_liabilities - accounts_payable;

        let roa_denominator = total_assets - intangible_assets - cash - accounts_payable;
        let roa = if roa_denominator == 0.0 {
            None
        } else {
            Some(ebit / roa_denominator)
        };

        // Unguarded: a zero denominator yields inf/NaN, not null.
        let roa_adj = net_income / (total_assets - cash);

        let ebit_price_ratio = record.market_cap.and_then(|market_cap| {
            let denominator = self.convention.denominator(market_cap, financial_debt);
            if denominator == 0.0 {
                None
            } else {
                Some(ebit / denominator)
            }
        });

        Ok(DerivedRatios {
            financial_debt,
            roa_denominator,
            roa,
            roa_adj,
            ebit_price_ratio,
        })
    }

    /// Derive ratios and assemble the output row for `ticker`.
    ///
    /// # Errors
    ///
    /// Same as [`RatioCalculator::compute`].
    pub fn compute_row(&self, ticker: &str, record: &FinancialRecord) -> Result<TickerRatios> {
        let ratios = self.compute(record)?;
        Ok(TickerRatios::from_parts(ticker, record, &ratios))
    }
}
