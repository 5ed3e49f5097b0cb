//! Indicator Registry
//!
//! Catalogue of the numeric output columns. Chart and table code look
//! indicators up here by name before reading them from a row.

use std::collections::HashMap;

/// Indicator categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorCategory {
    /// Balance-sheet values (assets, liabilities, equity, cash)
    BalanceSheet,
    /// Income-statement values (EBIT, net income)
    IncomeStatement,
    /// Market data (market cap, P/E, beta)
    Market,
    /// Ratios computed by the calculator
    Derived,
    /// Analyst estimates and coverage
    Analyst,
}

impl IndicatorCategory {
    /// Display label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "Balance sheet",
            Self::IncomeStatement => "Income statement",
            Self::Market => "Market",
            Self::Derived => "Derived",
            Self::Analyst => "Analyst",
        }
    }
}

/// Indicator metadata
#[derive(Debug, Clone)]
pub struct IndicatorInfo {
    /// Column name (unique identifier)
    pub name: &'static str,
    /// Indicator category
    pub category: IndicatorCategory,
    /// Brief description of what the indicator measures
    pub description: &'static str,
}

/// Get all available indicator info, in cache-column order
pub fn available_indicators() -> Vec<IndicatorInfo> {
    vec![
        // Balance sheet
        IndicatorInfo {
            name: "total_assets",
            category: IndicatorCategory::BalanceSheet,
            description: "Total assets",
        },
        IndicatorInfo {
            name: "total_liabilities",
            category: IndicatorCategory::BalanceSheet,
            description: "Total liabilities net of minority interest",
        },
        IndicatorInfo {
            name: "equity",
            category: IndicatorCategory::BalanceSheet,
            description: "Total equity gross of minority interest",
        },
        // Income statement
        IndicatorInfo {
            name: "ebit",
            category: IndicatorCategory::IncomeStatement,
            description: "Earnings before interest and taxes",
        },
        IndicatorInfo {
            name: "net_income",
            category: IndicatorCategory::IncomeStatement,
            description: "Net income",
        },
        // Balance sheet
        IndicatorInfo {
            name: "cash_and_equivalents",
            category: IndicatorCategory::BalanceSheet,
            description: "Cash and cash equivalents",
        },
        // Market
        IndicatorInfo {
            name: "market_cap",
            category: IndicatorCategory::Market,
            description: "Market capitalization",
        },
        // Derived
        IndicatorInfo {
            name: "financial_debt",
            category: IndicatorCategory::Derived,
            description: "Total liabilities less accounts payable",
        },
        IndicatorInfo {
            name: "roa",
            category: IndicatorCategory::Derived,
            description: "EBIT over operating assets (assets less intangibles, cash and payables)",
        },
        IndicatorInfo {
            name: "roa_adj",
            category: IndicatorCategory::Derived,
            description: "Net income over total assets less cash",
        },
        IndicatorInfo {
            name: "ebit_price_ratio",
            category: IndicatorCategory::Derived,
            description: "EBIT over market cap (or market cap plus financial debt)",
        },
        // Market pass-through
        IndicatorInfo {
            name: "return_on_equity",
            category: IndicatorCategory::Market,
            description: "Return on equity as reported by the provider",
        },
        IndicatorInfo {
            name: "trailing_eps",
            category: IndicatorCategory::Market,
            description: "Trailing twelve-month earnings per share",
        },
        IndicatorInfo {
            name: "trailing_pe",
            category: IndicatorCategory::Market,
            description: "Trailing price to earnings",
        },
        // Analyst
        IndicatorInfo {
            name: "forward_pe",
            category: IndicatorCategory::Analyst,
            description: "Price over forward earnings estimate",
        },
        // Market pass-through
        IndicatorInfo {
            name: "beta",
            category: IndicatorCategory::Market,
            description: "Beta against the market",
        },
        IndicatorInfo {
            name: "price_to_book",
            category: IndicatorCategory::Market,
            description: "Price to book value",
        },
        IndicatorInfo {
            name: "dividend_yield",
            category: IndicatorCategory::Market,
            description: "Trailing dividend yield",
        },
        // Analyst
        IndicatorInfo {
            name: "earnings_growth",
            category: IndicatorCategory::Analyst,
            description: "Earnings growth estimate",
        },
        IndicatorInfo {
            name: "revenue_growth",
            category: IndicatorCategory::Analyst,
            description: "Revenue growth estimate",
        },
        IndicatorInfo {
            name: "analyst_count",
            category: IndicatorCategory::Analyst,
            description: "Number of analyst opinions",
        },
        IndicatorInfo {
            name: "target_mean_price",
            category: IndicatorCategory::Analyst,
            description: "Mean analyst price target",
        },
    ]
}

/// Get indicators by category
pub fn indicators_by_category(category: IndicatorCategory) -> Vec<IndicatorInfo> {
    available_indicators()
        .into_iter()
        .filter(|i| i.category == category)
        .collect()
}

/// Get indicator info by name
pub fn get_indicator_info(name: &str) -> Option<IndicatorInfo> {
    available_indicators().into_iter().find(|i| i.name == name)
}

/// List all indicator names
pub fn list_indicator_names() -> Vec<&'static str> {
    available_indicators().into_iter().map(|i| i.name).collect()
}

/// Count indicators by category
pub fn count_by_category() -> HashMap<IndicatorCategory, usize> {
    let mut counts = HashMap::new();
    for indicator in available_indicators() {
        *counts.entry(indicator.category).or_insert(0) += 1;
    }
    counts
}
