//! Yahoo Finance data providers.

pub mod quote_summary;
pub mod statements;
pub mod timeseries;

pub use quote_summary::parse_quote_summary;
pub use statements::YahooStatementsProvider;
pub use timeseries::{ANNUAL_STATEMENT_TYPES, AnnualStatement, parse_fundamentals_timeseries};
