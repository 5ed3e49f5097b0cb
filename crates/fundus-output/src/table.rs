//! Ratio table backed by a polars `DataFrame`.

use fundus_ratios::{TickerRatios, get_indicator_info, list_indicator_names};
use polars::prelude::*;
use thiserror::Error;

/// Errors raised by table operations.
#[derive(Debug, Error)]
pub enum TableError {
    /// Polars error.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Column name not in the indicator registry.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}

/// Simple statistics over the finite values of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    /// Number of finite values
    pub count: usize,
    /// Mean of finite values
    pub mean: f64,
    /// Smallest finite value
    pub min: f64,
    /// Largest finite value
    pub max: f64,
}

/// Ratio rows as a `DataFrame`: a `ticker` column followed by one `f64`
/// column per registry indicator, in registry order.
#[derive(Debug, Clone)]
pub struct RatioTable {
    df: DataFrame,
}

impl RatioTable {
    /// Build a table from ratio rows.
    pub fn from_rows(rows: &[TickerRatios]) -> Result<Self, TableError> {
        let tickers: Vec<String> = rows.iter().map(|r| r.ticker.clone()).collect();

        let mut columns: Vec<Column> = vec![Series::new("ticker".into(), tickers).into()];
        for name in list_indicator_names() {
            let values: Vec<Option<f64>> = rows.iter().map(|r| r.indicator(name)).collect();
            columns.push(Series::new(name.into(), values).into());
        }

        Ok(Self {
            df: DataFrame::new(columns)?,
        })
    }

    /// Underlying `DataFrame`.
    pub const fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Ticker column.
    pub fn tickers(&self) -> Result<Vec<String>, TableError> {
        Ok(self
            .df
            .column("ticker")?
            .str()?
            .into_iter()
            .map(|t| t.unwrap_or_default().to_string())
            .collect())
    }

    /// Values of an indicator column, nulls as `None`.
    pub fn column_values(&self, name: &str) -> Result<Vec<Option<f64>>, TableError> {
        if get_indicator_info(name).is_none() {
            return Err(TableError::UnknownColumn(name.to_string()));
        }
        Ok(self.df.column(name)?.f64()?.into_iter().collect())
    }

    /// Table restricted to `ticker` plus the given indicator columns.
    pub fn select(&self, names: &[&str]) -> Result<DataFrame, TableError> {
        let mut selection = vec!["ticker"];
        for name in names {
            if get_indicator_info(name).is_none() {
                return Err(TableError::UnknownColumn((*name).to_string()));
            }
            selection.push(name);
        }
        Ok(self.df.select(selection)?)
    }

    /// Statistics over the finite values of a column, `None` if it has none.
    pub fn column_stats(&self, name: &str) -> Result<Option<ColumnStats>, TableError> {
        let finite: Vec<f64> = self
            .column_values(name)?
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .collect();

        if finite.is_empty() {
            return Ok(None);
        }

        let count = finite.len();
        let mean = finite.iter().sum::<f64>() / count as f64;
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Some(ColumnStats {
            count,
            mean,
            min,
            max,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rows() -> Vec<TickerRatios> {
        vec![
            TickerRatios {
                ticker: "AMZN".to_string(),
                roa: Some(0.2),
                roa_adj: Some(0.125),
                analyst_count: Some(40),
                ..Default::default()
            },
            TickerRatios {
                ticker: "MSFT".to_string(),
                roa: None,
                roa_adj: Some(f64::INFINITY),
                ..Default::default()
            },
            TickerRatios {
                ticker: "AAPL".to_string(),
                roa: Some(0.4),
                roa_adj: Some(0.375),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_from_rows_shape() {
        let table = RatioTable::from_rows(&rows()).unwrap();
        assert_eq!(table.height(), 3);
        assert_eq!(
            table.dataframe().width(),
            TickerRatios::COLUMNS.len()
        );
        assert!(!table.is_empty());
    }

    #[test]
    fn test_empty_table() {
        let table = RatioTable::from_rows(&[]).unwrap();
        assert!(table.is_empty());
        assert!(table.tickers().unwrap().is_empty());
    }

    #[test]
    fn test_tickers_and_values() {
        let table = RatioTable::from_rows(&rows()).unwrap();
        assert_eq!(table.tickers().unwrap(), vec!["AMZN", "MSFT", "AAPL"]);
        assert_eq!(
            table.column_values("roa").unwrap(),
            vec![Some(0.2), None, Some(0.4)]
        );
        assert_eq!(
            table.column_values("analyst_count").unwrap(),
            vec![Some(40.0), None, None]
        );
    }

    #[test]
    fn test_unknown_column() {
        let table = RatioTable::from_rows(&rows()).unwrap();
        assert!(matches!(
            table.column_values("ROA"),
            Err(TableError::UnknownColumn(_))
        ));
        assert!(matches!(
            table.select(&["roa", "nope"]),
            Err(TableError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_select() {
        let table = RatioTable::from_rows(&rows()).unwrap();
        let df = table.select(&["roa", "beta"]).unwrap();
        assert_eq!(df.width(), 3);
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn test_column_stats_skip_nulls_and_non_finite() {
        let table = RatioTable::from_rows(&rows()).unwrap();

        let stats = table.column_stats("roa_adj").unwrap().unwrap();
        assert_eq!(stats.count, 2);
        assert_relative_eq!(stats.mean, 0.25);
        assert_eq!(stats.min, 0.125);
        assert_eq!(stats.max, 0.375);

        assert!(table.column_stats("beta").unwrap().is_none());
    }
}
