#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chart;
pub mod export;
pub mod report;
pub mod table;

pub use chart::{Chart, ChartError, ChartKind, ChartPoint, ChartSpec};
pub use export::{ExportError, ExportFormat, Exporter};
pub use report::{
    ReportError, RunReport, TickerFailure, format_money, format_ratio, rows_table,
};
pub use table::{ColumnStats, RatioTable, TableError};
