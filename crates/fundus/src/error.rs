//! Error types for the fetch pipeline.

use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Per-ticker failures never surface here; they are collected as
/// `TickerFailure` entries instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Cache or provider setup error.
    #[error("Data error: {0}")]
    Data(#[from] fundus_data::DataError),

    /// Ticker file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No tickers to process.
    #[error("Ticker list is empty")]
    EmptyTickerList,
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
