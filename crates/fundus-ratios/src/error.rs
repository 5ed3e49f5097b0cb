//! Error types for ratio derivation.

use thiserror::Error;

/// Result type for ratio operations.
pub type Result<T> = std::result::Result<T, RatioError>;

/// Errors that can occur while deriving ratios.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatioError {
    /// A statement field with no default was absent from the record.
    #[error("Missing required field: {field}")]
    MissingRequiredField {
        /// Name of the absent field
        field: &'static str,
    },

    /// Unrecognised EBIT/price convention name.
    #[error("Unknown EBIT/price convention: {0} (expected `market-cap` or `enterprise-value`)")]
    UnknownConvention(String),
}
