#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod pipeline;
pub mod universe;

// Re-export main types from sub-crates
pub use fundus_data as data;
pub use fundus_output as output;
pub use fundus_ratios as ratios;

pub use error::{PipelineError, Result};
pub use pipeline::{
    CACHE_SOURCE, CachePolicy, Collection, FetchConfig, collect_ratios, load_or_collect,
};
pub use universe::{DEFAULT_TICKERS, TickerList};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
