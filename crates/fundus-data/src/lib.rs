#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod error;
pub mod memory;
pub mod provider;
pub mod yahoo;

pub use cache::{CacheInfo, CsvCache};
pub use error::{DataError, Result};
pub use memory::InMemoryProvider;
pub use provider::StatementProvider;
pub use yahoo::YahooStatementsProvider;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
