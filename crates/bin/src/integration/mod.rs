//! Glue between the CLI and the library crates.
//!
//! Resolves the cache location, sets up logging and progress reporting, and
//! renders results in the requested output format.

pub(crate) mod cache_manager;
pub(crate) mod logging;
pub(crate) mod render;
