//! Shared infrastructure: errors, paths, settings store, logging.

pub mod config;
pub mod errors;
pub mod logging;
pub mod paths;
