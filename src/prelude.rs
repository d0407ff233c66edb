//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use i3ctl::prelude::*;
//! ```

// Core
pub use crate::core::config::ConfigStore;
pub use crate::core::errors::{I3cError, Result};

// Execution
pub use crate::exec::detect::{Category, ToolDetector};
pub use crate::exec::runner::{ExecResult, RunOptions, Runner, SystemRunner};

// CLI
pub use crate::cli::{Cli, CliError};
pub use crate::commands::App;
