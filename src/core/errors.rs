//! I3C-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, I3cError>;

/// Top-level error type for i3ctl.
#[derive(Debug, Error)]
pub enum I3cError {
    #[error("[I3C-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[I3C-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[I3C-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[I3C-2001] no {category} tool found (install one of: {hint})")]
    ToolMissing {
        category: &'static str,
        hint: &'static str,
    },

    #[error("[I3C-2002] {tool} failed: {details}")]
    BackendFailed { tool: String, details: String },

    #[error("[I3C-2003] could not parse {tool} output: {details}")]
    OutputParse {
        tool: &'static str,
        details: String,
    },

    #[error("[I3C-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[I3C-3001] {kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("[I3C-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[I3C-3101] i3 is not available (is i3-msg on PATH and i3 running?)")]
    I3Unavailable,

    #[error("[I3C-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl I3cError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "I3C-1001",
            Self::MissingConfig { .. } => "I3C-1002",
            Self::ConfigParse { .. } => "I3C-1003",
            Self::ToolMissing { .. } => "I3C-2001",
            Self::BackendFailed { .. } => "I3C-2002",
            Self::OutputParse { .. } => "I3C-2003",
            Self::Serialization { .. } => "I3C-2101",
            Self::NotFound { .. } => "I3C-3001",
            Self::Io { .. } => "I3C-3002",
            Self::I3Unavailable => "I3C-3101",
            Self::Runtime { .. } => "I3C-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::BackendFailed { .. } | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for a failed backend invocation.
    #[must_use]
    pub fn backend(tool: impl Into<String>, details: impl Into<String>) -> Self {
        Self::BackendFailed {
            tool: tool.into(),
            details: details.into(),
        }
    }
}

impl From<serde_json::Error> for I3cError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}
