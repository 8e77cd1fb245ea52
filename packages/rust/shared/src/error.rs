//! Error types for docexport.
//!
//! Library crates use [`DocExportError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;
use std::time::Duration;

/// Top-level error type for all docexport operations.
#[derive(Debug, thiserror::Error)]
pub enum DocExportError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// YAML/TOML parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (empty nav, bad sheet name, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// An external program could not be found or spawned.
    #[error("{tool} not found: {message}")]
    ToolNotFound { tool: String, message: String },

    /// An external program exited with a non-zero status.
    #[error("{tool} failed (exit code {}):\n{stderr}", status.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    ToolFailed {
        tool: String,
        status: Option<i32>,
        stderr: String,
    },

    /// An external program exceeded its time budget and was killed.
    #[error("{tool} timed out after {}s", timeout.as_secs())]
    Timeout { tool: String, timeout: Duration },

    /// Spreadsheet generation error.
    #[error("workbook error: {0}")]
    Workbook(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocExportError>;

impl DocExportError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
