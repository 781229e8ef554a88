//! Error types for tablesync.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error for the command-line front end
//!   - [`ColumnError`] - Invalid column ids or column sets
//!   - [`crate::config::ConfigError`] - Config file read/parse failures
//!   - [`crate::config::SchemaError`] - Column schema file failures
//!   - [`crate::logging::LoggingError`] - Tracing initialization failures
//! - [`FetchError`] - Failure reported by a caller-supplied table query
//!
//! # Recovery Strategy
//!
//! Malformed URL state is **never** an error: every URL codec falls back to the
//! field default and logs at debug level. Fetch failures are recorded on the
//! fetch state and the previous page keeps being displayed. Only the outer
//! shell (config, schema, logging) produces fatal errors.

use thiserror::Error;

use crate::config::{ConfigError, SchemaError};
use crate::logging::LoggingError;
use crate::model::column::ColumnId;

/// Top-level error for the `tablesync` binary.
///
/// All domain errors convert via `From`, so `main` can use `?` throughout.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The column schema file is invalid.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Column definitions are inconsistent.
    #[error("Column error: {0}")]
    Column(#[from] ColumnError),

    /// Tracing could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// A command-line argument could not be interpreted.
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The raw argument text.
        arg: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Rendering the view state as JSON failed.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors building column ids and column sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    /// Column ids must not be empty.
    #[error("Column id cannot be empty")]
    EmptyId,

    /// Two columns share an id.
    #[error("Duplicate column id '{0}'")]
    DuplicateId(ColumnId),

    /// A filterable column id collides with a view-state query parameter.
    #[error("Column id '{0}' is reserved for a query parameter and cannot be filterable")]
    ReservedId(ColumnId),
}

/// Failure reported by a [`crate::state::TableQuery`] implementation.
///
/// Carries only a message: retry and presentation policy belong to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Fetch failed: {message}")]
pub struct FetchError {
    /// Human-readable failure description.
    pub message: String,
}

impl FetchError {
    /// Build a fetch error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn column_error_empty_display() {
        assert_eq!(ColumnError::EmptyId.to_string(), "Column id cannot be empty");
    }

    #[test]
    fn column_error_duplicate_mentions_id() {
        let err = ColumnError::DuplicateId(ColumnId::new("status").unwrap());
        assert!(err.to_string().contains("'status'"));
    }

    #[test]
    fn fetch_error_display() {
        let err = FetchError::new("connection reset");
        assert_eq!(err.to_string(), "Fetch failed: connection reset");
    }

    #[test]
    fn app_error_from_column_error() {
        let app_err: AppError = ColumnError::EmptyId.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Column error"));
        assert!(msg.contains("cannot be empty"));
    }

    #[test]
    fn app_error_from_config_error() {
        let err = ConfigError::ParseError {
            path: PathBuf::from("/tmp/config.toml"),
            reason: "expected `=`".to_string(),
        };
        let app_err: AppError = err.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("/tmp/config.toml"));
    }

    #[test]
    fn app_error_invalid_argument_display() {
        let err = AppError::InvalidArgument {
            arg: "status".to_string(),
            reason: "expected column=value".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'status'"));
        assert!(msg.contains("expected column=value"));
    }
}
