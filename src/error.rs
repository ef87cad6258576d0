//! # Audit Error Types
//!
//! Errors raised while enumerating accounts and querying login history.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level error type for audit operations
#[derive(Error, Debug)]
pub enum AuditError {
    /// The account database could not be read
    #[error("Failed to read account database {}: {source}", .path.display())]
    AccountDatabase {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type AuditResult<T> = Result<T, AuditError>;

/// Failure of a single login-history lookup
#[derive(Error, Debug)]
pub enum LookupError {
    /// The lookup command could not be started
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The lookup command did not finish in time
    #[error("Lookup timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The lookup command exited unsuccessfully
    #[error("Lookup exited with {}: {stderr}", .status.map_or("signal".to_string(), |c| format!("code {}", c)))]
    Failed { status: Option<i32>, stderr: String },

    /// The output had no record line after the header
    #[error("No login record in lookup output")]
    MissingRecord,

    /// The record line did not contain a recognizable date
    #[error("Unrecognized login date in line: {0}")]
    BadDate(String),
}

impl LookupError {
    /// Whether the lookup itself could not be performed, as opposed to
    /// returning output that could not be interpreted
    pub fn is_execution_error(&self) -> bool {
        matches!(
            self,
            LookupError::Spawn { .. } | LookupError::Timeout(_) | LookupError::Failed { .. }
        )
    }
}
