//! Error types for dataset health operations.
//!
//! Only setup and output failures are errors. Conditions that affect a single
//! file (empty, unreadable, undecodable) are findings and end up in the report
//! instead of propagating out of a check.
//!
//! # Example
//!
//! ```rust
//! use dataset_health::errors::HealthError;
//!
//! let err = HealthError::filesystem("Dataset root does not exist", "/no/such/dir");
//! assert!(err.is_fatal());
//! assert_eq!(err.category(), "Filesystem");
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, HealthError>;

/// Main error type for dataset health operations.
#[derive(Debug, Error)]
pub enum HealthError {
    /// The dataset root is missing or is not a directory.
    #[error("Filesystem error: {message} (path: {})", .path.display())]
    Filesystem {
        message: String,
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Invalid configuration or check selection.
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        path: Option<PathBuf>,
    },

    /// I/O failures while writing reports, logs or moving files.
    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// Report serialization failures.
    #[error("Report error: {0}")]
    Report(#[from] serde_json::Error),

    /// Invalid ignore pattern.
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

impl HealthError {
    /// Create a filesystem error for the dataset root.
    pub fn filesystem(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Filesystem {
            message: message.into(),
            path: path.into(),
            source: None,
        }
    }

    /// Create a filesystem error that wraps the underlying I/O error.
    pub fn filesystem_with_source(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Filesystem {
            message: message.into(),
            path: path.into(),
            source: Some(source),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error with the config file path.
    pub fn config_with_path(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Configuration {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Create an I/O error with path context.
    pub fn io_with_path(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
            source,
        }
    }

    /// Get the associated path, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Filesystem { path, .. } => Some(path),
            Self::Configuration { path, .. } | Self::Io { path, .. } => path.as_ref(),
            Self::Report(_) | Self::Pattern(_) => None,
        }
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Filesystem { .. } => "Filesystem",
            Self::Configuration { .. } | Self::Pattern(_) => "Configuration",
            Self::Io { .. } => "I/O",
            Self::Report(_) => "Report",
        }
    }

    /// Fatal errors abort the run before any check executes.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Filesystem { .. } | Self::Configuration { .. } | Self::Pattern(_)
        )
    }
}
