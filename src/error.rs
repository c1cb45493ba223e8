//! Error types for recym-cache
//!
//! All modules use `RecymResult<T>` as their return type. Network failures
//! during request handling are a separate [`crate::fetch::FetchError`] since
//! strategies recover from them locally instead of propagating.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for recym-cache operations
pub type RecymResult<T> = Result<T, RecymError>;

/// All errors that can occur in recym-cache
#[derive(Error, Debug)]
pub enum RecymError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown configuration key: {0}")]
    ConfigKey(String),

    #[error("Invalid cache version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    // Storage errors
    #[error("Cache partition not found: {0}")]
    PartitionNotFound(String),

    #[error("Invalid cache partition name: {0}")]
    PartitionName(String),

    #[error("Cache storage error in {partition}: {reason}")]
    Storage { partition: String, reason: String },

    // Request errors
    #[error("Invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported request method: {0}")]
    InvalidMethod(String),

    // Host errors
    #[error("Client host error: {0}")]
    Host(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl RecymError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a storage error for a partition
    pub fn storage(partition: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Storage {
            partition: partition.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Io { .. } | Self::Host(_))
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigInvalid { .. } => Some("Run: recym-cache config init --force"),
            Self::ConfigKey(_) => Some("Run: recym-cache config show to list keys"),
            Self::InvalidVersion { .. } => Some("Use a semantic version such as 1.0.0"),
            Self::PartitionNotFound(_) => Some("Run: recym-cache install"),
            Self::InvalidUrl { .. } => Some("Use an absolute URL or a path starting with '/'"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RecymError::PartitionNotFound("recym-static-v1.0.0".to_string());
        assert!(err.to_string().contains("recym-static-v1.0.0"));
    }

    #[test]
    fn error_hint() {
        let err = RecymError::PartitionNotFound("x".to_string());
        assert_eq!(err.hint(), Some("Run: recym-cache install"));
        assert!(RecymError::Internal("x".to_string()).hint().is_none());
    }

    #[test]
    fn error_retryable() {
        assert!(RecymError::storage("p", "disk full").is_retryable());
        assert!(!RecymError::ConfigKey("x".to_string()).is_retryable());
    }
}
