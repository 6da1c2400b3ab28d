//! Error types for SiteGen.
//!
//! Library crates use [`SiteGenError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Only [`SiteGenError::MalformedInput`] escapes the synthesis core. Category
//! misses, unregistered section kinds and an empty corpus all degrade to
//! documented defaults instead of failing.

use std::path::PathBuf;

/// Top-level error type for all SiteGen operations.
#[derive(Debug, thiserror::Error)]
pub enum SiteGenError {
    /// The raw input cannot yield a feature record (blank text, empty document).
    #[error("malformed input: {message}")]
    MalformedInput { message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a page.
    #[error("network error: {0}")]
    Network(String),

    /// JSON encoding or decoding error (DSL, store snapshot, corpus, model).
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (schema mismatch, invalid model shape, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A trained scorer could not produce a distribution.
    #[error("scorer error: {0}")]
    Scorer(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SiteGenError>;

impl SiteGenError {
    /// Create a malformed-input error from any displayable message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SiteGenError::malformed("description is blank");
        assert_eq!(err.to_string(), "malformed input: description is blank");

        let err = SiteGenError::validation("schema_version 99 not supported");
        assert!(err.to_string().contains("schema_version 99"));
    }

    #[test]
    fn json_errors_convert() {
        let bad: std::result::Result<serde_json::Value, _> = serde_json::from_str("{nope");
        let err: SiteGenError = bad.unwrap_err().into();
        assert!(err.to_string().starts_with("serialization error"));
    }
}
