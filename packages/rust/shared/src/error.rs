//! Error types for lessondex.
//!
//! Library crates use [`LessondexError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all lessondex operations.
#[derive(Debug, thiserror::Error)]
pub enum LessondexError {
    /// A lesson document could not be read.
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A lesson document is not valid text (bad UTF-8 or binary content).
    #[error("{path:?} is not valid text: {message}")]
    Encoding { path: PathBuf, message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error while writing outputs or reading config.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (schema mismatch, invalid index, serialization).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LessondexError>;

impl LessondexError {
    /// Wrap a read failure on a lesson document.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create an encoding error for the document at `path`.
    pub fn encoding(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Encoding {
            path: path.into(),
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
        let err = LessondexError::config("bad exclude pattern");
        assert_eq!(err.to_string(), "config error: bad exclude pattern");

        let err = LessondexError::validation("schema_version 99 not supported");
        assert!(err.to_string().contains("schema_version 99"));
    }

    #[test]
    fn read_error_names_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = LessondexError::read("lessons/01-intro.md", source);
        let msg = err.to_string();
        assert!(msg.contains("01-intro.md"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn encoding_error_names_path() {
        let err = LessondexError::encoding("logo.png", "contains NUL bytes");
        assert!(matches!(err, LessondexError::Encoding { .. }));
        assert!(err.to_string().contains("logo.png"));
    }
}
