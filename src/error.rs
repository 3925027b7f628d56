//! Typed error taxonomy for the analysis engine.

use thiserror::Error;

/// Errors produced by the analysis engine.
#[derive(Error, Debug)]
pub enum Error {
    /// A requested path does not exist or lies outside the indexed root.
    #[error("file not found in index: {path}")]
    NotFound { path: String },

    /// A file's content could not be parsed into a tree.
    ///
    /// Non-fatal: callers skip the file and surface a diagnostic.
    #[error("failed to parse {path}: {message}")]
    ParseFailure { path: String, message: String },

    /// An operation was attempted on a disposed analysis context.
    #[error("analysis context already disposed: {operation}")]
    IllegalState { operation: String },

    /// Invalid construction options.
    #[error("invalid configuration: {message}")]
    ConfigError { message: String },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn not_found(path: impl Into<String>) -> Self {
        Error::NotFound { path: path.into() }
    }

    pub fn parse_failure(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ParseFailure {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn illegal_state(operation: impl Into<String>) -> Self {
        Error::IllegalState {
            operation: operation.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::ConfigError {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A non-fatal problem encountered during a run.
///
/// Parse failures never abort a scan; they are collected as diagnostics so
/// partial signal is not discarded.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::not_found("src/missing.ts");
        assert_eq!(e.to_string(), "file not found in index: src/missing.ts");

        let e = Error::illegal_state("content");
        assert!(e.to_string().contains("disposed"));
    }

    #[test]
    fn test_config_error() {
        let e = Error::config("ast cache budget must be positive");
        assert!(e.to_string().contains("budget"));
    }
}
