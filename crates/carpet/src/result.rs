//! Result and error types for Carpet.

use thiserror::Error;

/// Result type for Carpet operations
pub type CarpetResult<T> = Result<T, CarpetError>;

/// Errors that can occur while annotating coverage
#[derive(Debug, Error)]
pub enum CarpetError {
    /// None of the requested functions exist in the file
    #[error("No requested function found: {}", requested.join(", "))]
    FunctionNotFound {
        /// Function names that were requested
        requested: Vec<String>,
    },

    /// Block with an empty or inverted byte range
    #[error("Invalid block [{begin}, {end}): begin must precede end")]
    InvalidBlock {
        /// Block begin offset
        begin: usize,
        /// Block end offset
        end: usize,
    },

    /// Text range does not fit inside the source
    #[error("Range [{begin}, {end}) is outside of source with {len} bytes")]
    RangeOutOfBounds {
        /// Range begin offset
        begin: usize,
        /// Range end offset
        end: usize,
        /// Source length in bytes
        len: usize,
    },

    /// Line/column position past the end of the source
    #[error("Position {line}.{col} is outside of source")]
    PositionOutOfBounds {
        /// 1-based line
        line: usize,
        /// 1-based byte column
        col: usize,
    },

    /// Malformed cover profile
    #[error("Profile parse error at line {line}: {message}")]
    ProfileParse {
        /// 1-based line number in the profile
        line: usize,
        /// Error message
        message: String,
    },

    /// Configuration rejected by validation
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Record pattern failed to compile
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl CarpetError {
    /// Create a profile parse error
    #[must_use]
    pub fn profile_parse(line: usize, message: impl Into<String>) -> Self {
        Self::ProfileParse {
            line,
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error means a function filter matched nothing
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::FunctionNotFound { .. })
    }
}
