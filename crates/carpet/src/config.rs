//! Render Configuration
//!
//! Options that shape one report: coloring mode, coverage gating, summary
//! output and the file/function filters. A config is immutable once handed
//! to a [`ReportRenderer`](crate::ReportRenderer).

use crate::result::{CarpetError, CarpetResult};
use serde::{Deserialize, Serialize};

/// How overlapping blocks decide the visible color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// The last-opened block wins; any end event resets the color
    #[default]
    LastOpened,
    /// The most nested open block wins; an end event restores the
    /// enclosing block's color
    Innermost,
}

/// Configuration for rendering a coverage report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Shade executed code by frequency instead of a single green
    pub shaded: bool,
    /// Skip files whose coverage percentage is above this value
    pub min_coverage: Option<f64>,
    /// Only print the per-file header line
    pub summary_only: bool,
    /// Render only these functions (empty = whole file)
    pub functions: Vec<String>,
    /// Render only files whose name contains one of these (empty = all)
    pub files: Vec<String>,
    /// Overlap resolution for nested blocks
    pub overlap: OverlapPolicy,
    /// Print the per-file header
    pub header: bool,
    /// Print the aggregate footer
    pub footer: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            shaded: false,
            min_coverage: None,
            summary_only: false,
            functions: Vec::new(),
            files: Vec::new(),
            overlap: OverlapPolicy::LastOpened,
            header: true,
            footer: true,
        }
    }
}

impl RenderConfig {
    /// Create a config with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder
    #[must_use]
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder::default()
    }

    /// Load configuration from JSON string
    ///
    /// # Errors
    /// Returns error if JSON parsing fails
    pub fn from_json(json: &str) -> CarpetResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JSON
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> CarpetResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from YAML string
    ///
    /// # Errors
    /// Returns error if YAML parsing fails
    pub fn from_yaml(yaml: &str) -> CarpetResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Serialize to YAML
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> CarpetResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Whether a function filter is active
    #[must_use]
    pub fn filters_functions(&self) -> bool {
        !self.functions.is_empty()
    }

    /// Whether `file_name` passes the file filter
    #[must_use]
    pub fn selects_file(&self, file_name: &str) -> bool {
        self.files.is_empty()
            || self
                .files
                .iter()
                .any(|pattern| file_name.contains(pattern.as_str()))
    }

    /// Whether a file at `percent` coverage is skipped by the threshold
    #[must_use]
    pub fn exceeds_min_coverage(&self, percent: f64) -> bool {
        self.min_coverage.is_some_and(|min| percent > min)
    }

    /// Validate configuration values
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if let Some(min) = self.min_coverage {
            if !(0.0..=100.0).contains(&min) {
                errors.push(ConfigValidationError {
                    field: "min_coverage".to_string(),
                    message: "Must be between 0 and 100".to_string(),
                });
            }
        }

        if self.functions.iter().any(|name| name.trim().is_empty()) {
            errors.push(ConfigValidationError {
                field: "functions".to_string(),
                message: "Function names must not be empty".to_string(),
            });
        }

        if self.files.iter().any(String::is_empty) {
            errors.push(ConfigValidationError {
                field: "files".to_string(),
                message: "File patterns must not be empty".to_string(),
            });
        }

        errors
    }

    /// Check if configuration is valid
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Turn validation failures into an error
    ///
    /// # Errors
    /// Returns [`CarpetError::Config`] listing every failing field
    pub fn ensure_valid(&self) -> CarpetResult<()> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(CarpetError::config(message))
    }
}

/// Builder for `RenderConfig`
#[derive(Debug, Clone, Default)]
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    /// Shade executed code by frequency
    #[must_use]
    pub fn shaded(mut self, enabled: bool) -> Self {
        self.config.shaded = enabled;
        self
    }

    /// Skip files above this coverage percentage
    #[must_use]
    pub fn min_coverage(mut self, percent: f64) -> Self {
        self.config.min_coverage = Some(percent);
        self
    }

    /// Only print per-file headers
    #[must_use]
    pub fn summary_only(mut self, enabled: bool) -> Self {
        self.config.summary_only = enabled;
        self
    }

    /// Add a function to render
    #[must_use]
    pub fn function(mut self, name: impl Into<String>) -> Self {
        self.config.functions.push(name.into());
        self
    }

    /// Add a file name pattern
    #[must_use]
    pub fn file(mut self, pattern: impl Into<String>) -> Self {
        self.config.files.push(pattern.into());
        self
    }

    /// Set the overlap policy
    #[must_use]
    pub fn overlap(mut self, policy: OverlapPolicy) -> Self {
        self.config.overlap = policy;
        self
    }

    /// Enable/disable per-file headers
    #[must_use]
    pub fn header(mut self, enabled: bool) -> Self {
        self.config.header = enabled;
        self
    }

    /// Enable/disable the aggregate footer
    #[must_use]
    pub fn footer(mut self, enabled: bool) -> Self {
        self.config.footer = enabled;
        self
    }

    /// Build the config
    #[must_use]
    pub fn build(self) -> RenderConfig {
        self.config
    }
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
