//! Configuration shared by all build tasks

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source paths skipped when grouping or fingerprinting contracts
pub const DEFAULT_IGNORE_PATHS: [&str; 4] = ["/test/", "/external-interfaces/", "lib/", "module/"];

/// File name of the contract documentation template
pub const DEFAULT_DOCS_TEMPLATE: &str = "contract.md.tera";

/// Main configuration for the build tasks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolConfig {
    /// Substrings of source paths that exclude a contract from processing
    pub ignore_paths: Vec<String>,

    /// Number of spaces used to indent JSON output files
    pub json_indent: usize,

    /// Template file looked up inside a `--templates` directory
    pub docs_template: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ignore_paths: DEFAULT_IGNORE_PATHS.iter().map(|p| p.to_string()).collect(),
            json_indent: 4,
            docs_template: DEFAULT_DOCS_TEMPLATE.to_string(),
        }
    }
}

impl ToolConfig {
    /// Loads a configuration from a TOML file; absent keys keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parses a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ToolConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Appends extra ignore patterns, skipping ones already present
    pub fn with_extra_ignore_paths(mut self, extra: impl IntoIterator<Item = String>) -> Self {
        for pattern in extra {
            if !self.ignore_paths.contains(&pattern) {
                self.ignore_paths.push(pattern);
            }
        }
        self
    }

    /// Validates the entire configuration
    pub fn validate(&self) -> Result<()> {
        if self.docs_template.trim().is_empty() {
            return Err(eyre::eyre!("docs_template must not be empty"));
        }

        if self.ignore_paths.iter().any(|p| p.is_empty()) {
            return Err(eyre::eyre!(
                "ignore_paths must not contain an empty pattern (it would ignore every path)"
            ));
        }

        Ok(())
    }

    /// Create a new builder for ToolConfig
    pub fn builder() -> ToolConfigBuilder {
        ToolConfigBuilder::default()
    }
}

/// Builder for `ToolConfig`
#[derive(Default)]
pub struct ToolConfigBuilder {
    config: ToolConfig,
}

impl ToolConfigBuilder {
    /// Replace the ignore patterns
    pub fn ignore_paths(mut self, patterns: Vec<String>) -> Self {
        self.config.ignore_paths = patterns;
        self
    }

    /// Add a single ignore pattern
    pub fn ignore_path(mut self, pattern: impl Into<String>) -> Self {
        self.config.ignore_paths.push(pattern.into());
        self
    }

    /// Set JSON indentation width
    pub fn json_indent(mut self, indent: usize) -> Self {
        self.config.json_indent = indent;
        self
    }

    /// Set the template file name used with a templates directory
    pub fn docs_template(mut self, name: impl Into<String>) -> Self {
        self.config.docs_template = name.into();
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ToolConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
