//! Shared helpers for file loading and hashing

use crate::error::ToolError;
use eyre::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Reads and deserializes a JSON file, distinguishing missing files from malformed ones
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(ToolError::MissingInput { path: path.to_path_buf() }.into());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&content)
        .map_err(|source| ToolError::InvalidJson { path: path.to_path_buf(), source }.into())
}

/// Fails with [`ToolError::MissingInput`] unless `path` is an existing directory
pub fn require_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ToolError::MissingInput { path: path.to_path_buf() }.into())
    }
}

pub fn hash_bytes(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    format!("{:x}", Sha256::digest(data))
}

/// Whether a source path contains any of the ignore patterns
pub fn path_ignored(path: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| path.contains(pattern.as_str()))
}

/// Whether `name` passes an allow-list; an empty list allows everything
pub fn name_allowed(name: &str, filter: &[String]) -> bool {
    filter.is_empty() || filter.iter().any(|allowed| allowed == name)
}
