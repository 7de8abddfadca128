//! Output writing utilities

use eyre::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::Path;
use tracing::{debug, info};

/// Serializes `value` with `indent` spaces per level and a trailing newline
pub fn to_json_string<T: Serialize + ?Sized>(value: &T, indent: usize) -> Result<String> {
    let indent = " ".repeat(indent);
    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(indent.as_bytes()));
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

/// Writes `value` as indented JSON, creating parent directories as needed
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path, indent: usize) -> Result<()> {
    let json = to_json_string(value, indent)?;
    write_text(path, &json)?;
    info!("Saved {}", path.display());
    Ok(())
}

/// Writes text to `path`, creating parent directories as needed
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Creates a directory (and its parents) if it does not exist
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

/// Removes everything inside a directory, creating it if it does not exist
pub fn empty_dir(path: &Path) -> Result<()> {
    if path.exists() {
        let entries = std::fs::read_dir(path)
            .with_context(|| format!("Failed to read directory: {}", path.display()))?;

        for entry in entries {
            let entry_path = entry?.path();
            let removed = if entry_path.is_dir() {
                std::fs::remove_dir_all(&entry_path)
            } else {
                std::fs::remove_file(&entry_path)
            };
            removed.with_context(|| format!("Failed to remove {}", entry_path.display()))?;
        }
        debug!("Emptied {}", path.display());
    }

    ensure_dir(path)
}
