//! Standard-JSON compiler inputs, one per source file

use crate::artifacts::writer::{ensure_dir, write_json};
use crate::config::ToolConfig;
use crate::error::ToolError;
use crate::utils::{read_json, require_dir};
use eyre::{Context, Result};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// Options for the `build-standard-json` task
#[derive(Debug, Clone)]
pub struct BuildStandardJsonOptions {
    /// Directory of Solidity source files
    pub input_dir: PathBuf,
    /// Directory receiving one `<name>.json` per source file
    pub output_dir: PathBuf,
    /// Base Standard-JSON input (language, settings, ...)
    pub base_config: PathBuf,
    pub config: ToolConfig,
}

/// Loads the base input, which must be a JSON object
pub fn load_base_input(path: &Path) -> Result<Value> {
    let base: Value = read_json(path)?;
    if !base.is_object() {
        return Err(ToolError::UnexpectedShape {
            context: path.display().to_string(),
            expected: "a JSON object".to_string(),
        }
        .into());
    }
    Ok(base)
}

/// Copy of `base` whose `sources` hold only the given file
pub fn standard_json_input(base: &Value, file_name: &str, content: &str) -> Value {
    let mut input = base.clone();
    input["sources"] = json!({ file_name: { "content": content } });
    input
}

/// Output name for a source file: everything before the first `.`
pub fn output_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Writes a Standard-JSON input for every file in the input directory
pub fn build_standard_json(options: &BuildStandardJsonOptions) -> Result<Vec<PathBuf>> {
    let base = load_base_input(&options.base_config)?;
    require_dir(&options.input_dir)?;
    ensure_dir(&options.output_dir)?;

    let mut written = Vec::new();
    for entry in WalkDir::new(&options.input_dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        let content = std::fs::read_to_string(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;

        let path = options.output_dir.join(format!("{}.json", output_name(&file_name)));
        write_json(
            &standard_json_input(&base, &file_name, &content),
            &path,
            options.config.json_indent,
        )?;
        written.push(path);
    }

    info!("Built {} Standard-JSON inputs", written.len());
    Ok(written)
}
