//! Markdown documentation rendered from documented ABIs

use crate::artifacts::{writer::empty_dir, writer::write_text, Abi, AbiType, AbiUnit};
use crate::config::ToolConfig;
use crate::error::ToolError;
use crate::utils::{read_json, require_dir};
use eyre::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tera::Tera;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Template used when no templates directory is given
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/contract.md.tera");

/// Options for the `build-docs` task
#[derive(Debug, Clone)]
pub struct BuildDocsOptions {
    /// Directory of `{abi, title}` JSON artifacts
    pub input_dir: PathBuf,
    /// Directory receiving one `<Name>.md` per artifact; emptied first
    pub output_dir: PathBuf,
    /// Directory holding a replacement template
    pub templates_dir: Option<PathBuf>,
    pub config: ToolConfig,
}

/// An ABI entry as exposed to templates
#[derive(Debug, Clone, Serialize)]
pub struct DocEntry {
    #[serde(flatten)]
    pub unit: AbiUnit,
    pub signature: String,
    pub selector: Option<String>,
}

impl From<&AbiUnit> for DocEntry {
    fn from(unit: &AbiUnit) -> Self {
        Self { unit: unit.clone(), signature: unit.signature(), selector: unit.selector() }
    }
}

/// Template context for one contract page
#[derive(Debug, Clone, Serialize)]
pub struct ContractDoc {
    pub contract_name: String,
    pub description: Option<String>,
    pub constructor: Option<DocEntry>,
    pub functions: Vec<DocEntry>,
    pub events: Vec<DocEntry>,
    pub errors: Vec<DocEntry>,
}

impl ContractDoc {
    /// Partitions an ABI into the sections of a contract page
    pub fn new(contract_name: impl Into<String>, description: Option<String>, abi: &[AbiUnit]) -> Self {
        let of_kind = |kind: AbiType| -> Vec<DocEntry> {
            abi.iter().filter(|unit| unit.kind == kind).map(DocEntry::from).collect()
        };

        Self {
            contract_name: contract_name.into(),
            description,
            constructor: abi.iter().find(|unit| unit.kind == AbiType::Constructor).map(DocEntry::from),
            functions: of_kind(AbiType::Function),
            events: of_kind(AbiType::Event),
            errors: of_kind(AbiType::Error),
        }
    }
}

/// Renders contract pages from a single template
pub struct DocsRenderer {
    tera: Tera,
    template_name: String,
}

impl DocsRenderer {
    /// Renderer using the built-in template
    pub fn new() -> Result<Self> {
        Self::from_template_str(crate::config::DEFAULT_DOCS_TEMPLATE, DEFAULT_TEMPLATE)
    }

    /// Renderer using `<dir>/<template_name>`
    pub fn from_dir(dir: &Path, template_name: &str) -> Result<Self> {
        let path = dir.join(template_name);
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read template: {}", path.display()))?;
        Self::from_template_str(template_name, &source)
    }

    pub fn from_template_str(template_name: &str, source: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(template_name, source)
            .with_context(|| format!("Failed to parse template {template_name}"))?;
        Ok(Self { tera, template_name: template_name.to_string() })
    }

    pub fn render(&self, doc: &ContractDoc) -> Result<String> {
        let context = tera::Context::from_serialize(doc)?;
        self.tera
            .render(&self.template_name, &context)
            .with_context(|| format!("Failed to render docs for {}", doc.contract_name))
    }
}

/// Reads a docs artifact; `None` when the file has no `abi` array
fn load_contract_doc(path: &Path, contract_name: &str) -> Result<Option<ContractDoc>> {
    let mut artifact: Value = read_json(path)?;

    let abi = match artifact.get_mut("abi").map(Value::take) {
        Some(abi @ Value::Array(_)) => abi,
        _ => return Ok(None),
    };
    let abi: Abi = serde_json::from_value(abi)
        .map_err(|source| ToolError::InvalidJson { path: path.to_path_buf(), source })?;
    let title = artifact.get("title").and_then(Value::as_str).map(str::to_string);

    Ok(Some(ContractDoc::new(contract_name, title, &abi)))
}

/// Renders one Markdown page per JSON artifact in the input directory
pub fn build_docs(options: &BuildDocsOptions) -> Result<Vec<PathBuf>> {
    require_dir(&options.input_dir)?;

    let renderer = match &options.templates_dir {
        Some(dir) => DocsRenderer::from_dir(dir, &options.config.docs_template)?,
        None => DocsRenderer::new()?,
    };

    empty_dir(&options.output_dir)?;

    let mut written = Vec::new();
    for entry in WalkDir::new(&options.input_dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy();

        let Some(contract_name) = file_name.strip_suffix(".json") else {
            debug!("Skipping {}", entry.path().display());
            continue;
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(doc) = load_contract_doc(entry.path(), contract_name)? else {
            debug!("Skipping {}: no abi array", entry.path().display());
            continue;
        };

        let path = options.output_dir.join(format!("{contract_name}.md"));
        write_text(&path, &renderer.render(&doc)?)?;
        written.push(path);
    }

    info!("Rendered {} documents in {}", written.len(), options.output_dir.display());
    Ok(written)
}
