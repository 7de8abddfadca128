//! Combined, documented ABI of a contract and everything it inherits
//!
//! The devdoc `methods` and `events` of every filtered contract are deep
//! merged (later contracts win on conflicting leaves), applied to the main
//! contract's ABI, and the result is sorted canonically for `build-docs`.

use crate::artifacts::{
    deep_merge, metadata, writer::write_json, Abi, AbiType, AbiUnit, Devdoc, FoundryArtifact,
};
use crate::config::ToolConfig;
use crate::merge::enrich;
use crate::sort::canonical_sort;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{debug, info};

/// Options for the `merge-abi` task
#[derive(Debug, Clone)]
pub struct MergeAbiOptions {
    /// Main contract whose ABI is documented
    pub name: String,
    /// Foundry output directory
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Contracts whose devdoc is merged; must list the main contract to include its own docs
    pub filter: Vec<String>,
    /// Output file stem, defaults to `name`
    pub output_name: Option<String>,
    pub config: ToolConfig,
}

/// What `build-docs` consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedAbi {
    pub abi: Abi,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Accumulates devdoc `events` and `methods` across contracts
#[derive(Debug, Default)]
pub struct DevdocAccumulator {
    events: Map<String, Value>,
    methods: Map<String, Value>,
}

impl DevdocAccumulator {
    /// Merges the `events` and `methods` of one raw devdoc object
    pub fn add(&mut self, devdoc: &Value) {
        for (section, merged) in [("events", &mut self.events), ("methods", &mut self.methods)] {
            let Some(entries) = devdoc.get(section).and_then(Value::as_object) else {
                continue;
            };
            for (signature, doc) in entries {
                let slot = merged
                    .entry(signature.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                deep_merge(slot, doc.clone());
            }
        }
    }

    pub fn finish(self) -> Result<Devdoc> {
        let devdoc = serde_json::json!({ "events": self.events, "methods": self.methods });
        Ok(serde_json::from_value(devdoc)?)
    }
}

/// Applies a devdoc to an ABI, drops fallbacks and sorts canonically
pub fn document_abi(abi: &[AbiUnit], devdoc: &Devdoc) -> Abi {
    let mut documented: Abi = abi
        .iter()
        .filter(|unit| unit.kind != AbiType::Fallback)
        .map(|unit| enrich(unit, Some(devdoc)))
        .collect();
    canonical_sort(&mut documented);
    documented
}

/// Builds the combined ABI without writing it
pub fn combine(options: &MergeAbiOptions) -> Result<CombinedAbi> {
    let mut accumulator = DevdocAccumulator::default();
    for name in &options.filter {
        let artifact = FoundryArtifact::load(&options.input_dir, name)?;
        let devdoc = metadata::devdoc(&artifact.raw_metadata)
            .with_context(|| format!("Failed to read devdoc of {name}"))?;
        debug!("Merging devdoc of {}", name);
        accumulator.add(&devdoc);
    }
    let devdoc = accumulator.finish()?;

    let main = FoundryArtifact::load(&options.input_dir, &options.name)?;
    let title = metadata::parse(&main.raw_metadata)?
        .pointer("/output/devdoc/title")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(CombinedAbi { abi: document_abi(&main.abi, &devdoc), title })
}

/// Writes `<out>/<outName>.json` with the combined ABI and title
pub fn merge_abi(options: &MergeAbiOptions) -> Result<PathBuf> {
    let combined = combine(options)?;

    let output_name = options.output_name.as_deref().unwrap_or(&options.name);
    let path = options.output_dir.join(format!("{output_name}.json"));
    write_json(&combined, &path, options.config.json_indent)?;

    info!("Merged {} ABI entries into {}", combined.abi.len(), path.display());
    Ok(path)
}
