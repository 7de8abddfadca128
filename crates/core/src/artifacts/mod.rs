//! Compiler artifacts: ABI, devdoc, metadata and the files that carry them

use crate::utils::read_json;
use eyre::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub mod abi;
pub mod devdoc;
pub mod metadata;
pub mod writer;

pub use abi::{Abi, AbiType, AbiUnit, Parameter};
pub use devdoc::{deep_merge, Devdoc, DevdocUnit};

/// A single contract as emitted in Standard-JSON compiler output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractArtifact {
    #[serde(default)]
    pub abi: Abi,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devdoc: Option<Devdoc>,

    /// JSON-encoded compiler metadata, kept as a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evm: Option<Evm>,

    /// `userdoc`, `storageLayout` and other outputs passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// EVM-related compiler outputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_bytecode: Option<Bytecode>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Bytecode object as hex text, possibly containing library placeholders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bytecode {
    #[serde(default)]
    pub object: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Standard-JSON compiler output: source path -> contract name -> artifact
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompilerOutput {
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, ContractArtifact>>,
}

impl CompilerOutput {
    pub fn from_file(path: &Path) -> Result<Self> {
        read_json(path)
    }
}

/// Per-contract artifact written by foundry (`out/<Name>.sol/<Name>.json`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundryArtifact {
    pub abi: Abi,

    /// JSON-encoded compiler metadata
    pub raw_metadata: String,
}

impl FoundryArtifact {
    /// Location of a contract's artifact inside a foundry output directory
    pub fn path(out_dir: &Path, contract_name: &str) -> PathBuf {
        out_dir.join(format!("{contract_name}.sol")).join(format!("{contract_name}.json"))
    }

    pub fn load(out_dir: &Path, contract_name: &str) -> Result<Self> {
        read_json(&Self::path(out_dir, contract_name))
    }
}
