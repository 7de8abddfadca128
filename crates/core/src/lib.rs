//! Build utilities for Solidity compilation pipelines
//!
//! Merges contract and interface ABIs with their developer documentation,
//! fingerprints deployed bytecode, assembles Standard-JSON inputs and renders
//! Markdown documentation from documented ABIs.
pub mod artifacts;
pub mod bytecode;
pub mod combined;
pub mod config;
pub mod docs;
pub mod error;
pub mod grouping;
pub mod merge;
pub mod sort;
pub mod standard_json;
mod utils;

pub use artifacts::{
    Abi, AbiType, AbiUnit, CompilerOutput, ContractArtifact, Devdoc, DevdocUnit, Parameter,
};
pub use bytecode::{build_metadata, BuildMetadataOptions, ContractFingerprint};
pub use combined::{merge_abi, CombinedAbi, MergeAbiOptions};
pub use config::{ToolConfig, ToolConfigBuilder};
pub use docs::{build_docs, BuildDocsOptions, ContractDoc, DocsRenderer};
pub use error::ToolError;
pub use grouping::{group_contracts, ContractGroup};
pub use merge::{build_artifacts, merge_group, BuildArtifactsOptions};
pub use sort::canonical_sort;
pub use standard_json::{build_standard_json, BuildStandardJsonOptions};
