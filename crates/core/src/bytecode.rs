//! Bytecode normalization and fingerprinting
//!
//! Deployed library bytecode embeds the deployer address right after a
//! leading `PUSH20` (`73`) and may end in a swarm metadata trailer. Both are
//! environment specific, so they are removed before hashing. Unlinked
//! library references appear as 40-character `__$...$__` placeholders.

use crate::artifacts::{metadata, writer::write_json, CompilerOutput, ContractArtifact};
use crate::config::ToolConfig;
use crate::error::ToolError;
use crate::utils::{hash_bytes, name_allowed, path_ignored};
use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// `PUSH20` opcode that precedes an embedded address
pub const ADDRESS_MARKER: &str = "73";
/// Hex offset of the embedded deployer address
pub const ADDRESS_OFFSET: usize = 2;
/// Hex length of an address
pub const ADDRESS_LENGTH: usize = 40;

/// Start of a library link placeholder
pub const LIBRARY_PLACEHOLDER_PREFIX: &str = "__$";
/// Hex length of a library link placeholder
pub const LIBRARY_PLACEHOLDER_LENGTH: usize = 40;

/// Hex length of the `bzzr0` metadata trailer
pub const SWARM_TRAILER_LENGTH: usize = 86;
/// CBOR prefix of the trailer up to the swarm hash
pub const SWARM_TRAILER_PREFIX: &str = "a165627a7a72305820";
/// CBOR length suffix of the trailer
pub const SWARM_TRAILER_SUFFIX: &str = "0029";
/// Hex length of the swarm hash inside the trailer
pub const SWARM_HASH_LENGTH: usize = 64;

/// Options for the `build-metadata` task
#[derive(Debug, Clone)]
pub struct BuildMetadataOptions {
    /// Standard-JSON compiler output file
    pub input: PathBuf,
    /// JSON file receiving the sorted fingerprint list
    pub output: PathBuf,
    /// Contract names to fingerprint; empty fingerprints every contract
    pub filter: Vec<String>,
    /// Also emit the raw deployed bytecode
    pub include_raw_bytecode: bool,
    pub config: ToolConfig,
}

/// Size and content hashes of one contract's deployed bytecode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractFingerprint {
    pub contract_name: String,
    /// Deployed size in bytes, measured before normalization
    pub contract_size: usize,
    pub source_hash: String,
    pub bytecode_hash_with_lib_refs: String,
    pub bytecode_hash_without_lib_refs: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_bytecode: Option<String>,
}

/// Removes `length` characters at `index`, clamped to the end of `code`.
/// `code` must be ASCII.
fn splice_out(code: &str, index: usize, length: usize) -> String {
    let start = index.min(code.len());
    let end = index.saturating_add(length).min(code.len());
    format!("{}{}", &code[..start], &code[end..])
}

/// Removes the deployer address from `PUSH20`-prefixed bytecode
pub fn strip_deployer_address(code: &str) -> String {
    if code.starts_with(ADDRESS_MARKER) {
        splice_out(code, ADDRESS_OFFSET, ADDRESS_LENGTH)
    } else {
        code.to_string()
    }
}

/// Removes the swarm hash from a trailing `bzzr0` metadata section, if present
pub fn strip_swarm_hash(code: &str) -> String {
    let Some(trailer_start) = code.len().checked_sub(SWARM_TRAILER_LENGTH) else {
        return code.to_string();
    };
    let trailer = &code[trailer_start..];

    if trailer.starts_with(SWARM_TRAILER_PREFIX) && trailer.ends_with(SWARM_TRAILER_SUFFIX) {
        splice_out(code, trailer_start + SWARM_TRAILER_PREFIX.len(), SWARM_HASH_LENGTH)
    } else {
        code.to_string()
    }
}

/// Strips the deployer address and the metadata hash
pub fn normalize_deployed_bytecode(contract: &str, code: &str) -> Result<String> {
    if !code.is_ascii() {
        return Err(ToolError::InvalidBytecode {
            contract: contract.to_string(),
            reason: "bytecode is not hex text".to_string(),
        }
        .into());
    }
    Ok(strip_swarm_hash(&strip_deployer_address(code)))
}

/// Removes every library placeholder in a single pass.
///
/// A placeholder that only appears once its neighbours are removed is
/// removed as well, so the result never contains the placeholder prefix.
pub fn strip_lib_refs(code: &str) -> String {
    let mut stripped = String::with_capacity(code.len());
    let mut chars = code.chars();

    while let Some(c) = chars.next() {
        stripped.push(c);
        if stripped.ends_with(LIBRARY_PLACEHOLDER_PREFIX) {
            stripped.truncate(stripped.len() - LIBRARY_PLACEHOLDER_PREFIX.len());
            let remaining = LIBRARY_PLACEHOLDER_LENGTH - LIBRARY_PLACEHOLDER_PREFIX.len();
            chars.nth(remaining - 1);
        }
    }

    stripped
}

/// `0x`-prefixed SHA-256 of the text's UTF-8 bytes
pub fn hash_text(text: &str) -> String {
    format!("0x{}", hash_bytes(text.as_bytes()))
}

/// Fingerprints one contract declared in `source_path`
pub fn fingerprint(
    source_path: &str,
    contract_name: &str,
    artifact: &ContractArtifact,
    include_raw_bytecode: bool,
) -> Result<ContractFingerprint> {
    let context = format!("{source_path}:{contract_name}");

    let metadata = artifact
        .metadata
        .as_deref()
        .ok_or_else(|| ToolError::missing_field(&context, "metadata"))?;
    let source_hash = metadata::source_hash(metadata, source_path)?;

    let object = artifact
        .evm
        .as_ref()
        .and_then(|evm| evm.deployed_bytecode.as_ref())
        .map(|bytecode| bytecode.object.as_str())
        .ok_or_else(|| ToolError::missing_field(&context, "evm.deployedBytecode.object"))?;
    let raw_bytecode = object.strip_prefix("0x").unwrap_or(object);

    let normalized = normalize_deployed_bytecode(contract_name, raw_bytecode)?;

    Ok(ContractFingerprint {
        contract_name: contract_name.to_string(),
        contract_size: raw_bytecode.len() / 2,
        source_hash,
        bytecode_hash_with_lib_refs: hash_text(&normalized),
        bytecode_hash_without_lib_refs: hash_text(&strip_lib_refs(&normalized)),
        raw_bytecode: include_raw_bytecode.then(|| raw_bytecode.to_string()),
    })
}

/// Fingerprints every non-ignored contract, sorted by name
pub fn collect_fingerprints(
    output: &CompilerOutput,
    ignore_paths: &[String],
    filter: &[String],
    include_raw_bytecode: bool,
) -> Result<Vec<ContractFingerprint>> {
    let mut fingerprints = Vec::new();

    for (path, contracts) in &output.contracts {
        if path_ignored(path, ignore_paths) {
            debug!("Ignoring {}", path);
            continue;
        }

        for (name, artifact) in contracts.iter().filter(|(name, _)| name_allowed(name, filter)) {
            fingerprints.push(fingerprint(path, name, artifact, include_raw_bytecode)?);
        }
    }

    fingerprints.sort_by(|a, b| a.contract_name.cmp(&b.contract_name));
    Ok(fingerprints)
}

/// Writes the fingerprint list of a compiler output
pub fn build_metadata(options: &BuildMetadataOptions) -> Result<Vec<ContractFingerprint>> {
    let output = CompilerOutput::from_file(&options.input)?;
    let fingerprints = collect_fingerprints(
        &output,
        &options.config.ignore_paths,
        &options.filter,
        options.include_raw_bytecode,
    )?;

    write_json(&fingerprints, &options.output, options.config.json_indent)?;
    info!("Fingerprinted {} contracts", fingerprints.len());

    Ok(fingerprints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{Bytecode, Evm};
    use serde_json::json;

    fn placeholder() -> String {
        format!("__${}$__", "ab".repeat(17))
    }

    fn artifact(bytecode: &str) -> ContractArtifact {
        ContractArtifact {
            metadata: Some(
                json!({ "sources": { "contracts/Math.sol": { "keccak256": "0xfeed" } } })
                    .to_string(),
            ),
            evm: Some(Evm {
                deployed_bytecode: Some(Bytecode {
                    object: bytecode.to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_placeholder_has_expected_length() {
        assert_eq!(placeholder().len(), LIBRARY_PLACEHOLDER_LENGTH);
    }

    #[test]
    fn test_strip_deployer_address() {
        let code = format!("73{}6080", "aa".repeat(20));
        assert_eq!(strip_deployer_address(&code), "736080");
        assert_eq!(strip_deployer_address("6080"), "6080");
        assert_eq!(strip_deployer_address("73aa"), "73");
    }

    #[test]
    fn test_strip_swarm_hash() {
        let hash = "11".repeat(32);
        let code = format!("6080{SWARM_TRAILER_PREFIX}{hash}{SWARM_TRAILER_SUFFIX}");
        assert_eq!(strip_swarm_hash(&code), format!("6080{SWARM_TRAILER_PREFIX}{SWARM_TRAILER_SUFFIX}"));

        let unrelated = "60".repeat(60);
        assert_eq!(strip_swarm_hash(&unrelated), unrelated);
        assert_eq!(strip_swarm_hash("6080"), "6080");
    }

    #[test]
    fn test_strip_lib_refs() {
        let code = format!("6080{}6040{}00", placeholder(), placeholder());
        assert_eq!(strip_lib_refs(&code), "6080604000");
    }

    #[test]
    fn test_strip_lib_refs_is_idempotent() {
        let seam = format!("_{}_${}", placeholder(), "cd".repeat(20));
        for code in [format!("6080{}", placeholder()), seam, "6080".to_string(), "__$".to_string()] {
            let once = strip_lib_refs(&code);
            assert_eq!(strip_lib_refs(&once), once);
            assert!(!once.contains(LIBRARY_PLACEHOLDER_PREFIX));
        }
    }

    #[test]
    fn test_hash_text_is_deterministic() {
        assert_eq!(hash_text("6080"), hash_text("6080"));
        assert!(hash_text("6080").starts_with("0x"));
        assert_eq!(hash_text("6080").len(), 66);
    }

    #[test]
    fn test_fingerprint_measures_unstripped_size() {
        let body = "6080604052";
        let code = format!("73{}{}", "aa".repeat(20), body);
        let fingerprint = fingerprint("contracts/Math.sol", "Math", &artifact(&code), false).unwrap();

        assert_eq!(fingerprint.contract_size, code.len() / 2);
        assert_eq!(fingerprint.source_hash, "0xfeed");
        assert_eq!(fingerprint.bytecode_hash_with_lib_refs, hash_text(&format!("73{body}")));
        assert_eq!(fingerprint.bytecode_hash_with_lib_refs, fingerprint.bytecode_hash_without_lib_refs);
        assert!(fingerprint.raw_bytecode.is_none());
    }

    #[test]
    fn test_fingerprint_without_lib_refs_differs_when_linked() {
        let code = format!("6080{}00", placeholder());
        let fingerprint = fingerprint("contracts/Math.sol", "Math", &artifact(&code), true).unwrap();

        assert_ne!(fingerprint.bytecode_hash_with_lib_refs, fingerprint.bytecode_hash_without_lib_refs);
        assert_eq!(fingerprint.bytecode_hash_without_lib_refs, hash_text("608000"));
        assert_eq!(fingerprint.raw_bytecode.as_deref(), Some(code.as_str()));
    }

    #[test]
    fn test_fingerprint_requires_source_hash() {
        let err = fingerprint("contracts/Other.sol", "Math", &artifact("6080"), false).unwrap_err();
        assert!(matches!(err.downcast_ref::<ToolError>(), Some(ToolError::MissingField { .. })));
    }

    #[test]
    fn test_fingerprint_requires_bytecode() {
        let mut math = artifact("6080");
        math.evm = None;
        assert!(fingerprint("contracts/Math.sol", "Math", &math, false).is_err());
    }

    #[test]
    fn test_collect_fingerprints_sorted_and_filtered() {
        let mut output = CompilerOutput::default();
        for name in ["Zeta", "Alpha", "Math"] {
            output
                .contracts
                .entry("contracts/Math.sol".to_string())
                .or_default()
                .insert(name.to_string(), artifact("6080"));
        }
        output
            .contracts
            .entry("contracts/test/Math.t.sol".to_string())
            .or_default()
            .insert("MathTest".to_string(), ContractArtifact::default());

        let ignore = ToolConfig::default().ignore_paths;
        let all = collect_fingerprints(&output, &ignore, &[], false).unwrap();
        let names: Vec<_> = all.iter().map(|f| f.contract_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Math", "Zeta"]);

        let filtered = collect_fingerprints(&output, &ignore, &["Math".to_string()], false).unwrap();
        assert_eq!(filtered.len(), 1);
    }
}
