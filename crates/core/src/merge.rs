//! Merging of contract and interface ABIs with their developer documentation
//!
//! Precedence is fixed: contract entries come first in the union, so the
//! contract's shape of an entry survives deduplication. Documentation is then
//! applied interface first and contract second, so the contract's `details`
//! replace the interface's. Parameter descriptions are never overwritten, so
//! for parameters the first documentation found (the interface's) is kept.

use crate::artifacts::{
    metadata, writer::ensure_dir, writer::write_json, Abi, AbiUnit, CompilerOutput,
    ContractArtifact, Devdoc, DevdocUnit, Parameter,
};
use crate::config::ToolConfig;
use crate::grouping::{group_contracts, ContractGroup};
use eyre::{Context, Result};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// Options for the `build-artifacts` task
#[derive(Debug, Clone)]
pub struct BuildArtifactsOptions {
    /// Standard-JSON compiler output file
    pub input: PathBuf,
    /// Directory receiving one `<Name>.json` per contract group
    pub output_dir: PathBuf,
    /// Contract names to emit; empty emits every group
    pub filter: Vec<String>,
    pub config: ToolConfig,
}

fn has_text(text: &Option<String>) -> bool {
    text.as_deref().is_some_and(|t| !t.is_empty())
}

/// Fills in a parameter description unless it already has one
fn describe(param: &Parameter, doc: Option<&String>) -> Parameter {
    match doc.filter(|d| !d.is_empty()) {
        Some(doc) if !has_text(&param.description) => {
            Parameter { description: Some(doc.clone()), ..param.clone() }
        }
        _ => param.clone(),
    }
}

/// Builds a documented copy of an ABI entry.
///
/// Only the type, name, state mutability, parameters and description are
/// carried over. Applying the same documentation twice changes nothing.
pub fn enrich_unit(
    unit: &AbiUnit,
    doc: Option<&DevdocUnit>,
    state_variable: Option<&DevdocUnit>,
) -> AbiUnit {
    let inputs = unit.inputs.as_ref().map(|inputs| {
        inputs
            .iter()
            .map(|input| describe(input, doc.and_then(|d| d.params.get(&input.name))))
            .collect()
    });

    let outputs = unit.outputs.as_ref().map(|outputs| {
        outputs
            .iter()
            .enumerate()
            .map(|(index, output)| {
                let key =
                    if output.name.is_empty() { format!("_{index}") } else { output.name.clone() };
                describe(output, doc.and_then(|d| d.returns.get(&key)))
            })
            .collect()
    });

    let details = doc.and_then(|d| d.details.clone()).filter(|d| !d.is_empty());

    AbiUnit {
        kind: unit.kind,
        name: unit.name.clone().filter(|n| !n.is_empty()),
        state_mutability: unit.state_mutability.clone().filter(|m| !m.is_empty()),
        inputs,
        outputs,
        description: details.or_else(|| unit.description.clone()).filter(|d| !d.is_empty()),
        is_state_variable: unit.is_state_variable || state_variable.is_some(),
    }
}

/// Enriches an entry from whatever a devdoc has for it
pub fn enrich(unit: &AbiUnit, devdoc: Option<&Devdoc>) -> AbiUnit {
    match devdoc {
        Some(devdoc) => {
            enrich_unit(unit, devdoc.find_unit(unit), devdoc.find_state_variable(unit))
        }
        None => enrich_unit(unit, None, None),
    }
}

/// Keeps the first entry for each name, preserving order.
///
/// Entries without a name share the same key, so at most one survives.
pub fn dedup_by_name(units: impl IntoIterator<Item = AbiUnit>) -> Abi {
    let mut seen = HashSet::new();
    units.into_iter().filter(|unit| seen.insert(unit.name.clone())).collect()
}

/// Merges a contract group into one artifact carrying the enriched ABI.
///
/// The artifact is the contract's when it has an ABI, otherwise the
/// interface's. Its metadata string, if any, gets the same ABI.
pub fn merge_group(group: &ContractGroup) -> Result<ContractArtifact> {
    let contract_abi = group.contract.as_ref().map(|c| c.abi.as_slice()).unwrap_or_default();
    let interface_abi = group.interface.as_ref().map(|i| i.abi.as_slice()).unwrap_or_default();
    let contract_devdoc = group.contract.as_ref().and_then(|c| c.devdoc.as_ref());
    let interface_devdoc = group.interface.as_ref().and_then(|i| i.devdoc.as_ref());

    let abi: Abi = dedup_by_name(contract_abi.iter().chain(interface_abi).cloned())
        .iter()
        .map(|unit| enrich(&enrich(unit, interface_devdoc), contract_devdoc))
        .collect();

    let source = if contract_abi.is_empty() {
        debug!("{} has no contract ABI, using the interface artifact", group.name);
        group.interface.clone()
    } else {
        group.contract.clone()
    }
    .unwrap_or_default();

    let metadata = source
        .metadata
        .as_deref()
        .map(|m| metadata::replace_abi(m, &abi))
        .transpose()?;

    Ok(ContractArtifact { abi, metadata, ..source })
}

/// Writes one merged artifact per contract group
pub fn build_artifacts(options: &BuildArtifactsOptions) -> Result<Vec<PathBuf>> {
    let output = CompilerOutput::from_file(&options.input)?;
    let groups = group_contracts(&output, &options.config.ignore_paths, &options.filter);

    ensure_dir(&options.output_dir)?;

    let mut written = Vec::with_capacity(groups.len());
    for group in &groups {
        let artifact =
            merge_group(group).with_context(|| format!("Failed to merge {}", group.name))?;
        let path = options.output_dir.join(format!("{}.json", group.name));
        write_json(&artifact, &path, options.config.json_indent)?;
        written.push(path);
    }

    info!("Built {} artifacts in {}", written.len(), options.output_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::AbiType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn devdoc(value: serde_json::Value) -> Devdoc {
        serde_json::from_value(value).unwrap()
    }

    fn foo() -> AbiUnit {
        AbiUnit {
            inputs: Some(vec![Parameter::new("x", "uint256")]),
            outputs: Some(vec![Parameter::new("", "bool")]),
            ..AbiUnit::new(AbiType::Function, "foo")
        }
    }

    #[test]
    fn test_interface_param_docs_reach_contract_abi() {
        let group = ContractGroup {
            name: "Foo".to_string(),
            contract: Some(ContractArtifact { abi: vec![foo()], ..Default::default() }),
            interface: Some(ContractArtifact {
                devdoc: Some(devdoc(json!({
                    "methods": { "foo(uint256)": { "params": { "x": "the value" } } }
                }))),
                ..Default::default()
            }),
        };

        let artifact = merge_group(&group).unwrap();
        let inputs = artifact.abi[0].inputs.as_ref().unwrap();
        assert_eq!(inputs[0].description.as_deref(), Some("the value"));
    }

    #[test]
    fn test_unnamed_outputs_use_index_keys() {
        let doc = devdoc(json!({ "methods": { "foo(uint256)": { "returns": { "_0": "Success." } } } }));
        let enriched = enrich(&foo(), Some(&doc));
        assert_eq!(enriched.outputs.unwrap()[0].description.as_deref(), Some("Success."));
    }

    #[test]
    fn test_contract_details_override_interface_details() {
        let interface_doc = devdoc(json!({
            "methods": { "foo(uint256)": { "details": "Interface text.", "params": { "x": "From interface." } } }
        }));
        let contract_doc = devdoc(json!({
            "methods": { "foo(uint256)": { "details": "Contract text.", "params": { "x": "From contract." } } }
        }));

        let enriched = enrich(&enrich(&foo(), Some(&interface_doc)), Some(&contract_doc));
        assert_eq!(enriched.description.as_deref(), Some("Contract text."));
        assert_eq!(enriched.inputs.unwrap()[0].description.as_deref(), Some("From interface."));
    }

    #[test]
    fn test_existing_descriptions_are_kept() {
        let mut unit = foo();
        unit.description = Some("Own text.".to_string());
        unit.inputs.as_mut().unwrap()[0].description = Some("Own param.".to_string());

        let enriched = enrich(&unit, Some(&devdoc(json!({
            "methods": { "foo(uint256)": { "params": { "x": "Doc param." } } }
        }))));
        assert_eq!(enriched.description.as_deref(), Some("Own text."));
        assert_eq!(enriched.inputs.unwrap()[0].description.as_deref(), Some("Own param."));
    }

    #[test]
    fn test_enrichment_is_idempotent() {
        let doc = devdoc(json!({
            "methods": { "foo(uint256)": { "details": "Does foo.", "params": { "x": "X." }, "returns": { "_0": "Ok." } } },
            "stateVariables": { "foo": { "details": "Stored foo." } }
        }));
        let once = enrich(&foo(), Some(&doc));
        let twice = enrich(&once, Some(&doc));
        assert_eq!(once, twice);
        assert!(once.is_state_variable);
    }

    #[test]
    fn test_enrichment_drops_unknown_unit_fields_and_empty_names() {
        let unit: AbiUnit = serde_json::from_value(json!({
            "type": "fallback",
            "name": "",
            "stateMutability": "payable",
            "anonymous": false
        }))
        .unwrap();
        let enriched = enrich(&unit, None);
        assert_eq!(
            serde_json::to_value(&enriched).unwrap(),
            json!({ "type": "fallback", "stateMutability": "payable" })
        );
    }

    #[test]
    fn test_events_are_documented_from_events_section() {
        let doc = devdoc(json!({
            "events": { "Transfer(address,address,uint256)": { "details": "Moved." } },
            "stateVariables": { "Transfer": { "details": "Not an event doc." } }
        }));
        let enriched = enrich(&AbiUnit::new(AbiType::Event, "Transfer"), Some(&doc));
        assert_eq!(enriched.description.as_deref(), Some("Moved."));
        assert!(!enriched.is_state_variable);
    }

    #[test]
    fn test_dedup_disjoint_names_keeps_everything() {
        let a = vec![AbiUnit::new(AbiType::Function, "a"), AbiUnit::new(AbiType::Event, "B")];
        let b = vec![AbiUnit::new(AbiType::Function, "c")];
        let merged = dedup_by_name(a.iter().chain(&b).cloned());
        assert_eq!(merged, [a, b].concat());
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let first = AbiUnit { description: Some("first".to_string()), ..AbiUnit::new(AbiType::Event, "Transfer") };
        let second = AbiUnit { description: Some("second".to_string()), ..AbiUnit::new(AbiType::Event, "Transfer") };
        let merged = dedup_by_name(vec![first.clone(), second]);
        assert_eq!(merged, vec![first]);
    }

    #[test]
    fn test_dedup_collapses_unnamed_units() {
        let merged = dedup_by_name(vec![
            AbiUnit { kind: AbiType::Fallback, ..Default::default() },
            AbiUnit { kind: AbiType::Receive, ..Default::default() },
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].kind, AbiType::Fallback);
    }

    #[test]
    fn test_contract_version_wins_on_shared_event() {
        let contract_event = AbiUnit {
            inputs: Some(vec![Parameter::new("from", "address")]),
            ..AbiUnit::new(AbiType::Event, "Transfer")
        };
        let group = ContractGroup {
            name: "Token".to_string(),
            contract: Some(ContractArtifact { abi: vec![contract_event.clone()], ..Default::default() }),
            interface: Some(ContractArtifact {
                abi: vec![AbiUnit::new(AbiType::Event, "Transfer")],
                ..Default::default()
            }),
        };

        let artifact = merge_group(&group).unwrap();
        assert_eq!(artifact.abi, vec![contract_event]);
    }

    #[test]
    fn test_interface_artifact_used_when_contract_abi_empty() {
        let group = ContractGroup {
            name: "Loan".to_string(),
            contract: None,
            interface: Some(ContractArtifact {
                abi: vec![AbiUnit::new(AbiType::Function, "repay")],
                metadata: Some(r#"{"output":{"abi":[]}}"#.to_string()),
                ..Default::default()
            }),
        };

        let artifact = merge_group(&group).unwrap();
        assert_eq!(artifact.abi.len(), 1);
        assert_eq!(
            artifact.metadata.as_deref(),
            Some(r#"{"output":{"abi":[{"type":"function","name":"repay"}]}}"#)
        );
    }

    #[test]
    fn test_empty_group_gives_empty_abi() {
        let artifact = merge_group(&ContractGroup::default()).unwrap();
        assert!(artifact.abi.is_empty());
        assert!(artifact.metadata.is_none());
    }

    #[test]
    fn test_malformed_metadata_is_fatal() {
        let group = ContractGroup {
            name: "Pool".to_string(),
            contract: Some(ContractArtifact {
                abi: vec![AbiUnit::new(AbiType::Function, "deposit")],
                metadata: Some("{".to_string()),
                ..Default::default()
            }),
            interface: None,
        };
        assert!(merge_group(&group).is_err());
    }
}
