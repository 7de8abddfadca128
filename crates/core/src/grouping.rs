//! Pairing of contracts with their `I`-prefixed interfaces

use crate::artifacts::{CompilerOutput, ContractArtifact};
use crate::utils::{name_allowed, path_ignored};
use std::collections::BTreeMap;
use tracing::debug;

/// A contract and its same-named interface; either side may be absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractGroup {
    /// Contract name without the interface prefix
    pub name: String,
    pub contract: Option<ContractArtifact>,
    pub interface: Option<ContractArtifact>,
}

/// Splits a declared name into its group name and whether it is the interface side
pub fn group_name(declared: &str) -> (&str, bool) {
    match declared.strip_prefix('I') {
        Some(base) => (base, true),
        None => (declared, false),
    }
}

/// Groups every contract of a compiler output by canonical name.
///
/// Source paths matching `ignore_paths` are dropped before pairing. Paths are
/// visited in sorted order, so when two files declare the same name the later
/// path wins. Only groups whose name passes `filter` are returned.
pub fn group_contracts(
    output: &CompilerOutput,
    ignore_paths: &[String],
    filter: &[String],
) -> Vec<ContractGroup> {
    let mut groups: BTreeMap<String, ContractGroup> = BTreeMap::new();

    for (path, contracts) in &output.contracts {
        if path_ignored(path, ignore_paths) {
            debug!("Ignoring {}", path);
            continue;
        }

        for (declared, artifact) in contracts {
            let (name, is_interface) = group_name(declared);
            let group = groups.entry(name.to_string()).or_insert_with(|| ContractGroup {
                name: name.to_string(),
                ..Default::default()
            });

            if is_interface {
                group.interface = Some(artifact.clone());
            } else {
                group.contract = Some(artifact.clone());
            }
        }
    }

    groups.into_values().filter(|group| name_allowed(&group.name, filter)).collect()
}
