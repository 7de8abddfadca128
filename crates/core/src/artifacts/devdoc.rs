//! Developer documentation (NatSpec `devdoc`) emitted by the compiler

use super::abi::{AbiType, AbiUnit};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Documentation sections keyed by signature (or variable name)
pub type DevdocSection = BTreeMap<String, DevdocUnit>;

/// A devdoc document grouping the documentation of every ABI entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Devdoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Keyed by function signature; the constructor is keyed as `constructor`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub methods: DevdocSection,

    /// Keyed by event signature
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub events: DevdocSection,

    /// Keyed by variable name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub state_variables: DevdocSection,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Documentation attached to a single ABI entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevdocUnit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Parameter name to description
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,

    /// Output name (or `_<index>` for unnamed outputs) to description
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub returns: BTreeMap<String, String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Devdoc {
    /// Finds the documentation of an ABI entry.
    ///
    /// Events and functions are matched on the part of the signature before
    /// the first `(`. With overloads, the first key in lexical order wins.
    pub fn find_unit(&self, unit: &AbiUnit) -> Option<&DevdocUnit> {
        let section = match unit.kind {
            AbiType::Constructor => return self.methods.get("constructor"),
            AbiType::Event => &self.events,
            _ => &self.methods,
        };

        let name = unit.name.as_deref()?;
        section
            .iter()
            .find(|(signature, _)| signature.split('(').next() == Some(name))
            .map(|(_, doc)| doc)
    }

    /// Finds the documentation of the state variable behind a getter
    pub fn find_state_variable(&self, unit: &AbiUnit) -> Option<&DevdocUnit> {
        match unit.kind {
            AbiType::Constructor | AbiType::Event => None,
            _ => self.state_variables.get(unit.name.as_deref()?),
        }
    }
}

/// Recursively merges `source` into `target`.
///
/// Objects merge key by key and arrays index by index; any other value in
/// `source` replaces the target value, except `null`, which leaves it as is.
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (_, Value::Null) => {}
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(target), Value::Array(source)) => {
            for (index, value) in source.into_iter().enumerate() {
                match target.get_mut(index) {
                    Some(existing) => deep_merge(existing, value),
                    None => target.push(value),
                }
            }
        }
        (target, source) => *target = source,
    }
}
