//! Typed model of Solidity ABI entries

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha3::{Digest, Keccak256};

/// Solidity ABI as an ordered list of entries
pub type Abi = Vec<AbiUnit>;

/// Kind of an ABI entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbiType {
    Constructor,
    #[default]
    Function,
    Event,
    Fallback,
    Receive,
    Error,
}

impl AbiType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbiType::Constructor => "constructor",
            AbiType::Function => "function",
            AbiType::Event => "event",
            AbiType::Fallback => "fallback",
            AbiType::Receive => "receive",
            AbiType::Error => "error",
        }
    }
}

/// One element of a contract's ABI array
///
/// Fields outside of this set (such as `anonymous`) are not carried through
/// enrichment and are dropped on parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiUnit {
    #[serde(rename = "type", default)]
    pub kind: AbiType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<Parameter>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Parameter>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Set when the entry is the getter of a public state variable
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_state_variable: bool,
}

/// A function, event or error parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `internalType`, `indexed`, `components` and anything else the compiler emits
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AbiUnit {
    pub fn new(kind: AbiType, name: impl Into<String>) -> Self {
        Self { kind, name: Some(name.into()), ..Default::default() }
    }

    /// Name, or the empty string for constructor/fallback/receive
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Canonical signature such as `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        let name = match self.kind {
            AbiType::Constructor | AbiType::Fallback | AbiType::Receive => self.kind.as_str(),
            _ => self.name_or_empty(),
        };
        let types = self
            .inputs
            .iter()
            .flatten()
            .map(Parameter::canonical_type)
            .collect::<Vec<_>>()
            .join(",");
        format!("{name}({types})")
    }

    /// 4-byte selector for functions and errors
    pub fn selector(&self) -> Option<String> {
        match self.kind {
            AbiType::Function | AbiType::Error => {
                let hash = Keccak256::digest(self.signature().as_bytes());
                Some(format!("0x{}", hex::encode(&hash[..4])))
            }
            _ => None,
        }
    }
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { name: name.into(), kind: kind.into(), ..Default::default() }
    }

    /// Type as it appears in a canonical signature, expanding tuples
    pub fn canonical_type(&self) -> String {
        let Some(suffix) = self.kind.strip_prefix("tuple") else {
            return self.kind.clone();
        };

        let components = self
            .extra
            .get("components")
            .and_then(|c| serde_json::from_value::<Vec<Parameter>>(c.clone()).ok())
            .unwrap_or_default();

        let inner = components.iter().map(Parameter::canonical_type).collect::<Vec<_>>().join(",");
        format!("({inner}){suffix}")
    }
}
