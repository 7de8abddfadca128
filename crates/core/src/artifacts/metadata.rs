//! Access to the compiler's JSON-encoded contract metadata string
//!
//! The metadata is otherwise opaque: only the fields below are read or
//! replaced, and key order is preserved when it is written back.

use super::abi::AbiUnit;
use crate::error::ToolError;
use eyre::Result;
use serde_json::Value;

/// Parses a metadata string, mapping failures to [`ToolError::InvalidMetadata`]
pub fn parse(metadata: &str) -> Result<Value> {
    serde_json::from_str(metadata).map_err(|source| ToolError::InvalidMetadata { source }.into())
}

/// Replaces `output.abi` and re-serializes compactly
pub fn replace_abi(metadata: &str, abi: &[AbiUnit]) -> Result<String> {
    let mut value = parse(metadata)?;

    let output = value
        .get_mut("output")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| ToolError::missing_field("contract metadata", "output"))?;
    output.insert("abi".to_string(), serde_json::to_value(abi)?);

    Ok(serde_json::to_string(&value)?)
}

/// `sources.<path>.keccak256` from the metadata
pub fn source_hash(metadata: &str, source_path: &str) -> Result<String> {
    let value = parse(metadata)?;
    value
        .get("sources")
        .and_then(|sources| sources.get(source_path))
        .and_then(|source| source.get("keccak256"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ToolError::missing_field(
                format!("metadata of {source_path}"),
                format!("sources.{source_path}.keccak256"),
            )
            .into()
        })
}

/// The `output.devdoc` object from the metadata
pub fn devdoc(metadata: &str) -> Result<Value> {
    let mut value = parse(metadata)?;
    value
        .get_mut("output")
        .and_then(|output| output.get_mut("devdoc"))
        .map(Value::take)
        .ok_or_else(|| ToolError::missing_field("contract metadata", "output.devdoc").into())
}
