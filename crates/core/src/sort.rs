//! Canonical ordering of combined ABIs

use crate::artifacts::{AbiType, AbiUnit};
use std::cmp::Ordering;

/// Constructor first, then events, then everything else.
fn category(unit: &AbiUnit) -> u8 {
    match unit.kind {
        AbiType::Constructor => 0,
        AbiType::Event => 1,
        _ => 2,
    }
}

/// ALL-CAPS names are treated as constants
fn is_constant_name(name: &str) -> bool {
    !name.is_empty() && name.to_uppercase() == name
}

/// Total order used for documentation and merged-interface output.
///
/// Within a category: constant-style names, then state variables, then
/// case-insensitive name. Exact name and entry type break remaining ties.
pub fn canonical_cmp(a: &AbiUnit, b: &AbiUnit) -> Ordering {
    let (a_name, b_name) = (a.name_or_empty(), b.name_or_empty());

    category(a)
        .cmp(&category(b))
        .then_with(|| is_constant_name(b_name).cmp(&is_constant_name(a_name)))
        .then_with(|| b.is_state_variable.cmp(&a.is_state_variable))
        .then_with(|| a_name.to_uppercase().cmp(&b_name.to_uppercase()))
        .then_with(|| a_name.cmp(b_name))
        .then_with(|| a.kind.cmp(&b.kind))
}

pub fn canonical_sort(abi: &mut [AbiUnit]) {
    abi.sort_by(canonical_cmp);
}
