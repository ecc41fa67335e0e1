use std::collections::BTreeMap;

use super::Dtype;

/// Merge per-key type observations from a new source into the known types.
///
/// Keys only present in `incoming` are adopted as-is. Keys present in both take
/// the lattice maximum, so a key seen as `INT` in one project and `STRING` in
/// another resolves to `STRING`. Keys only present in `existing` are kept.
///
/// The merge is monotonic (no key ever moves down the lattice) and idempotent:
/// consolidating the result with the same `incoming` again changes nothing.
pub fn consolidate(
    existing: &BTreeMap<String, Dtype>,
    incoming: &BTreeMap<String, Dtype>,
) -> BTreeMap<String, Dtype> {
    let mut merged = existing.clone();
    for (key, &dtype) in incoming {
        merged
            .entry(key.clone())
            .and_modify(|current| *current = (*current).max(dtype))
            .or_insert(dtype);
    }
    merged
}

/// Keys whose type in `merged` differs from `existing`, with old and new type.
///
/// New keys are reported with `None` as the previous type.
pub fn changed_types<'a>(
    existing: &BTreeMap<String, Dtype>,
    merged: &'a BTreeMap<String, Dtype>,
) -> Vec<(&'a str, Option<Dtype>, Dtype)> {
    merged
        .iter()
        .filter_map(|(key, &new)| match existing.get(key) {
            Some(&old) if old == new => None,
            old => Some((key.as_str(), old.copied(), new)),
        })
        .collect()
}
