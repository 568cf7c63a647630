//! Helpers for persisting state after partial failures

use crate::types::{AttributePath, Dynamic, DynamicValue};

/// Builds the state to persist when an apply fails part-way through.
///
/// Starts from `prior` and takes the planned value of each attribute in
/// `committed`, leaving everything else as it was before the apply. Unknown
/// planned values are never persisted: a wholly unknown attribute keeps its
/// prior value and unknowns nested inside a known one become null.
pub fn merge_committed<S: AsRef<str>>(
    prior: &DynamicValue,
    planned: &DynamicValue,
    committed: &[S],
) -> DynamicValue {
    let mut merged = if prior.is_null() {
        DynamicValue::object()
    } else {
        prior.clone()
    };

    for name in committed {
        let path = AttributePath::new(name.as_ref());
        let value = planned.get(&path).cloned().unwrap_or(Dynamic::Null);
        if value.is_unknown() {
            continue;
        }
        if let Err(e) = merged.set_value(&path, strip_unknown(value)) {
            tracing::warn!("could not carry committed attribute {}: {}", path, e);
        }
    }

    merged
}

fn strip_unknown(value: Dynamic) -> Dynamic {
    match value {
        Dynamic::Unknown => Dynamic::Null,
        Dynamic::List(items) => Dynamic::List(items.into_iter().map(strip_unknown).collect()),
        Dynamic::Map(entries) => Dynamic::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k, strip_unknown(v)))
                .collect(),
        ),
        other => other,
    }
}
