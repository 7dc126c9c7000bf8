//! Lifting one key out of a mapping and putting it back where it was.

use serde_yaml::{Mapping, Value};

/// Removes `key` from `mapping`, returning the remaining entries and the
/// lifted value together with its original position.
pub(super) fn lift(mapping: Mapping, key: &str) -> (Mapping, Option<(usize, Value)>) {
    let mut rest = Mapping::with_capacity(mapping.len());
    let mut lifted = None;
    for (position, (k, v)) in mapping.into_iter().enumerate() {
        if lifted.is_none() && k.as_str() == Some(key) {
            lifted = Some((position, v));
        } else {
            rest.insert(k, v);
        }
    }
    (rest, lifted)
}

/// Inverse of [`lift`]. A value without a remembered position is appended.
pub(super) fn lower(
    rest: &Mapping,
    key: &str,
    position: Option<usize>,
    value: Option<Value>,
) -> Mapping {
    let Some(value) = value else {
        return rest.clone();
    };

    let mut out = Mapping::with_capacity(rest.len() + 1);
    let mut pending = Some(value);
    for (index, (k, v)) in rest.iter().enumerate() {
        if position == Some(index) {
            if let Some(value) = pending.take() {
                out.insert(Value::String(key.to_string()), value);
            }
        }
        out.insert(k.clone(), v.clone());
    }
    if let Some(value) = pending {
        out.insert(Value::String(key.to_string()), value);
    }
    out
}
