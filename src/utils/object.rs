//! Shallow JSON object helpers.
//!
//! Rendering contexts are plain JSON objects. Merging is shallow: a key
//! supplied by the caller replaces the whole value, nested objects are not combined.

use serde_json::{Map, Value};

/// Copies every key of `extension` into `target`, overwriting existing keys.
pub fn extend(target: &mut Map<String, Value>, extension: &Map<String, Value>) {
    for (key, value) in extension {
        target.insert(key.clone(), value.clone());
    }
}

/// Returns a new object with the keys of `base` overlaid by those of `overlay`.
///
/// Neither input is modified.
#[must_use]
pub fn merge(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    extend(&mut merged, overlay);
    merged
}
