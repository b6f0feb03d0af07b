//! Applying `set`/`unset` patches to a [`crate::yaml::document::Document`].
//!
//! Grounded on the Data Model's patch contract: dotted keys address nested
//! mappings, creating intermediate mappings only when a `set` asks for one;
//! unsetting a key that is not present is a no-op; setting a scalar where a
//! mapping currently lives (or vice versa) is rejected rather than silently
//! overwritten, since that would usually be a typo in the dotted key.

use indexmap::IndexMap;

use crate::model::value::Value;

use super::document::{DocEntry, DocValue};

/// A patch to apply to a document: keys to set (possibly dotted) and keys to
/// unset (possibly dotted).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch {
    /// Dotted-key assignments, applied in order.
    pub set: Vec<(String, Value)>,
    /// Dotted keys to remove.
    pub unset: Vec<String>,
}

impl Patch {
    /// A patch with no assignments and no removals.
    #[must_use]
    pub const fn empty() -> Self {
        Self { set: Vec::new(), unset: Vec::new() }
    }

    /// The top-level (first-segment) keys this patch touches, for bound-key
    /// precondition checks. Deduplicated, in first-seen order.
    #[must_use]
    pub fn touched_top_level_keys(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for (key, _) in &self.set {
            let top = key.split('.').next().unwrap_or(key);
            if !seen.contains(&top) {
                seen.push(top);
            }
        }
        for key in &self.unset {
            let top = key.split('.').next().unwrap_or(key);
            if !seen.contains(&top) {
                seen.push(top);
            }
        }
        seen
    }
}

/// A patch could not be applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchError {
    /// The dotted key that caused the failure.
    pub key: String,
    /// Human-readable detail.
    pub message: String,
}

impl std::fmt::Display for PatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

impl std::error::Error for PatchError {}

/// Apply `patch` to `map`, returning a new mapping (the input is left
/// untouched).
///
/// # Errors
/// Returns a [`PatchError`] if a dotted key's intermediate segment names an
/// existing scalar (can't descend into it) or if a `set`/`unset` traverses
/// through a sequence.
pub fn apply_patch(
    map: &IndexMap<String, DocEntry>,
    patch: &Patch,
) -> Result<IndexMap<String, DocEntry>, PatchError> {
    let mut result = map.clone();
    for (key, value) in &patch.set {
        set_path(&mut result, key, value.clone())?;
    }
    for key in &patch.unset {
        unset_path(&mut result, key);
    }
    Ok(result)
}

fn set_path(map: &mut IndexMap<String, DocEntry>, dotted_key: &str, value: Value) -> Result<(), PatchError> {
    let mut segments = dotted_key.split('.');
    let Some(first) = segments.next() else {
        return Err(PatchError {
            key: dotted_key.to_owned(),
            message: "empty key".to_owned(),
        });
    };
    let rest: Vec<&str> = segments.collect();

    if rest.is_empty() {
        map.insert(first.to_owned(), DocEntry::new(DocValue::from_value(value)));
        return Ok(());
    }

    let entry = map.entry(first.to_owned()).or_insert_with(|| DocEntry::new(DocValue::Mapping(IndexMap::new())));
    match &mut entry.value {
        DocValue::Mapping(nested) => set_path(nested, &rest.join("."), value),
        DocValue::Scalar { .. } | DocValue::Sequence(_) => Err(PatchError {
            key: dotted_key.to_owned(),
            message: format!("'{first}' is not a mapping, cannot set a nested key under it"),
        }),
    }
}

fn unset_path(map: &mut IndexMap<String, DocEntry>, dotted_key: &str) {
    let mut segments = dotted_key.splitn(2, '.');
    let Some(first) = segments.next() else { return };
    match segments.next() {
        None => {
            map.shift_remove(first);
        }
        Some(rest) => {
            if let Some(entry) = map.get_mut(first) {
                if let DocValue::Mapping(nested) = &mut entry.value {
                    unset_path(nested, rest);
                }
                // Unsetting through a non-mapping, or a missing key, is a no-op.
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::yaml::document::Document;

    fn doc(text: &str) -> IndexMap<String, DocEntry> {
        Document::load(text).unwrap().root
    }

    #[test]
    fn set_top_level_key() {
        let map = doc("---\nmake: dell\n");
        let patch = Patch { set: vec![("make".to_owned(), Value::from("lenovo"))], unset: vec![] };
        let result = apply_patch(&map, &patch).unwrap();
        assert_eq!(result.get("make").unwrap().value.to_value(), Value::from("lenovo"));
    }

    #[test]
    fn set_creates_intermediate_mapping() {
        let map = doc("---\ntype: laptop\n");
        let patch = Patch { set: vec![("location.city".to_owned(), Value::from("ghent"))], unset: vec![] };
        let result = apply_patch(&map, &patch).unwrap();
        let DocValue::Mapping(nested) = &result.get("location").unwrap().value else {
            panic!("expected mapping");
        };
        assert_eq!(nested.get("city").unwrap().value.to_value(), Value::from("ghent"));
    }

    #[test]
    fn set_through_existing_scalar_errors() {
        let map = doc("---\nmake: dell\n");
        let patch = Patch { set: vec![("make.sub".to_owned(), Value::from("x"))], unset: vec![] };
        assert!(apply_patch(&map, &patch).is_err());
    }

    #[test]
    fn unset_missing_key_is_noop() {
        let map = doc("---\nmake: dell\n");
        let patch = Patch { set: vec![], unset: vec!["nope".to_owned()] };
        let result = apply_patch(&map, &patch).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn unset_nested_key() {
        let map = doc("---\nlocation:\n  city: ghent\n  floor: 2\n");
        let patch = Patch { set: vec![], unset: vec!["location.floor".to_owned()] };
        let result = apply_patch(&map, &patch).unwrap();
        let DocValue::Mapping(nested) = &result.get("location").unwrap().value else {
            panic!("expected mapping");
        };
        assert!(!nested.contains_key("floor"));
        assert!(nested.contains_key("city"));
    }

    #[test]
    fn touched_top_level_keys_dedupes() {
        let patch = Patch {
            set: vec![("a.b".to_owned(), Value::Int(1)), ("a.c".to_owned(), Value::Int(2))],
            unset: vec!["d".to_owned()],
        };
        assert_eq!(patch.touched_top_level_keys(), vec!["a", "d"]);
    }

    #[test]
    fn original_map_is_untouched() {
        let map = doc("---\nmake: dell\n");
        let patch = Patch { set: vec![("make".to_owned(), Value::from("lenovo"))], unset: vec![] };
        let _ = apply_patch(&map, &patch).unwrap();
        assert_eq!(map.get("make").unwrap().value.to_value(), Value::from("dell"));
    }
}
