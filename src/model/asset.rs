//! The `Asset` type: a document bound to a path by its name fields.
//!
//! Grounded on the invariant the teacher's `model/types.rs` enforces for its
//! own newtypes (construct-through-validate, no invalid value ever observed)
//! applied to the domain rule from the Data Model: *"the values of the bound
//! keys stored inside the document must equal those parsed from the path"*.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::model::name::NameTemplate;
use crate::model::value::Value;

/// A single inventory asset: a document at a path, with the fields bound
/// into that path kept in sync with the document body.
#[derive(Clone, Debug, PartialEq)]
pub struct Asset {
    /// Path relative to the repository root.
    pub path: PathBuf,
    /// The name-template fields parsed out of `path`'s basename, in
    /// template order.
    pub bound_fields: IndexMap<String, String>,
    /// The document body (everything below the bound fields).
    pub body: IndexMap<String, Value>,
    /// Whether this asset is stored as a directory (with a reserved body
    /// file) rather than a plain file.
    pub is_asset_directory: bool,
}

impl Asset {
    /// Build an asset from its path and document body, deriving the bound
    /// fields from the path's basename via `template`.
    ///
    /// # Errors
    /// Returns a [`crate::model::name::ValidationError`] if the basename
    /// does not parse against `template`.
    pub fn from_path_and_body(
        path: &Path,
        body: IndexMap<String, Value>,
        template: &NameTemplate,
        is_asset_directory: bool,
    ) -> Result<Self, crate::model::name::ValidationError> {
        let basename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bound_fields = template.parse_name(&basename)?;
        Ok(Self {
            path: path.to_path_buf(),
            bound_fields,
            body,
            is_asset_directory,
        })
    }

    /// Returns `true` if every bound field's value in [`Self::body`] equals
    /// the value parsed from the path — the invariant that must hold after
    /// any create, rename, or body-patch operation.
    #[must_use]
    pub fn bound_fields_match_body(&self) -> bool {
        self.bound_fields.iter().all(|(key, value)| {
            matches!(self.body.get(key), Some(Value::String(s)) if s == value)
        })
    }

    /// Return a copy of this asset with the bound-field values written into
    /// the body, so [`Self::bound_fields_match_body`] holds.
    ///
    /// Called on create and on rename, per the name↔content binding rule —
    /// never on plain `modify`, where touching a bound key is rejected
    /// instead (see [`Self::rejects_patch_touching_bound_fields`]).
    #[must_use]
    pub fn with_bound_fields_written(mut self) -> Self {
        for (key, value) in &self.bound_fields {
            self.body
                .insert(key.clone(), Value::String(value.clone()));
        }
        self
    }

    /// Returns the bound field name that `patch_keys` illegally touches, if
    /// any. Used to reject `modify-asset` patches that target a bound key
    /// (only `rename-asset` may change them).
    #[must_use]
    pub fn rejects_patch_touching_bound_fields<'a>(
        &self,
        patch_keys: impl IntoIterator<Item = &'a str>,
    ) -> Option<String> {
        for key in patch_keys {
            let top_level = key.split('.').next().unwrap_or(key);
            if self.bound_fields.contains_key(top_level) {
                return Some(top_level.to_owned());
            }
        }
        None
    }

    /// The asset's basename (its bound-field-rendered name).
    #[must_use]
    pub fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> NameTemplate {
        NameTemplate::parse("{type}_{make}_{model}.{serial}").unwrap()
    }

    fn body_with(pairs: &[(&str, &str)]) -> IndexMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn from_path_and_body_derives_bound_fields() {
        let asset = Asset::from_path_and_body(
            Path::new("shelf/laptop_dell_xps13.abc123"),
            IndexMap::new(),
            &template(),
            false,
        )
        .unwrap();
        assert_eq!(asset.bound_fields.get("make").unwrap(), "dell");
        assert_eq!(asset.bound_fields.get("serial").unwrap(), "abc123");
    }

    #[test]
    fn bound_fields_match_body_false_when_missing() {
        let asset = Asset::from_path_and_body(
            Path::new("shelf/laptop_dell_xps13.abc123"),
            IndexMap::new(),
            &template(),
            false,
        )
        .unwrap();
        assert!(!asset.bound_fields_match_body());
    }

    #[test]
    fn with_bound_fields_written_satisfies_invariant() {
        let asset = Asset::from_path_and_body(
            Path::new("shelf/laptop_dell_xps13.abc123"),
            IndexMap::new(),
            &template(),
            false,
        )
        .unwrap()
        .with_bound_fields_written();
        assert!(asset.bound_fields_match_body());
        assert_eq!(asset.body.get("make"), Some(&Value::from("dell")));
    }

    #[test]
    fn rejects_patch_touching_bound_fields_detects_top_level() {
        let asset = Asset::from_path_and_body(
            Path::new("shelf/laptop_dell_xps13.abc123"),
            body_with(&[("make", "dell")]),
            &template(),
            false,
        )
        .unwrap();
        assert_eq!(
            asset.rejects_patch_touching_bound_fields(["make"]),
            Some("make".to_owned())
        );
        assert_eq!(asset.rejects_patch_touching_bound_fields(["ram_gb"]), None);
    }

    #[test]
    fn basename_returns_path_filename() {
        let asset = Asset::from_path_and_body(
            Path::new("shelf/laptop_dell_xps13.abc123"),
            IndexMap::new(),
            &template(),
            false,
        )
        .unwrap();
        assert_eq!(asset.basename(), "laptop_dell_xps13.abc123");
    }
}
