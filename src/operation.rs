//! The Operation Set: the ten primitive mutations a [`crate::transaction::Transaction`]
//! can push, each with its own pre/postcondition checks against the current
//! overlay.
//!
//! Every operation validates against an [`crate::transaction::Overlay`]
//! (never the live filesystem directly) so a whole batch can be checked
//! before a single byte is written — the same push-then-commit shape the
//! teacher's own transaction log uses for its ops, just with onyo's
//! invariants instead of merge-conflict detection.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::OnyoError;
use crate::model::name::NameTemplate;
use crate::model::value::Value;
use crate::transaction::Overlay;
use crate::view::AssetKind;
use crate::yaml::patch::Patch;

/// One primitive inventory mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    /// Create a new tracked (initially empty) directory.
    NewDirectory {
        /// Directory to create.
        path: PathBuf,
    },
    /// Create a new asset at `path` with the given body.
    NewAsset {
        /// Asset path (file or directory, per `is_directory`).
        path: PathBuf,
        /// Initial document body, before bound fields are written in.
        body: IndexMap<String, Value>,
        /// Whether the asset is stored as a directory.
        is_directory: bool,
    },
    /// Patch an existing asset's body, without touching any bound field.
    ModifyAsset {
        /// Asset to modify.
        path: PathBuf,
        /// The patch to apply.
        patch: Patch,
    },
    /// Rename an asset in place (its bound fields change; non-bound body is
    /// untouched).
    RenameAsset {
        /// Current path.
        from: PathBuf,
        /// New path (same parent directory).
        to: PathBuf,
    },
    /// Move an asset into a different tracked directory, keeping its name.
    MoveAsset {
        /// Current path.
        from: PathBuf,
        /// Destination directory.
        to_dir: PathBuf,
    },
    /// Move a whole directory subtree into a different parent directory.
    MoveDirectory {
        /// Current path.
        from: PathBuf,
        /// Destination parent directory.
        to_dir: PathBuf,
    },
    /// Remove an asset.
    RemoveAsset {
        /// Asset to remove.
        path: PathBuf,
    },
    /// Remove a directory.
    RemoveDirectory {
        /// Directory to remove.
        path: PathBuf,
        /// Whether to remove a populated directory's contents too.
        recursive: bool,
    },
    /// Convert a file asset into a directory asset, preserving its body.
    ConvertToAssetDirectory {
        /// Asset to convert.
        path: PathBuf,
    },
    /// Convert a directory asset back into a file asset, preserving its body.
    ConvertFromAssetDirectory {
        /// Asset to convert.
        path: PathBuf,
    },
}

/// Which commit-message grouping section an operation belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpGroup {
    /// New assets.
    NewAsset,
    /// New directories.
    NewDirectory,
    /// Moved or renamed assets.
    MovedAsset,
    /// Moved directories.
    MovedDirectory,
    /// Modified assets.
    ModifiedAsset,
    /// Removed assets.
    RemovedAsset,
    /// Removed directories.
    RemovedDirectory,
}

impl Operation {
    /// Short verb used in the commit subject line (e.g. `new`, `mv`, `rm`).
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::NewDirectory { .. } => "mkdir",
            Self::NewAsset { .. } => "new",
            Self::ModifyAsset { .. } => "set",
            Self::RenameAsset { .. } | Self::MoveAsset { .. } | Self::MoveDirectory { .. } => "mv",
            Self::RemoveAsset { .. } => "rm",
            Self::RemoveDirectory { .. } => "rmdir",
            Self::ConvertToAssetDirectory { .. } | Self::ConvertFromAssetDirectory { .. } => "set",
        }
    }

    /// The commit-message grouping this operation falls under.
    #[must_use]
    pub const fn group(&self) -> OpGroup {
        match self {
            Self::NewDirectory { .. } => OpGroup::NewDirectory,
            Self::NewAsset { .. } => OpGroup::NewAsset,
            Self::ModifyAsset { .. }
            | Self::ConvertToAssetDirectory { .. }
            | Self::ConvertFromAssetDirectory { .. } => OpGroup::ModifiedAsset,
            Self::RenameAsset { .. } | Self::MoveAsset { .. } => OpGroup::MovedAsset,
            Self::MoveDirectory { .. } => OpGroup::MovedDirectory,
            Self::RemoveAsset { .. } => OpGroup::RemovedAsset,
            Self::RemoveDirectory { .. } => OpGroup::RemovedDirectory,
        }
    }

    /// One or two paths describing the change, for commit-message rendering:
    /// `(affected-path, Some(origin-path))` for moves/renames, `(path, None)`
    /// otherwise.
    #[must_use]
    pub fn display_paths(&self) -> (&Path, Option<&Path>) {
        match self {
            Self::NewDirectory { path }
            | Self::NewAsset { path, .. }
            | Self::ModifyAsset { path, .. }
            | Self::RemoveAsset { path }
            | Self::RemoveDirectory { path, .. }
            | Self::ConvertToAssetDirectory { path }
            | Self::ConvertFromAssetDirectory { path } => (path, None),
            Self::RenameAsset { from, to } => (to, Some(from)),
            Self::MoveAsset { from, to_dir } | Self::MoveDirectory { from, to_dir } => {
                (to_dir, Some(from))
            }
        }
    }

    /// Validate this operation's preconditions against `overlay`, then apply
    /// its effect to `overlay` if they hold.
    ///
    /// # Errors
    /// Returns [`OnyoError::TransactionRejected`] (or a more specific
    /// variant) describing the first violated precondition.
    pub fn apply(&self, overlay: &mut Overlay, template: &NameTemplate) -> Result<(), OnyoError> {
        match self {
            Self::NewDirectory { path } => {
                if overlay.has_directory(path) || overlay.has_asset(path) {
                    return Err(OnyoError::NameCollision { path: path.clone() });
                }
                overlay.insert_directory(path);
            }
            Self::NewAsset { path, body, is_directory } => {
                if overlay.has_asset(path) || overlay.has_directory(path) {
                    return Err(OnyoError::NameCollision { path: path.clone() });
                }
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    overlay.require_directory(parent)?;
                }
                validate_name(path, template)?;
                let kind = if *is_directory { AssetKind::Directory } else { AssetKind::File };
                overlay.insert_asset(path, kind, body.clone(), template)?;
            }
            Self::ModifyAsset { path, patch } => {
                let asset = overlay.require_asset(path, template)?;
                if let Some(key) = asset.rejects_patch_touching_bound_fields(patch.touched_top_level_keys()) {
                    return Err(OnyoError::BoundKeyMutation { key });
                }
                overlay.patch_asset(path, patch)?;
            }
            Self::RenameAsset { from, to } => {
                if from.parent() != to.parent() {
                    return Err(OnyoError::TransactionRejected {
                        violation: "rename-asset must keep the same parent directory; use move-asset to relocate".to_owned(),
                    });
                }
                if overlay.has_asset(to) || overlay.has_directory(to) {
                    return Err(OnyoError::NameCollision { path: to.clone() });
                }
                overlay.require_asset(from, template)?;
                validate_name(to, template)?;
                overlay.rename_asset(from, to, template)?;
            }
            Self::MoveAsset { from, to_dir } => {
                overlay.require_asset(from, template)?;
                overlay.require_directory(to_dir)?;
                let name = from.file_name().ok_or_else(|| OnyoError::NoSuchAsset { path: from.clone() })?;
                let to = to_dir.join(name);
                if overlay.has_asset(&to) || overlay.has_directory(&to) {
                    return Err(OnyoError::NameCollision { path: to });
                }
                overlay.rename_asset(from, &to, template)?;
            }
            Self::MoveDirectory { from, to_dir } => {
                overlay.require_directory(from)?;
                overlay.require_directory(to_dir)?;
                let name = from.file_name().ok_or_else(|| OnyoError::NoSuchDirectory { path: from.clone() })?;
                let to = to_dir.join(name);
                if overlay.has_directory(&to) || overlay.has_asset(&to) {
                    return Err(OnyoError::NameCollision { path: to });
                }
                overlay.rename_directory(from, &to);
            }
            Self::RemoveAsset { path } => {
                overlay.require_asset(path, template)?;
                overlay.remove_asset(path);
            }
            Self::RemoveDirectory { path, recursive } => {
                overlay.require_directory(path)?;
                if !recursive && overlay.directory_has_contents(path) {
                    return Err(OnyoError::NotEmpty { path: path.clone() });
                }
                overlay.remove_directory(path);
            }
            Self::ConvertToAssetDirectory { path } => {
                let kind = overlay.asset_kind(path).ok_or_else(|| OnyoError::NoSuchAsset { path: path.clone() })?;
                if kind == AssetKind::Directory {
                    return Err(OnyoError::TransactionRejected {
                        violation: format!("'{}' is already an asset directory", path.display()),
                    });
                }
                overlay.set_asset_kind(path, AssetKind::Directory);
            }
            Self::ConvertFromAssetDirectory { path } => {
                let kind = overlay.asset_kind(path).ok_or_else(|| OnyoError::NoSuchAsset { path: path.clone() })?;
                if kind == AssetKind::File {
                    return Err(OnyoError::TransactionRejected {
                        violation: format!("'{}' is not an asset directory", path.display()),
                    });
                }
                if overlay.directory_has_contents(path) {
                    return Err(OnyoError::TransactionRejected {
                        violation: format!(
                            "'{}' has files other than its content document; remove them first",
                            path.display()
                        ),
                    });
                }
                overlay.set_asset_kind(path, AssetKind::File);
            }
        }
        Ok(())
    }
}

fn validate_name(path: &Path, template: &NameTemplate) -> Result<(), OnyoError> {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    template.parse_name(&name).map_err(|e| OnyoError::InvalidAssetName {
        name,
        clause: e.reason,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::RepositoryView;

    fn template() -> NameTemplate {
        NameTemplate::parse("{type}_{make}_{model}.{serial}").unwrap()
    }

    fn empty_overlay() -> Overlay {
        Overlay::from_view(&RepositoryView::default())
    }

    #[test]
    fn new_directory_then_collision() {
        let mut overlay = empty_overlay();
        let op = Operation::NewDirectory { path: PathBuf::from("shelf") };
        op.apply(&mut overlay, &template()).unwrap();
        assert!(overlay.has_directory(Path::new("shelf")));
        assert!(op.apply(&mut overlay, &template()).is_err());
    }

    #[test]
    fn new_asset_rejects_bad_name() {
        let mut overlay = empty_overlay();
        overlay.insert_directory(Path::new("shelf"));
        let op = Operation::NewAsset {
            path: PathBuf::from("shelf/not-a-valid-name"),
            body: IndexMap::new(),
            is_directory: false,
        };
        assert!(matches!(
            op.apply(&mut overlay, &template()),
            Err(OnyoError::InvalidAssetName { .. })
        ));
    }

    #[test]
    fn new_asset_then_modify_rejects_bound_key() {
        let mut overlay = empty_overlay();
        overlay.insert_directory(Path::new("shelf"));
        let new_op = Operation::NewAsset {
            path: PathBuf::from("shelf/laptop_dell_xps13.abc123"),
            body: IndexMap::new(),
            is_directory: false,
        };
        new_op.apply(&mut overlay, &template()).unwrap();

        let modify = Operation::ModifyAsset {
            path: PathBuf::from("shelf/laptop_dell_xps13.abc123"),
            patch: Patch { set: vec![("make".to_owned(), Value::from("lenovo"))], unset: vec![] },
        };
        assert!(matches!(
            modify.apply(&mut overlay, &template()),
            Err(OnyoError::BoundKeyMutation { .. })
        ));
    }

    #[test]
    fn rename_asset_rejects_directory_change() {
        let mut overlay = empty_overlay();
        overlay.insert_directory(Path::new("shelf"));
        overlay.insert_directory(Path::new("closet"));
        let new_op = Operation::NewAsset {
            path: PathBuf::from("shelf/laptop_dell_xps13.abc123"),
            body: IndexMap::new(),
            is_directory: false,
        };
        new_op.apply(&mut overlay, &template()).unwrap();

        let rename = Operation::RenameAsset {
            from: PathBuf::from("shelf/laptop_dell_xps13.abc123"),
            to: PathBuf::from("closet/laptop_dell_xps13.abc123"),
        };
        assert!(matches!(
            rename.apply(&mut overlay, &template()),
            Err(OnyoError::TransactionRejected { .. })
        ));
    }

    #[test]
    fn move_asset_relocates_into_directory() {
        let mut overlay = empty_overlay();
        overlay.insert_directory(Path::new("shelf"));
        overlay.insert_directory(Path::new("closet"));
        let new_op = Operation::NewAsset {
            path: PathBuf::from("shelf/laptop_dell_xps13.abc123"),
            body: IndexMap::new(),
            is_directory: false,
        };
        new_op.apply(&mut overlay, &template()).unwrap();

        let mv = Operation::MoveAsset {
            from: PathBuf::from("shelf/laptop_dell_xps13.abc123"),
            to_dir: PathBuf::from("closet"),
        };
        mv.apply(&mut overlay, &template()).unwrap();
        assert!(overlay.has_asset(Path::new("closet/laptop_dell_xps13.abc123")));
        assert!(!overlay.has_asset(Path::new("shelf/laptop_dell_xps13.abc123")));
    }

    #[test]
    fn remove_directory_rejects_nonempty_without_recursive() {
        let mut overlay = empty_overlay();
        overlay.insert_directory(Path::new("shelf"));
        let new_op = Operation::NewAsset {
            path: PathBuf::from("shelf/laptop_dell_xps13.abc123"),
            body: IndexMap::new(),
            is_directory: false,
        };
        new_op.apply(&mut overlay, &template()).unwrap();

        let rm = Operation::RemoveDirectory { path: PathBuf::from("shelf"), recursive: false };
        assert!(matches!(rm.apply(&mut overlay, &template()), Err(OnyoError::NotEmpty { .. })));
    }

    #[test]
    fn convert_to_and_from_asset_directory() {
        let mut overlay = empty_overlay();
        overlay.insert_directory(Path::new("shelf"));
        let new_op = Operation::NewAsset {
            path: PathBuf::from("shelf/laptop_dell_xps13.abc123"),
            body: IndexMap::new(),
            is_directory: false,
        };
        new_op.apply(&mut overlay, &template()).unwrap();

        let to_dir = Operation::ConvertToAssetDirectory { path: PathBuf::from("shelf/laptop_dell_xps13.abc123") };
        to_dir.apply(&mut overlay, &template()).unwrap();
        assert_eq!(overlay.asset_kind(Path::new("shelf/laptop_dell_xps13.abc123")), Some(AssetKind::Directory));

        let from_dir = Operation::ConvertFromAssetDirectory { path: PathBuf::from("shelf/laptop_dell_xps13.abc123") };
        from_dir.apply(&mut overlay, &template()).unwrap();
        assert_eq!(overlay.asset_kind(Path::new("shelf/laptop_dell_xps13.abc123")), Some(AssetKind::File));
    }
}
