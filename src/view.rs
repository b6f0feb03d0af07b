//! The Repository View: a cached, read-only projection of the tracked tree.
//!
//! Built from [`onyo_git::GitAdapter::list_tracked`] plus two reserved
//! filenames: `.anchor` marks a tracked (possibly empty-of-assets)
//! directory, `.onyo-content.yaml` marks its parent directory as an
//! asset-directory's body file. Anything else tracked outside `.onyo/` is a
//! plain-file asset.
//!
//! The view is rebuilt lazily — [`RepositoryView::rebuild`] — and callers
//! invalidate it after any successful [`crate::transaction::Transaction`]
//! commit, mirroring the teacher's read-through cache that is dropped after
//! a mutating call rather than patched incrementally.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use onyo_git::GitAdapter;

/// Reserved marker file present in every tracked directory.
pub const ANCHOR_FILE: &str = ".anchor";

/// Reserved body filename for an asset stored as a directory.
pub const ASSET_DIRECTORY_CONTENT_FILE: &str = ".onyo-content.yaml";

/// Whether a tracked asset is a plain file or a directory with a reserved
/// content file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    /// The asset's document lives directly at its path.
    File,
    /// The asset is a directory; its document lives at
    /// `path/.onyo-content.yaml`.
    Directory,
}

/// A read-only snapshot of the repository's tracked structure.
#[derive(Clone, Debug, Default)]
pub struct RepositoryView {
    /// Every tracked directory (anything containing `.anchor`, or any
    /// ancestor of a tracked path).
    directories: BTreeSet<PathBuf>,
    /// Every asset path, keyed by its repository-relative path, mapped to
    /// whether it's a file or directory asset.
    assets: HashMap<PathBuf, AssetKind>,
    /// Basename -> full path, for fast `resolve` lookups. Collisions (two
    /// assets sharing a basename in different directories) keep the first
    /// one seen; `resolve` is a convenience, not the source of truth.
    name_index: HashMap<String, PathBuf>,
}

impl RepositoryView {
    /// Rebuild the view from the adapter's current tracked-file listing.
    ///
    /// # Errors
    /// Propagates any [`onyo_git::GitError`] from `list_tracked`.
    pub fn rebuild(git: &dyn GitAdapter) -> Result<Self, onyo_git::GitError> {
        let tracked = git.list_tracked()?;
        let mut directories = BTreeSet::new();
        let mut content_dirs = BTreeSet::new();
        let mut files = Vec::new();

        for path in &tracked {
            if is_under_onyo_dir(path) {
                continue;
            }
            for ancestor in path.ancestors().skip(1) {
                if ancestor == Path::new("") {
                    break;
                }
                directories.insert(ancestor.to_path_buf());
            }
            match path.file_name().and_then(|n| n.to_str()) {
                Some(name) if name == ANCHOR_FILE => {}
                Some(name) if name == ASSET_DIRECTORY_CONTENT_FILE => {
                    if let Some(parent) = path.parent() {
                        content_dirs.insert(parent.to_path_buf());
                    }
                }
                _ => files.push(path.clone()),
            }
        }

        let mut assets = HashMap::new();
        let mut name_index = HashMap::new();
        for dir in &content_dirs {
            assets.insert(dir.clone(), AssetKind::Directory);
            if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
                name_index.entry(name.to_owned()).or_insert_with(|| dir.clone());
            }
        }
        for file in files {
            if content_dirs.iter().any(|d| file.starts_with(d)) {
                continue;
            }
            if let Some(name) = file.file_name().and_then(|n| n.to_str()) {
                name_index.entry(name.to_owned()).or_insert_with(|| file.clone());
            }
            assets.insert(file, AssetKind::File);
        }

        Ok(Self { directories, assets, name_index })
    }

    /// Returns `true` if `path` is a tracked directory.
    #[must_use]
    pub fn is_directory(&self, path: &Path) -> bool {
        self.directories.contains(path)
    }

    /// Returns the asset kind at `path`, if one is tracked there.
    #[must_use]
    pub fn asset_kind(&self, path: &Path) -> Option<AssetKind> {
        self.assets.get(path).copied()
    }

    /// Returns `true` if an asset (file or directory) exists at `path`.
    #[must_use]
    pub fn has_asset(&self, path: &Path) -> bool {
        self.assets.contains_key(path)
    }

    /// Resolve a bare asset name to its full path, if exactly one tracked
    /// asset has that basename.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Path> {
        self.name_index.get(name).map(PathBuf::as_path)
    }

    /// Every tracked asset path, in arbitrary order.
    #[must_use]
    pub fn asset_paths(&self) -> Vec<&Path> {
        self.assets.keys().map(PathBuf::as_path).collect()
    }

    /// Every tracked directory path, in sorted order.
    #[must_use]
    pub fn directory_paths(&self) -> Vec<&Path> {
        self.directories.iter().map(PathBuf::as_path).collect()
    }

    /// The document path to read/write for an asset at `path`, given its
    /// kind: itself for a file asset, `path/.onyo-content.yaml` for a
    /// directory asset.
    #[must_use]
    pub fn content_path(path: &Path, kind: AssetKind) -> PathBuf {
        match kind {
            AssetKind::File => path.to_path_buf(),
            AssetKind::Directory => path.join(ASSET_DIRECTORY_CONTENT_FILE),
        }
    }
}

fn is_under_onyo_dir(path: &Path) -> bool {
    path.components().next().is_some_and(|c| c.as_os_str() == ".onyo")
}

#[cfg(test)]
mod tests {
    use super::*;
    use onyo_git::FakeGitAdapter;

    fn adapter_with(paths: &[&str]) -> FakeGitAdapter {
        let adapter = FakeGitAdapter::new(PathBuf::from("/repo"));
        for p in paths {
            adapter.write_file(Path::new(p), b"");
        }
        adapter
    }

    #[test]
    fn rebuild_indexes_file_assets() {
        let adapter = adapter_with(&["shelf/.anchor", "shelf/laptop_dell.abc123"]);
        let view = RepositoryView::rebuild(&adapter).unwrap();
        assert!(view.is_directory(Path::new("shelf")));
        assert_eq!(
            view.asset_kind(Path::new("shelf/laptop_dell.abc123")),
            Some(AssetKind::File)
        );
    }

    #[test]
    fn rebuild_indexes_directory_assets() {
        let adapter = adapter_with(&[
            "shelf/.anchor",
            "shelf/server_dell.xyz789/.onyo-content.yaml",
            "shelf/server_dell.xyz789/notes.txt",
        ]);
        let view = RepositoryView::rebuild(&adapter).unwrap();
        assert_eq!(
            view.asset_kind(Path::new("shelf/server_dell.xyz789")),
            Some(AssetKind::Directory)
        );
        assert!(!view.has_asset(Path::new("shelf/server_dell.xyz789/notes.txt")));
    }

    #[test]
    fn rebuild_ignores_onyo_directory() {
        let adapter = adapter_with(&[".onyo/config", "shelf/.anchor"]);
        let view = RepositoryView::rebuild(&adapter).unwrap();
        assert!(view.asset_paths().is_empty());
    }

    #[test]
    fn resolve_finds_asset_by_basename() {
        let adapter = adapter_with(&["shelf/.anchor", "shelf/laptop_dell.abc123"]);
        let view = RepositoryView::rebuild(&adapter).unwrap();
        assert_eq!(view.resolve("laptop_dell.abc123"), Some(Path::new("shelf/laptop_dell.abc123")));
    }

    #[test]
    fn content_path_for_file_and_directory() {
        assert_eq!(
            RepositoryView::content_path(Path::new("shelf/x"), AssetKind::File),
            PathBuf::from("shelf/x")
        );
        assert_eq!(
            RepositoryView::content_path(Path::new("shelf/x"), AssetKind::Directory),
            PathBuf::from("shelf/x/.onyo-content.yaml")
        );
    }
}
