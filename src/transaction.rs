//! The Transaction Engine: a batch of [`crate::operation::Operation`]s
//! validated against an in-memory [`Overlay`] and committed atomically.
//!
//! State machine: `Open` accepts pushes; a push whose pre/postconditions
//! fail moves the transaction to `Rejected` and the whole batch is
//! abandoned — nothing reaches disk. A successful [`Transaction::commit`]
//! moves it to `Committed`; dropping an `Open` transaction without
//! committing is `Abandoned`, a silent no-op (mirrors the teacher's own
//! append-only log: nothing is written until the final, single commit
//! step).

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use onyo_git::GitAdapter;

use crate::commit_message::compose_message;
use crate::error::OnyoError;
use crate::model::name::NameTemplate;
use crate::model::value::Value;
use crate::operation::Operation;
use crate::view::{AssetKind, RepositoryView, ASSET_DIRECTORY_CONTENT_FILE};
use crate::yaml::document::Document;
use crate::yaml::patch::Patch;

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct OverlayAsset {
    kind: AssetKind,
    document: Document,
}

/// An in-memory, copy-on-write projection of the repository's tracked
/// structure, mutated by pushing [`Operation`]s and diffed against the
/// originating [`RepositoryView`] at commit time.
#[derive(Clone, Debug, Default)]
pub struct Overlay {
    directories: BTreeSet<PathBuf>,
    assets: HashMap<PathBuf, OverlayAsset>,
}

impl Overlay {
    /// Snapshot a [`RepositoryView`] into a mutable overlay. Pre-existing
    /// asset documents are loaded lazily via [`Overlay::load_asset`] before
    /// an operation that needs their body (`modify-asset`, `rename-asset`);
    /// until then they're present with an empty document, sufficient for
    /// existence and collision checks.
    #[must_use]
    pub fn from_view(view: &RepositoryView) -> Self {
        let mut directories = BTreeSet::new();
        for d in view.directory_paths() {
            directories.insert(d.to_path_buf());
        }
        let mut assets = HashMap::new();
        for path in view.asset_paths() {
            if let Some(kind) = view.asset_kind(path) {
                assets.insert(path.to_path_buf(), OverlayAsset { kind, document: Document::empty() });
            }
        }
        Self { directories, assets }
    }

    /// Load an existing asset's document content from the git adapter,
    /// replacing any placeholder entry. Call before pushing `modify-asset`
    /// or `rename-asset` against a pre-existing asset.
    ///
    /// # Errors
    /// Returns [`OnyoError::MalformedDocument`] if the stored content is not
    /// valid YAML, or propagates the adapter's read error.
    pub fn load_asset(&mut self, path: &Path, git: &dyn GitAdapter) -> Result<(), OnyoError> {
        let Some(kind) = self.assets.get(path).map(|a| a.kind) else {
            return Err(OnyoError::NoSuchAsset { path: path.to_owned() });
        };
        let content_path = RepositoryView::content_path(path, kind);
        let bytes = git.read_blob(&content_path)?;
        let text = String::from_utf8_lossy(&bytes);
        let document = Document::load(&text).map_err(|e| OnyoError::MalformedDocument {
            path: content_path,
            detail: e.to_string(),
        })?;
        self.assets.insert(path.to_owned(), OverlayAsset { kind, document });
        Ok(())
    }

    #[must_use]
    pub fn has_directory(&self, path: &Path) -> bool {
        self.directories.contains(path)
    }

    #[must_use]
    pub fn has_asset(&self, path: &Path) -> bool {
        self.assets.contains_key(path)
    }

    #[must_use]
    pub fn asset_kind(&self, path: &Path) -> Option<AssetKind> {
        self.assets.get(path).map(|a| a.kind)
    }

    pub fn insert_directory(&mut self, path: &Path) {
        self.directories.insert(path.to_owned());
    }

    /// Check a directory exists; the standard `NoSuchDirectory` precondition.
    ///
    /// # Errors
    /// Returns [`OnyoError::NoSuchDirectory`] if `path` is not tracked.
    pub fn require_directory(&self, path: &Path) -> Result<(), OnyoError> {
        if self.has_directory(path) {
            Ok(())
        } else {
            Err(OnyoError::NoSuchDirectory { path: path.to_owned() })
        }
    }

    /// Fetch the asset at `path` as a [`crate::model::asset::Asset`], for
    /// invariant checks. The `NoSuchAsset` precondition.
    ///
    /// # Errors
    /// Returns [`OnyoError::NoSuchAsset`] if `path` is not tracked, or a
    /// name-validation error if the basename doesn't parse (should not
    /// happen for a previously-accepted path).
    pub fn require_asset(
        &self,
        path: &Path,
        template: &NameTemplate,
    ) -> Result<crate::model::asset::Asset, OnyoError> {
        let entry = self.assets.get(path).ok_or_else(|| OnyoError::NoSuchAsset { path: path.to_owned() })?;
        let body = entry.document.to_value_map();
        crate::model::asset::Asset::from_path_and_body(path, body, template, entry.kind == AssetKind::Directory)
            .map_err(|e| OnyoError::InvalidAssetName { name: path.display().to_string(), clause: e.reason })
    }

    /// Insert a newly created asset, writing its bound fields into the body.
    ///
    /// # Errors
    /// Returns a name-validation error if `path`'s basename doesn't parse
    /// against `template`.
    pub fn insert_asset(
        &mut self,
        path: &Path,
        kind: AssetKind,
        body: indexmap::IndexMap<String, Value>,
        template: &NameTemplate,
    ) -> Result<(), OnyoError> {
        let asset = crate::model::asset::Asset::from_path_and_body(path, body, template, kind == AssetKind::Directory)
            .map_err(|e| OnyoError::InvalidAssetName { name: path.display().to_string(), clause: e.reason })?
            .with_bound_fields_written();
        let document = Document {
            leading_comments: Vec::new(),
            root: crate::yaml::document::value_map_to_entries(asset.body),
        };
        self.assets.insert(path.to_owned(), OverlayAsset { kind, document });
        Ok(())
    }

    /// Apply a patch to an existing asset's document, preserving comments
    /// and quote style on untouched keys.
    ///
    /// # Errors
    /// Returns [`OnyoError::TransactionRejected`] if the patch targets a
    /// dotted key through a non-mapping intermediate.
    pub fn patch_asset(&mut self, path: &Path, patch: &Patch) -> Result<(), OnyoError> {
        let entry = self.assets.get_mut(path).ok_or_else(|| OnyoError::NoSuchAsset { path: path.to_owned() })?;
        let new_root = crate::yaml::patch::apply_patch(&entry.document.root, patch)
            .map_err(|e| OnyoError::TransactionRejected { violation: e.to_string() })?;
        entry.document.root = new_root;
        Ok(())
    }

    /// Rename an asset in place, rewriting its bound-field values from the
    /// new basename.
    ///
    /// # Errors
    /// Returns a name-validation error if `to`'s basename doesn't parse.
    pub fn rename_asset(&mut self, from: &Path, to: &Path, template: &NameTemplate) -> Result<(), OnyoError> {
        let Some(mut entry) = self.assets.remove(from) else {
            return Err(OnyoError::NoSuchAsset { path: from.to_owned() });
        };
        let new_fields = template.parse_name(&basename(to)).map_err(|e| OnyoError::InvalidAssetName {
            name: basename(to),
            clause: e.reason,
        })?;
        for (key, value) in new_fields {
            entry.document.root.insert(
                key,
                crate::yaml::document::DocEntry::new(crate::yaml::document::DocValue::from_value(Value::String(value))),
            );
        }
        self.assets.insert(to.to_owned(), entry);
        Ok(())
    }

    #[must_use]
    pub fn directory_has_contents(&self, dir: &Path) -> bool {
        self.directories.iter().any(|d| d != dir && d.starts_with(dir))
            || self.assets.keys().any(|a| a.starts_with(dir) && a != dir)
    }

    pub fn remove_asset(&mut self, path: &Path) {
        self.assets.remove(path);
    }

    pub fn remove_directory(&mut self, path: &Path) {
        self.directories.retain(|d| d != path && !d.starts_with(path));
        self.assets.retain(|a, _| !a.starts_with(path));
    }

    pub fn rename_directory(&mut self, from: &Path, to: &Path) {
        let dirs: Vec<PathBuf> = self.directories.iter().filter(|d| d.starts_with(from)).cloned().collect();
        for d in dirs {
            self.directories.remove(&d);
            self.directories.insert(relocate(&d, from, to));
        }
        let assets: Vec<PathBuf> = self.assets.keys().filter(|a| a.starts_with(from)).cloned().collect();
        for a in assets {
            if let Some(entry) = self.assets.remove(&a) {
                self.assets.insert(relocate(&a, from, to), entry);
            }
        }
    }

    pub fn set_asset_kind(&mut self, path: &Path, kind: AssetKind) {
        if let Some(entry) = self.assets.get_mut(path) {
            entry.kind = kind;
        }
    }
}

fn relocate(path: &Path, from: &Path, to: &Path) -> PathBuf {
    let suffix = path.strip_prefix(from).unwrap_or(path);
    to.join(suffix)
}

fn basename(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A transaction's lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionState {
    /// Accepting pushes.
    Open,
    /// A pushed operation violated a precondition; the whole batch is dead.
    Rejected,
    /// Committed to git.
    Committed,
    /// Dropped without committing.
    Abandoned,
}

/// A batch of operations applied atomically against the repository.
pub struct Transaction<'a> {
    git: &'a dyn GitAdapter,
    template: NameTemplate,
    overlay: Overlay,
    ops: Vec<Operation>,
    state: TransactionState,
}

impl<'a> Transaction<'a> {
    /// Open a transaction over the given view.
    #[must_use]
    pub fn open(git: &'a dyn GitAdapter, view: &RepositoryView, template: NameTemplate) -> Self {
        Self {
            git,
            template,
            overlay: Overlay::from_view(view),
            ops: Vec::new(),
            state: TransactionState::Open,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> TransactionState {
        self.state
    }

    /// Access the overlay, e.g. to call [`Overlay::load_asset`] before
    /// pushing an operation that needs a pre-existing asset's body.
    pub fn overlay_mut(&mut self) -> &mut Overlay {
        &mut self.overlay
    }

    /// Validate and apply `op` against the current overlay.
    ///
    /// On failure the transaction moves to [`TransactionState::Rejected`]
    /// and no further pushes are accepted; the caller should discard it and
    /// report the error without having touched disk.
    ///
    /// # Errors
    /// Returns the operation's first violated precondition.
    pub fn push(&mut self, op: Operation) -> Result<(), OnyoError> {
        if self.state != TransactionState::Open {
            return Err(OnyoError::TransactionRejected {
                violation: "transaction is no longer open".to_owned(),
            });
        }
        match op.apply(&mut self.overlay, &self.template) {
            Ok(()) => {
                self.ops.push(op);
                Ok(())
            }
            Err(e) => {
                self.state = TransactionState::Rejected;
                Err(e)
            }
        }
    }

    /// Commit every pushed operation in one git commit.
    ///
    /// Algorithm: re-verify the global bound-fields invariant across the
    /// overlay, serialise every touched document, apply filesystem
    /// operations in the fixed order create-dirs, writes, renames, removes,
    /// stage everything, and commit with a composed message. On any
    /// filesystem-stage failure, already-staged changes are left staged but
    /// uncommitted — the caller should treat that as a fatal error requiring
    /// `git reset --hard` to recover, since onyo makes no further writes
    /// past that point.
    ///
    /// If every pushed operation is a `modify-asset` whose patch leaves the
    /// document byte-for-byte unchanged (e.g. `set` assigning a key to its
    /// current value), nothing is written or staged and `Ok(None)` is
    /// returned instead of creating an empty commit.
    ///
    /// # Errors
    /// Returns [`OnyoError::TransactionRejected`] if the transaction isn't
    /// `Open`, or propagates I/O/git errors encountered while writing.
    pub fn commit(
        mut self,
        root: &Path,
        subject_override: Option<&str>,
        auto_message: bool,
    ) -> Result<Option<onyo_git::GitOid>, OnyoError> {
        if self.state != TransactionState::Open {
            return Err(OnyoError::TransactionRejected {
                violation: "cannot commit a transaction that is not open".to_owned(),
            });
        }
        if self.ops.is_empty() {
            return Err(OnyoError::TransactionRejected {
                violation: "no operations were pushed".to_owned(),
            });
        }

        for path in self.overlay.assets.keys().cloned().collect::<Vec<_>>() {
            let kind = self.overlay.assets[&path].kind;
            let asset = crate::model::asset::Asset::from_path_and_body(
                &path,
                self.overlay.assets[&path].document.to_value_map(),
                &self.template,
                kind == AssetKind::Directory,
            )
            .map_err(|e| OnyoError::InvalidAssetName { name: path.display().to_string(), clause: e.reason })?;
            if !asset.bound_fields_match_body() {
                return Err(OnyoError::TransactionRejected {
                    violation: format!("'{}': bound fields do not match document body", path.display()),
                });
            }
        }

        if self.is_no_op()? {
            self.state = TransactionState::Committed;
            return Ok(None);
        }

        for op in &self.ops {
            apply_fs_create(op, root)?;
        }
        // Renames/moves must land on disk before the write pass, since a
        // rename's updated bound-field body is written at the *destination*
        // path (`Overlay::rename_asset` already rewrote it in memory).
        for op in &self.ops {
            apply_fs_rename(op, self.git)?;
        }
        for op in &self.ops {
            apply_fs_convert(op, root, &self.overlay)?;
        }
        for op in &self.ops {
            apply_fs_write(op, root, &self.overlay)?;
        }
        for op in &self.ops {
            apply_fs_remove(op, root, self.git)?;
        }

        for op in &self.ops {
            stage_touched_paths(op, &self.overlay, self.git)?;
        }

        let message = compose_message(&self.ops, subject_override, auto_message);
        let oid = self.git.commit(&message, None, None)?;
        self.state = TransactionState::Committed;
        Ok(Some(oid))
    }

    /// `true` if every pushed operation is a `modify-asset` whose resulting
    /// document is byte-identical to what's currently tracked, meaning this
    /// commit would stage no actual content change.
    fn is_no_op(&self) -> Result<bool, OnyoError> {
        for op in &self.ops {
            let Operation::ModifyAsset { path, .. } = op else {
                return Ok(false);
            };
            let Some(asset) = self.overlay.assets.get(path) else {
                return Ok(false);
            };
            let content_path = RepositoryView::content_path(path, asset.kind);
            let original = self.git.read_blob(&content_path)?;
            if original != asset.document.dump() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.state == TransactionState::Open {
            self.state = TransactionState::Abandoned;
        }
    }
}

fn apply_fs_create(op: &Operation, root: &Path) -> Result<(), OnyoError> {
    match op {
        Operation::NewDirectory { path } => {
            std::fs::create_dir_all(root.join(path))?;
            std::fs::write(root.join(path).join(crate::view::ANCHOR_FILE), b"")?;
        }
        Operation::NewAsset { path, is_directory, .. } if *is_directory => {
            std::fs::create_dir_all(root.join(path))?;
        }
        _ => {}
    }
    Ok(())
}

/// Handle `convert-to-asset-dir`/`convert-from-asset-dir`: relocate the
/// document between a plain file and a directory's reserved content file.
fn apply_fs_convert(op: &Operation, root: &Path, overlay: &Overlay) -> Result<(), OnyoError> {
    match op {
        Operation::ConvertToAssetDirectory { path } => {
            let old_file = root.join(path);
            let new_dir = root.join(path);
            let _ = std::fs::remove_file(&old_file);
            std::fs::create_dir_all(&new_dir)?;
            if let Some(asset) = overlay.assets.get(path) {
                std::fs::write(new_dir.join(ASSET_DIRECTORY_CONTENT_FILE), asset.document.dump())?;
            }
        }
        Operation::ConvertFromAssetDirectory { path } => {
            let old_dir = root.join(path);
            if let Some(asset) = overlay.assets.get(path) {
                let contents = asset.document.dump();
                let _ = std::fs::remove_dir_all(&old_dir);
                std::fs::write(root.join(path), contents)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Write the overlay's current document to disk for an operation that leaves
/// a body behind. `NewAsset`/`ModifyAsset` write at their own path;
/// `RenameAsset`/`MoveAsset` write at the *destination* path, since
/// `Overlay::rename_asset` already rewrote the bound fields into the body
/// there — the file must carry that update, not the stale body `git mv`
/// relocated.
fn apply_fs_write(op: &Operation, root: &Path, overlay: &Overlay) -> Result<(), OnyoError> {
    let path = match op {
        Operation::NewAsset { path, .. } | Operation::ModifyAsset { path, .. } => Some(path.clone()),
        Operation::RenameAsset { to, .. } => Some(to.clone()),
        Operation::MoveAsset { from, to_dir } => {
            let name = from.file_name().map(PathBuf::from).unwrap_or_default();
            Some(to_dir.join(name))
        }
        _ => None,
    };
    if let Some(path) = path {
        if let Some(asset) = overlay.assets.get(&path) {
            let content_path = RepositoryView::content_path(&path, asset.kind);
            let full = root.join(&content_path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(full, asset.document.dump())?;
        }
    }
    Ok(())
}

fn apply_fs_rename(op: &Operation, git: &dyn GitAdapter) -> Result<(), OnyoError> {
    match op {
        Operation::RenameAsset { from, to } => {
            git.rename(from, to)?;
        }
        Operation::MoveAsset { from, to_dir } => {
            let name = from.file_name().map(PathBuf::from).unwrap_or_default();
            git.rename(from, &to_dir.join(name))?;
        }
        Operation::MoveDirectory { from, to_dir } => {
            let name = from.file_name().map(PathBuf::from).unwrap_or_default();
            git.rename(from, &to_dir.join(name))?;
        }
        _ => {}
    }
    Ok(())
}

fn apply_fs_remove(op: &Operation, root: &Path, git: &dyn GitAdapter) -> Result<(), OnyoError> {
    match op {
        Operation::RemoveAsset { path } => {
            let _ = std::fs::remove_file(root.join(path));
            git.remove(path)?;
        }
        Operation::RemoveDirectory { path, .. } => {
            let _ = std::fs::remove_dir_all(root.join(path));
            git.remove(path)?;
        }
        _ => {}
    }
    Ok(())
}

fn stage_touched_paths(op: &Operation, overlay: &Overlay, git: &dyn GitAdapter) -> Result<(), OnyoError> {
    match op {
        Operation::NewDirectory { path } => git.stage(&path.join(crate::view::ANCHOR_FILE))?,
        Operation::NewAsset { path, is_directory, .. } => {
            let kind = if *is_directory { AssetKind::Directory } else { AssetKind::File };
            git.stage(&RepositoryView::content_path(path, kind))?;
        }
        Operation::ModifyAsset { path, .. } => git.stage(path)?,
        Operation::ConvertToAssetDirectory { path } => {
            git.stage(&path.join(ASSET_DIRECTORY_CONTENT_FILE))?;
        }
        Operation::ConvertFromAssetDirectory { path } => git.stage(path)?,
        Operation::RenameAsset { to, .. } => stage_rewritten_asset(to, overlay, git)?,
        Operation::MoveAsset { from, to_dir } => {
            let name = from.file_name().map(PathBuf::from).unwrap_or_default();
            stage_rewritten_asset(&to_dir.join(name), overlay, git)?;
        }
        Operation::MoveDirectory { .. } | Operation::RemoveAsset { .. } | Operation::RemoveDirectory { .. } => {}
    }
    Ok(())
}

/// `git mv` already stages the rename itself; this additionally stages the
/// rewritten body `apply_fs_write` put at the destination, since that's a
/// content change `git mv` has no way to know about.
fn stage_rewritten_asset(to: &Path, overlay: &Overlay, git: &dyn GitAdapter) -> Result<(), OnyoError> {
    if let Some(asset) = overlay.assets.get(to) {
        git.stage(&RepositoryView::content_path(to, asset.kind))?;
    }
    Ok(())
}
