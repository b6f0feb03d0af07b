//! The [`GitAdapter`] trait — the single abstraction boundary between onyo
//! and git.
//!
//! Every crate in this workspace interacts with git exclusively through this
//! trait. It is object-safe so callers can use `&dyn GitAdapter` or
//! `Box<dyn GitAdapter>`, and narrow by design: onyo never rewrites history,
//! never rebases, never manages branches or remotes on the caller's behalf.
//! It stages paths, inspects cleanliness, reads blobs, and writes commits.

use std::path::{Path, PathBuf};

use crate::error::GitError;
use crate::types::{AuthorIdentity, CommitTimestamp, ConfigScope, GitOid};

/// The git abstraction trait used by the rest of onyo.
///
/// Implementations may be backed by `gix` (read-heavy operations), a `git`
/// CLI subprocess (porcelain mutations), or a test double ([`FakeGitAdapter`](crate::FakeGitAdapter)).
///
/// # Object safety
///
/// This trait is object-safe: no generic methods, no `Self` in return
/// position outside of `Result`.
pub trait GitAdapter {
    /// Open (or locate) the repository rooted at or above `start`.
    ///
    /// Returns [`GitError::NotAWorkingTree`] if `start` is not inside a git
    /// working tree, or if the located repository is bare.
    fn open(&self, start: &Path) -> Result<PathBuf, GitError>;

    /// List every path tracked by git under the working tree, relative to
    /// the repository root.
    ///
    /// Replaces: `git ls-files`.
    fn list_tracked(&self) -> Result<Vec<PathBuf>, GitError>;

    /// Return `true` if the working tree and index have no uncommitted
    /// changes (no staged, unstaged, or untracked files).
    ///
    /// Replaces: `git status --porcelain` with an emptiness check.
    fn is_clean(&self) -> Result<bool, GitError>;

    /// Stage a path (or all paths under a directory) for the next commit.
    ///
    /// Replaces: `git add <path>`.
    fn stage(&self, path: &Path) -> Result<(), GitError>;

    /// Record a rename from `from` to `to` in the index, preserving history
    /// linkage where git's similarity heuristic allows it.
    ///
    /// Replaces: `git mv <from> <to>`.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), GitError>;

    /// Remove a path from the working tree and stage the removal.
    ///
    /// Replaces: `git rm -r <path>`.
    fn remove(&self, path: &Path) -> Result<(), GitError>;

    /// Create a commit from the current index contents.
    ///
    /// `author` overrides git's identity resolution when present.
    /// `timestamp` overrides the current time when present (used by tests
    /// for deterministic commit metadata).
    ///
    /// Replaces: `git commit -m <message>`.
    fn commit(
        &self,
        message: &str,
        author: Option<&AuthorIdentity>,
        timestamp: Option<CommitTimestamp>,
    ) -> Result<GitOid, GitError>;

    /// Read the contents of a blob at `path` as it exists in the working
    /// tree (not a historical revision).
    ///
    /// Replaces: reading the file directly, kept behind this trait so a test
    /// double can serve content that was never written to disk.
    fn read_blob(&self, path: &Path) -> Result<Vec<u8>, GitError>;

    /// Read a git config value at a given scope. Returns `None` if unset at
    /// that scope (callers wanting the merged view call this once per scope,
    /// narrowest first).
    ///
    /// Replaces: `git config --get --<scope> <key>`.
    fn config_get(&self, key: &str, scope: ConfigScope) -> Result<Option<String>, GitError>;

    /// Set a git config value at a given scope.
    ///
    /// Replaces: `git config --<scope> <key> <value>`.
    fn config_set(&self, key: &str, value: &str, scope: ConfigScope) -> Result<(), GitError>;
}
