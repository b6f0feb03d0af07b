//! The `gix`-backed half of [`GitAdapter`]: everything that only reads.
//!
//! Mutations (`stage`, `rename`, `remove`, `commit`, `config_set`) live in
//! [`crate::cli_adapter`] instead — see its module doc for why.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GitError;
use crate::types::GitOid;

/// A [`GitAdapter`](crate::GitAdapter) implementation backed by
/// [gix](https://github.com/GitoxideLabs/gitoxide) for reads, and a `git`
/// subprocess ([`crate::cli_adapter`]) for mutations.
///
/// Construct via [`GixGitAdapter::open`].
pub struct GixGitAdapter {
    pub(crate) repo: gix::Repository,
    pub(crate) workdir: PathBuf,
}

impl GixGitAdapter {
    /// Open the repository at or above `start`.
    ///
    /// Returns [`GitError::NotAWorkingTree`] if no working tree is found
    /// (including the case where the discovered repository is bare — onyo
    /// always needs a place on disk to put assets).
    pub fn open(start: &Path) -> Result<Self, GitError> {
        let repo =
            gix::discover(start).map_err(|e| GitError::BackendError { message: e.to_string() })?;
        let workdir = repo.workdir().map(Path::to_path_buf).ok_or_else(|| {
            GitError::NotAWorkingTree {
                path: start.to_path_buf(),
            }
        })?;
        Ok(Self { repo, workdir })
    }

    /// The repository's working tree root.
    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub(crate) fn list_tracked(&self) -> Result<Vec<PathBuf>, GitError> {
        let index = self
            .repo
            .index_or_empty()
            .map_err(|e| GitError::BackendError {
                message: format!("failed to read index: {e}"),
            })?;
        let mut paths: Vec<PathBuf> = index
            .entries()
            .iter()
            .map(|entry| PathBuf::from(entry.path(&index).to_string()))
            .collect();
        paths.sort();
        Ok(paths)
    }

    pub(crate) fn is_clean(&self) -> Result<bool, GitError> {
        let status = self
            .repo
            .status(gix::progress::Discard)
            .map_err(|e| GitError::BackendError {
                message: format!("failed to start status walk: {e}"),
            })?;
        let mut iter = status
            .into_iter(None)
            .map_err(|e| GitError::BackendError {
                message: format!("failed to walk status: {e}"),
            })?;
        match iter.next() {
            None => Ok(true),
            Some(Ok(_)) => Ok(false),
            Some(Err(e)) => Err(GitError::BackendError {
                message: format!("status walk entry failed: {e}"),
            }),
        }
    }

    pub(crate) fn read_blob(&self, path: &Path) -> Result<Vec<u8>, GitError> {
        let full = self.workdir.join(path);
        fs::read(&full).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GitError::NotFound {
                    message: format!("{}", full.display()),
                }
            } else {
                GitError::IoError(e)
            }
        })
    }

}

impl crate::repo::GitAdapter for GixGitAdapter {
    fn open(&self, start: &Path) -> Result<PathBuf, GitError> {
        let _ = start;
        Ok(self.workdir.clone())
    }

    fn list_tracked(&self) -> Result<Vec<PathBuf>, GitError> {
        Self::list_tracked(self)
    }

    fn is_clean(&self) -> Result<bool, GitError> {
        Self::is_clean(self)
    }

    fn stage(&self, path: &Path) -> Result<(), GitError> {
        crate::cli_adapter::stage(&self.workdir, path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), GitError> {
        crate::cli_adapter::rename(&self.workdir, from, to)
    }

    fn remove(&self, path: &Path) -> Result<(), GitError> {
        crate::cli_adapter::remove(&self.workdir, path)
    }

    fn commit(
        &self,
        message: &str,
        author: Option<&crate::types::AuthorIdentity>,
        timestamp: Option<crate::types::CommitTimestamp>,
    ) -> Result<GitOid, GitError> {
        crate::cli_adapter::commit(&self.workdir, message, author, timestamp)
    }

    fn read_blob(&self, path: &Path) -> Result<Vec<u8>, GitError> {
        Self::read_blob(self, path)
    }

    fn config_get(
        &self,
        key: &str,
        scope: crate::types::ConfigScope,
    ) -> Result<Option<String>, GitError> {
        crate::cli_adapter::config_get(&self.workdir, key, scope)
    }

    fn config_set(
        &self,
        key: &str,
        value: &str,
        scope: crate::types::ConfigScope,
    ) -> Result<(), GitError> {
        crate::cli_adapter::config_set(&self.workdir, key, value, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_repo(dir: &Path) {
        std::process::Command::new("git")
            .args(["init", "--quiet"])
            .current_dir(dir)
            .status()
            .expect("git init");
        std::process::Command::new("git")
            .args(["config", "user.email", "test@example.com"])
            .current_dir(dir)
            .status()
            .expect("git config email");
        std::process::Command::new("git")
            .args(["config", "user.name", "Test"])
            .current_dir(dir)
            .status()
            .expect("git config name");
    }

    #[test]
    fn open_rejects_non_repo_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GixGitAdapter::open(dir.path()).is_err());
    }

    #[test]
    fn open_finds_workdir_of_fresh_repo() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        let adapter = GixGitAdapter::open(dir.path()).unwrap();
        assert_eq!(
            adapter.workdir().canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn fresh_repo_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        let adapter = GixGitAdapter::open(dir.path()).unwrap();
        assert!(adapter.is_clean().unwrap());
    }

    #[test]
    fn untracked_file_makes_repo_dirty() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        let adapter = GixGitAdapter::open(dir.path()).unwrap();
        assert!(!adapter.is_clean().unwrap());
    }

    #[test]
    fn read_blob_returns_working_tree_contents() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        let adapter = GixGitAdapter::open(dir.path()).unwrap();
        let contents = adapter.read_blob(Path::new("a.txt")).unwrap();
        assert_eq!(contents, b"hello");
    }

    #[test]
    fn read_blob_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        let adapter = GixGitAdapter::open(dir.path()).unwrap();
        assert!(matches!(
            adapter.read_blob(Path::new("missing.txt")),
            Err(GitError::NotFound { .. })
        ));
    }
}
