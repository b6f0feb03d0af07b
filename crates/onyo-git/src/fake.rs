//! An in-memory [`GitAdapter`] test double.
//!
//! Mirrors the structure of a real working tree closely enough for onyo's
//! transaction and query logic to be tested without spawning `git` at all:
//! a flat map of tracked paths to contents, a staging set, and a commit log.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::GitError;
use crate::repo::GitAdapter;
use crate::types::{AuthorIdentity, CommitTimestamp, ConfigScope, GitOid};

/// A recorded commit, for assertions in tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitRecord {
    /// The commit message passed to [`GitAdapter::commit`].
    pub message: String,
    /// The paths staged at the time of the commit.
    pub staged: Vec<PathBuf>,
}

#[derive(Default)]
struct State {
    files: BTreeMap<PathBuf, Vec<u8>>,
    staged: BTreeSet<PathBuf>,
    config: BTreeMap<(ConfigScope, String), String>,
    commits: Vec<CommitRecord>,
    next_oid_seed: u8,
}

/// A [`GitAdapter`] backed entirely by in-memory state.
///
/// `is_clean` reports `false` whenever the staging set is non-empty; callers
/// that want to simulate an always-dirty or always-clean tree can seed or
/// clear that set directly via [`FakeGitAdapter::write_file`] /
/// [`FakeGitAdapter::commit_log`].
pub struct FakeGitAdapter {
    root: PathBuf,
    state: Mutex<State>,
}

impl FakeGitAdapter {
    /// Create a fake adapter rooted at `root` with no tracked files.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            state: Mutex::new(State::default()),
        }
    }

    /// Seed a file's contents directly, as if it had been committed already.
    pub fn write_file(&self, path: &Path, contents: &[u8]) {
        let mut state = self.state.lock().expect("fake adapter state poisoned");
        state.files.insert(path.to_path_buf(), contents.to_vec());
    }

    /// Inspect the commit log recorded so far.
    #[must_use]
    pub fn commit_log(&self) -> Vec<CommitRecord> {
        self.state
            .lock()
            .expect("fake adapter state poisoned")
            .commits
            .clone()
    }

    fn next_oid(state: &mut State) -> GitOid {
        state.next_oid_seed = state.next_oid_seed.wrapping_add(1);
        let mut bytes = [0u8; 20];
        bytes[0] = state.next_oid_seed;
        GitOid::from_bytes(bytes)
    }
}

impl GitAdapter for FakeGitAdapter {
    fn open(&self, _start: &Path) -> Result<PathBuf, GitError> {
        Ok(self.root.clone())
    }

    fn list_tracked(&self) -> Result<Vec<PathBuf>, GitError> {
        let state = self.state.lock().expect("fake adapter state poisoned");
        Ok(state.files.keys().cloned().collect())
    }

    fn is_clean(&self) -> Result<bool, GitError> {
        let state = self.state.lock().expect("fake adapter state poisoned");
        Ok(state.staged.is_empty())
    }

    fn stage(&self, path: &Path) -> Result<(), GitError> {
        let mut state = self.state.lock().expect("fake adapter state poisoned");
        state.staged.insert(path.to_path_buf());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), GitError> {
        let mut state = self.state.lock().expect("fake adapter state poisoned");
        let contents = state.files.remove(from).ok_or_else(|| GitError::NotFound {
            message: format!("{}", from.display()),
        })?;
        state.files.insert(to.to_path_buf(), contents);
        state.staged.remove(from);
        state.staged.insert(to.to_path_buf());
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), GitError> {
        let mut state = self.state.lock().expect("fake adapter state poisoned");
        state.files.remove(path).ok_or_else(|| GitError::NotFound {
            message: format!("{}", path.display()),
        })?;
        state.staged.insert(path.to_path_buf());
        Ok(())
    }

    fn commit(
        &self,
        message: &str,
        _author: Option<&AuthorIdentity>,
        _timestamp: Option<CommitTimestamp>,
    ) -> Result<GitOid, GitError> {
        let mut state = self.state.lock().expect("fake adapter state poisoned");
        let staged: Vec<PathBuf> = state.staged.iter().cloned().collect();
        state.commits.push(CommitRecord {
            message: message.to_owned(),
            staged,
        });
        state.staged.clear();
        Ok(Self::next_oid(&mut state))
    }

    fn read_blob(&self, path: &Path) -> Result<Vec<u8>, GitError> {
        let state = self.state.lock().expect("fake adapter state poisoned");
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| GitError::NotFound {
                message: format!("{}", path.display()),
            })
    }

    fn config_get(&self, key: &str, scope: ConfigScope) -> Result<Option<String>, GitError> {
        let state = self.state.lock().expect("fake adapter state poisoned");
        Ok(state.config.get(&(scope, key.to_owned())).cloned())
    }

    fn config_set(&self, key: &str, value: &str, scope: ConfigScope) -> Result<(), GitError> {
        let mut state = self.state.lock().expect("fake adapter state poisoned");
        state.config.insert((scope, key.to_owned()), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_fake_is_clean_and_empty() {
        let fake = FakeGitAdapter::new(PathBuf::from("/repo"));
        assert!(fake.is_clean().unwrap());
        assert!(fake.list_tracked().unwrap().is_empty());
    }

    #[test]
    fn stage_and_commit_roundtrip() {
        let fake = FakeGitAdapter::new(PathBuf::from("/repo"));
        fake.write_file(Path::new("a.txt"), b"hello");
        fake.stage(Path::new("a.txt")).unwrap();
        assert!(!fake.is_clean().unwrap());
        fake.commit("add a.txt", None, None).unwrap();
        assert!(fake.is_clean().unwrap());
        let log = fake.commit_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].message, "add a.txt");
        assert_eq!(log[0].staged, vec![PathBuf::from("a.txt")]);
    }

    #[test]
    fn rename_moves_contents_and_keeps_staged() {
        let fake = FakeGitAdapter::new(PathBuf::from("/repo"));
        fake.write_file(Path::new("a.txt"), b"hello");
        fake.rename(Path::new("a.txt"), Path::new("b.txt")).unwrap();
        assert_eq!(fake.read_blob(Path::new("b.txt")).unwrap(), b"hello");
        assert!(fake.read_blob(Path::new("a.txt")).is_err());
    }

    #[test]
    fn remove_missing_path_is_not_found() {
        let fake = FakeGitAdapter::new(PathBuf::from("/repo"));
        assert!(matches!(
            fake.remove(Path::new("missing.txt")),
            Err(GitError::NotFound { .. })
        ));
    }

    #[test]
    fn config_set_then_get_round_trips() {
        let fake = FakeGitAdapter::new(PathBuf::from("/repo"));
        fake.config_set("onyo.history", "tig", ConfigScope::Local).unwrap();
        assert_eq!(
            fake.config_get("onyo.history", ConfigScope::Local).unwrap().as_deref(),
            Some("tig")
        );
        assert_eq!(fake.config_get("onyo.history", ConfigScope::Global).unwrap(), None);
    }
}
