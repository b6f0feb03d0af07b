//! Git porcelain mutations, run as `git` subprocesses.
//!
//! `gix` does not yet provide high-level, well-tested APIs for staging,
//! renaming, committing with full identity/trailer handling, or writing
//! config files — the same gap the teacher repo hit for `push`, where its
//! own `push_impl` falls back to shelling out rather than reimplementing
//! the smart-HTTP/SSH protocol on top of lower-level `gix` primitives. onyo
//! takes the same position for the working-tree mutations the `GitAdapter`
//! trait exposes: `git` itself remains the most correct implementation of
//! "stage this path" or "make a commit", so we invoke it directly.

use std::path::Path;
use std::process::{Command, Output};

use crate::error::GitError;
use crate::types::{AuthorIdentity, CommitTimestamp, ConfigScope, GitOid};

fn run(workdir: &Path, args: &[&str]) -> Result<Output, GitError> {
    Command::new("git")
        .arg("-C")
        .arg(workdir)
        .args(args)
        .output()
        .map_err(GitError::IoError)
}

fn run_checked(workdir: &Path, args: &[&str]) -> Result<Output, GitError> {
    let output = run(workdir, args)?;
    if output.status.success() {
        Ok(output)
    } else {
        Err(GitError::CommandFailed {
            args: args.join(" "),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

pub(crate) fn stage(workdir: &Path, path: &Path) -> Result<(), GitError> {
    run_checked(workdir, &["add", "--", &path.to_string_lossy()])?;
    Ok(())
}

pub(crate) fn rename(workdir: &Path, from: &Path, to: &Path) -> Result<(), GitError> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(workdir.join(parent))?;
    }
    run_checked(
        workdir,
        &["mv", "--", &from.to_string_lossy(), &to.to_string_lossy()],
    )?;
    Ok(())
}

pub(crate) fn remove(workdir: &Path, path: &Path) -> Result<(), GitError> {
    run_checked(
        workdir,
        &["rm", "-r", "--quiet", "--", &path.to_string_lossy()],
    )?;
    Ok(())
}

pub(crate) fn commit(
    workdir: &Path,
    message: &str,
    author: Option<&AuthorIdentity>,
    timestamp: Option<CommitTimestamp>,
) -> Result<GitOid, GitError> {
    let mut command = Command::new("git");
    command
        .arg("-C")
        .arg(workdir)
        .args(["commit", "--quiet", "--message", message]);

    if let Some(identity) = author {
        command
            .env("GIT_AUTHOR_NAME", &identity.name)
            .env("GIT_AUTHOR_EMAIL", &identity.email)
            .env("GIT_COMMITTER_NAME", &identity.name)
            .env("GIT_COMMITTER_EMAIL", &identity.email);
    }
    if let Some(ts) = timestamp {
        let date = ts.to_git_date();
        command
            .env("GIT_AUTHOR_DATE", &date)
            .env("GIT_COMMITTER_DATE", &date);
    }

    let output = command.output().map_err(GitError::IoError)?;
    if !output.status.success() {
        return Err(GitError::CommandFailed {
            args: "commit".to_owned(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let rev_output = run_checked(workdir, &["rev-parse", "HEAD"])?;
    let hex = String::from_utf8_lossy(&rev_output.stdout);
    hex.trim().parse().map_err(|e: crate::types::OidParseError| GitError::InvalidOid {
        value: e.value,
        reason: e.reason,
    })
}

pub(crate) fn config_get(
    workdir: &Path,
    key: &str,
    scope: ConfigScope,
) -> Result<Option<String>, GitError> {
    let output = run(workdir, &["config", scope.as_flag(), "--get", key])?;
    if output.status.success() {
        let value = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        Ok(Some(value))
    } else if output.status.code() == Some(1) {
        Ok(None)
    } else {
        Err(GitError::CommandFailed {
            args: format!("config {} --get {key}", scope.as_flag()),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

pub(crate) fn config_set(
    workdir: &Path,
    key: &str,
    value: &str,
    scope: ConfigScope,
) -> Result<(), GitError> {
    run_checked(workdir, &["config", scope.as_flag(), key, value])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_repo(dir: &Path) {
        Command::new("git")
            .args(["init", "--quiet"])
            .current_dir(dir)
            .status()
            .expect("git init");
        Command::new("git")
            .args(["config", "user.email", "test@example.com"])
            .current_dir(dir)
            .status()
            .expect("git config email");
        Command::new("git")
            .args(["config", "user.name", "Test"])
            .current_dir(dir)
            .status()
            .expect("git config name");
    }

    #[test]
    fn stage_and_commit_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        stage(dir.path(), Path::new("a.txt")).unwrap();
        let oid = commit(dir.path(), "add a.txt", None, None).unwrap();
        assert_eq!(oid.to_string().len(), 40);
    }

    #[test]
    fn commit_with_explicit_identity_and_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        stage(dir.path(), Path::new("a.txt")).unwrap();
        let identity = AuthorIdentity {
            name: "Jane Doe".to_owned(),
            email: "jane@example.com".to_owned(),
        };
        let ts = CommitTimestamp {
            seconds: 1_700_000_000,
            offset_minutes: 0,
        };
        commit(dir.path(), "deterministic commit", Some(&identity), Some(ts)).unwrap();
        let log = Command::new("git")
            .args(["-C"])
            .arg(dir.path())
            .args(["log", "-1", "--format=%an <%ae> %ad", "--date=unix"])
            .output()
            .unwrap();
        let line = String::from_utf8_lossy(&log.stdout);
        assert!(line.contains("Jane Doe <jane@example.com>"));
        assert!(line.contains("1700000000"));
    }

    #[test]
    fn config_get_missing_key_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        let value = config_get(dir.path(), "onyo.nonexistent", ConfigScope::Local).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn config_set_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        config_set(dir.path(), "onyo.history", "tig", ConfigScope::Local).unwrap();
        let value = config_get(dir.path(), "onyo.history", ConfigScope::Local).unwrap();
        assert_eq!(value.as_deref(), Some("tig"));
    }

    #[test]
    fn rename_moves_tracked_file() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        stage(dir.path(), Path::new("a.txt")).unwrap();
        commit(dir.path(), "add a.txt", None, None).unwrap();
        rename(dir.path(), Path::new("a.txt"), Path::new("b.txt")).unwrap();
        assert!(!dir.path().join("a.txt").exists());
        assert!(dir.path().join("b.txt").exists());
    }

    #[test]
    fn remove_deletes_tracked_file() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
        stage(dir.path(), Path::new("a.txt")).unwrap();
        commit(dir.path(), "add a.txt", None, None).unwrap();
        remove(dir.path(), Path::new("a.txt")).unwrap();
        assert!(!dir.path().join("a.txt").exists());
    }
}
