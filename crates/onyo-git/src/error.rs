//! Error types for git operations.
//!
//! [`GitError`] is the single error type returned by every [`GitAdapter`](crate::GitAdapter)
//! method. Rich variants let callers match on specific failure modes (missing
//! object, dirty worktree, a failed subprocess) without parsing messages.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`GitAdapter`](crate::GitAdapter) operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// A requested object, ref, or path was not found.
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable description of what was missing.
        message: String,
    },

    /// A command was run outside of a git working tree, or the located
    /// repository is bare (onyo requires a working tree to place assets in).
    #[error("not a git working tree: {}", path.display())]
    NotAWorkingTree {
        /// The path that was checked.
        path: PathBuf,
    },

    /// An operation that requires a clean tree was attempted while the
    /// worktree has uncommitted changes.
    #[error("dirty worktree at {}: {message}", path.display())]
    DirtyWorktree {
        /// Path to the worktree root.
        path: PathBuf,
        /// What was dirty (untracked files, staged changes, etc.).
        message: String,
    },

    /// An OID string could not be parsed or was otherwise invalid.
    #[error("invalid OID `{value}`: {reason}")]
    InvalidOid {
        /// The raw value that failed validation.
        value: String,
        /// Why validation failed.
        reason: String,
    },

    /// An I/O error occurred (file system, process spawn, etc.).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A `git` subprocess exited with a non-zero status.
    #[error("`git {args}` failed (exit {status}): {stderr}")]
    CommandFailed {
        /// The arguments passed to `git`, joined with spaces, for diagnostics.
        args: String,
        /// The process exit status, or `-1` if it was terminated by a signal.
        status: i32,
        /// Captured standard error output.
        stderr: String,
    },

    /// A config key lookup found nothing at any scope that was consulted.
    #[error("config key `{key}` is not set")]
    ConfigKeyNotSet {
        /// The key that was looked up (e.g. `"onyo.history"`).
        key: String,
    },

    /// The underlying git backend (`gix`, the `git` CLI) returned an
    /// unclassified error.
    ///
    /// Catch-all for failures that don't fit other variants; `message` should
    /// include enough context to diagnose the failure.
    #[error("git backend error: {message}")]
    BackendError {
        /// Freeform error description from the backend.
        message: String,
    },
}
