//! Error types for onyo.
//!
//! Defines [`OnyoError`], the unified error type for every operation in the
//! crate. Error messages are designed to be agent-friendly: each variant
//! describes what went wrong and gives actionable guidance on how to fix it.
//!
//! Variants mirror the error kinds named in the command surface's error
//! handling design, not any underlying version-control vocabulary — a
//! `DirtyWorkingTree` is onyo's own abort condition, not a passthrough of
//! whatever the git adapter happened to say.

use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// OnyoError
// ---------------------------------------------------------------------------

/// Unified error type for onyo operations.
///
/// Each variant is self-contained: a caller receiving this error should be
/// able to understand what happened and what to do next without additional
/// context.
#[derive(Debug)]
pub enum OnyoError {
    /// The given path is not inside an onyo/git repository.
    NotARepository {
        /// The path that was searched from.
        path: PathBuf,
    },

    /// `init` was run against a directory that is already a repository.
    AlreadyARepository {
        /// The path that already holds a repository.
        path: PathBuf,
    },

    /// The working tree has untracked or modified tracked files and the
    /// requested operation requires a clean tree.
    DirtyWorkingTree {
        /// Human-readable description of what was found dirty.
        detail: String,
    },

    /// A name failed validation against the configured name template.
    InvalidAssetName {
        /// The invalid name that was provided.
        name: String,
        /// Which template clause rejected it.
        clause: String,
    },

    /// The target path for a create/rename already has an asset at it.
    NameCollision {
        /// The colliding path.
        path: PathBuf,
    },

    /// The requested asset does not exist.
    NoSuchAsset {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The requested directory does not exist.
    NoSuchDirectory {
        /// The path that was not found.
        path: PathBuf,
    },

    /// `rmdir` (or `rm` without `--recursive`) was given a populated directory.
    NotEmpty {
        /// The non-empty directory.
        path: PathBuf,
    },

    /// An attempt to mutate a name-bound key outside of a rename.
    BoundKeyMutation {
        /// The bound key that was targeted.
        key: String,
    },

    /// A YAML document failed to parse.
    MalformedDocument {
        /// The offending file.
        path: PathBuf,
        /// Parser detail.
        detail: String,
    },

    /// A named template does not exist under `.onyo/templates/`.
    TemplateNotFound {
        /// The template name that was requested.
        name: String,
    },

    /// Faux serial generation exhausted its retry budget without finding a
    /// free suffix.
    FauxSerialExhausted {
        /// How many candidates were tried.
        attempts: u32,
    },

    /// A git subprocess invocation exited non-zero.
    PluginFailure {
        /// The command that was run.
        command: String,
        /// Captured stderr.
        stderr: String,
    },

    /// The user declined an interactive confirmation.
    UserAbort,

    /// A transaction's pushed operation failed its precondition or
    /// postcondition checks against the overlay.
    TransactionRejected {
        /// Human-readable description of the violated invariant.
        violation: String,
    },

    /// A configuration file could not be loaded or parsed.
    ConfigError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Human-readable description of the problem.
        detail: String,
    },

    /// An I/O error occurred during an operation.
    Io(std::io::Error),
}

// ---------------------------------------------------------------------------
// Display — agent-friendly error messages
// ---------------------------------------------------------------------------

impl fmt::Display for OnyoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotARepository { path } => {
                write!(
                    f,
                    "'{}' is not inside an onyo repository.\n  To fix: run `onyo init` here, or cd into an existing repository.",
                    path.display()
                )
            }
            Self::AlreadyARepository { path } => {
                write!(
                    f,
                    "'{}' is already inside an onyo repository.\n  To fix: nothing to do — `onyo init` is a no-op here.",
                    path.display()
                )
            }
            Self::DirtyWorkingTree { detail } => {
                write!(
                    f,
                    "working tree is not clean: {detail}\n  To fix: commit or discard the change, then retry."
                )
            }
            Self::InvalidAssetName { name, clause } => {
                write!(
                    f,
                    "invalid asset name '{name}': {clause}\n  To fix: check `onyo config get onyo.assets.name-format` and adjust the name to match."
                )
            }
            Self::NameCollision { path } => {
                write!(
                    f,
                    "'{}' already exists.\n  To fix: choose a different name, or `onyo rm {}` first.",
                    path.display(),
                    path.display()
                )
            }
            Self::NoSuchAsset { path } => {
                write!(
                    f,
                    "no such asset: '{}'.\n  To fix: check `onyo get` or `onyo tree` for available assets.",
                    path.display()
                )
            }
            Self::NoSuchDirectory { path } => {
                write!(
                    f,
                    "no such directory: '{}'.\n  To fix: check `onyo tree` for available directories.",
                    path.display()
                )
            }
            Self::NotEmpty { path } => {
                write!(
                    f,
                    "'{}' is not empty.\n  To fix: pass `--recursive` to remove its contents too.",
                    path.display()
                )
            }
            Self::BoundKeyMutation { key } => {
                write!(
                    f,
                    "'{key}' is bound to the asset's name and cannot be set directly.\n  To fix: use `onyo mv` to rename the asset instead."
                )
            }
            Self::MalformedDocument { path, detail } => {
                write!(
                    f,
                    "'{}' is not valid YAML: {}\n  To fix: open the file and correct the syntax error.",
                    path.display(),
                    detail
                )
            }
            Self::TemplateNotFound { name } => {
                write!(
                    f,
                    "template '{name}' not found.\n  To fix: check `.onyo/templates/`, or omit `--template` to use the default."
                )
            }
            Self::FauxSerialExhausted { attempts } => {
                write!(
                    f,
                    "could not generate a free faux serial after {attempts} attempt(s).\n  To fix: specify a serial explicitly."
                )
            }
            Self::PluginFailure { command, stderr } => {
                write!(f, "git command failed: {command}")?;
                if !stderr.is_empty() {
                    write!(f, "\n  stderr: {stderr}")?;
                }
                write!(
                    f,
                    "\n  To fix: check the repository state and retry. Run `git status` for details."
                )
            }
            Self::UserAbort => write!(f, "aborted by user."),
            Self::TransactionRejected { violation } => {
                write!(
                    f,
                    "operation rejected: {violation}\n  To fix: adjust the operation and retry; no changes were made."
                )
            }
            Self::ConfigError { path, detail } => {
                write!(
                    f,
                    "configuration error in '{}': {}\n  To fix: edit the config file and correct the issue.",
                    path.display(),
                    detail
                )
            }
            Self::Io(err) => {
                write!(
                    f,
                    "I/O error: {err}\n  To fix: check file permissions and disk space."
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// std::error::Error
// ---------------------------------------------------------------------------

impl std::error::Error for OnyoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// From impls
// ---------------------------------------------------------------------------

impl From<std::io::Error> for OnyoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<crate::config::ConfigError> for OnyoError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::ConfigError {
            path: err.path.unwrap_or_default(),
            detail: err.message,
        }
    }
}

impl From<onyo_git::GitError> for OnyoError {
    fn from(err: onyo_git::GitError) -> Self {
        match err {
            onyo_git::GitError::NotFound { message } => Self::NoSuchAsset {
                path: PathBuf::from(message),
            },
            onyo_git::GitError::NotAWorkingTree { path } => Self::NotARepository { path },
            onyo_git::GitError::DirtyWorktree { message, .. } => {
                Self::DirtyWorkingTree { detail: message }
            }
            onyo_git::GitError::CommandFailed { args, stderr, .. } => Self::PluginFailure {
                command: args,
                stderr,
            },
            onyo_git::GitError::IoError(e) => Self::Io(e),
            other => Self::PluginFailure {
                command: "git".to_owned(),
                stderr: other.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_not_a_repository() {
        let err = OnyoError::NotARepository {
            path: PathBuf::from("/tmp/plain"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("/tmp/plain"));
        assert!(msg.contains("onyo init"));
    }

    #[test]
    fn display_already_a_repository() {
        let err = OnyoError::AlreadyARepository {
            path: PathBuf::from("/tmp/repo"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("already"));
        assert!(msg.contains("no-op"));
    }

    #[test]
    fn display_dirty_working_tree() {
        let err = OnyoError::DirtyWorkingTree {
            detail: "untracked file shelf/new.txt".to_owned(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("shelf/new.txt"));
        assert!(msg.contains("not clean"));
    }

    #[test]
    fn display_invalid_asset_name() {
        let err = OnyoError::InvalidAssetName {
            name: "bad name".to_owned(),
            clause: "contains whitespace".to_owned(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("bad name"));
        assert!(msg.contains("contains whitespace"));
        assert!(msg.contains("name-format"));
    }

    #[test]
    fn display_name_collision() {
        let err = OnyoError::NameCollision {
            path: PathBuf::from("shelf/laptop_dell.abc123"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("already exists"));
        assert!(msg.contains("onyo rm"));
    }

    #[test]
    fn display_no_such_asset() {
        let err = OnyoError::NoSuchAsset {
            path: PathBuf::from("shelf/missing"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("no such asset"));
        assert!(msg.contains("shelf/missing"));
    }

    #[test]
    fn display_not_empty() {
        let err = OnyoError::NotEmpty {
            path: PathBuf::from("shelf"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("not empty"));
        assert!(msg.contains("--recursive"));
    }

    #[test]
    fn display_bound_key_mutation() {
        let err = OnyoError::BoundKeyMutation {
            key: "serial".to_owned(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("serial"));
        assert!(msg.contains("onyo mv"));
    }

    #[test]
    fn display_malformed_document() {
        let err = OnyoError::MalformedDocument {
            path: PathBuf::from("shelf/x.yaml"),
            detail: "found character that cannot start any token".to_owned(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("shelf/x.yaml"));
        assert!(msg.contains("cannot start any token"));
    }

    #[test]
    fn display_template_not_found() {
        let err = OnyoError::TemplateNotFound {
            name: "laptop".to_owned(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("laptop"));
        assert!(msg.contains(".onyo/templates"));
    }

    #[test]
    fn display_faux_serial_exhausted() {
        let err = OnyoError::FauxSerialExhausted { attempts: 32 };
        let msg = format!("{err}");
        assert!(msg.contains("32"));
    }

    #[test]
    fn display_plugin_failure() {
        let err = OnyoError::PluginFailure {
            command: "git commit".to_owned(),
            stderr: "nothing to commit".to_owned(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("git commit"));
        assert!(msg.contains("nothing to commit"));
    }

    #[test]
    fn display_plugin_failure_empty_stderr() {
        let err = OnyoError::PluginFailure {
            command: "git add".to_owned(),
            stderr: String::new(),
        };
        let msg = format!("{err}");
        assert!(!msg.contains("stderr:"));
    }

    #[test]
    fn display_user_abort() {
        let err = OnyoError::UserAbort;
        assert_eq!(format!("{err}"), "aborted by user.");
    }

    #[test]
    fn display_transaction_rejected() {
        let err = OnyoError::TransactionRejected {
            violation: "postcondition: bound key 'serial' changed outside rename".to_owned(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("postcondition"));
        assert!(msg.contains("no changes were made"));
    }

    #[test]
    fn display_config_error() {
        let err = OnyoError::ConfigError {
            path: PathBuf::from(".onyo/config"),
            detail: "unknown field 'foo'".to_owned(),
        };
        let msg = format!("{err}");
        assert!(msg.contains(".onyo/config"));
        assert!(msg.contains("unknown field 'foo'"));
    }

    #[test]
    fn display_io_error() {
        let err = OnyoError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "permission denied",
        ));
        let msg = format!("{err}");
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn error_source_io() {
        let inner = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = OnyoError::Io(inner);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn error_source_non_io_is_none() {
        let err = OnyoError::UserAbort;
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::other("disk full");
        let err: OnyoError = io_err.into();
        assert!(matches!(err, OnyoError::Io(_)));
    }

    #[test]
    fn from_config_error() {
        let cfg_err = crate::config::ConfigError {
            path: Some(PathBuf::from("/repo/.onyo/config")),
            message: "bad syntax".to_owned(),
        };
        let err: OnyoError = cfg_err.into();
        match err {
            OnyoError::ConfigError { path, detail } => {
                assert_eq!(path, PathBuf::from("/repo/.onyo/config"));
                assert_eq!(detail, "bad syntax");
            }
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn from_git_error_not_a_working_tree() {
        let git_err = onyo_git::GitError::NotAWorkingTree {
            path: PathBuf::from("/tmp/bare.git"),
        };
        let err: OnyoError = git_err.into();
        assert!(matches!(err, OnyoError::NotARepository { .. }));
    }

    #[test]
    fn from_git_error_command_failed() {
        let git_err = onyo_git::GitError::CommandFailed {
            args: "commit -m test".to_owned(),
            status: 1,
            stderr: "nothing to commit".to_owned(),
        };
        let err: OnyoError = git_err.into();
        match err {
            OnyoError::PluginFailure { command, stderr } => {
                assert_eq!(command, "commit -m test");
                assert_eq!(stderr, "nothing to commit");
            }
            other => panic!("expected PluginFailure, got {other:?}"),
        }
    }
}
