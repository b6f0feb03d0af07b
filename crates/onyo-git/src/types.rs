//! Core types for the onyo git abstraction layer.
//!
//! These types form the vocabulary shared between the [`GitAdapter`](crate::GitAdapter)
//! trait and the rest of onyo. They intentionally contain no `gix` types — the
//! backend is an implementation detail.

use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// GitOid
// ---------------------------------------------------------------------------

/// A git object identifier (SHA-1, 20 bytes).
///
/// Stored as raw bytes for efficient comparison, hashing, and `Copy` semantics.
/// Displays as 40 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GitOid([u8; 20]);

impl GitOid {
    /// Create a `GitOid` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Return the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for GitOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for GitOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GitOid({self})")
    }
}

impl FromStr for GitOid {
    type Err = OidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 40 {
            return Err(OidParseError {
                value: s.to_owned(),
                reason: format!("expected 40 hex characters, got {}", s.len()),
            });
        }
        let mut bytes = [0u8; 20];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hi = hex_digit(chunk[0]).ok_or_else(|| OidParseError {
                value: s.to_owned(),
                reason: format!("invalid hex digit '{}'", chunk[0] as char),
            })?;
            let lo = hex_digit(chunk[1]).ok_or_else(|| OidParseError {
                value: s.to_owned(),
                reason: format!("invalid hex digit '{}'", chunk[1] as char),
            })?;
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

/// Error from parsing a hex string into a [`GitOid`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OidParseError {
    /// The raw value that failed.
    pub value: String,
    /// Why it failed.
    pub reason: String,
}

impl fmt::Display for OidParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid OID {:?}: {}", self.value, self.reason)
    }
}

impl std::error::Error for OidParseError {}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// ConfigScope
// ---------------------------------------------------------------------------

/// Which git config file a read/write targets (spec.md §4.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigScope {
    /// `.git/config` in the current repository.
    Local,
    /// The user's global `~/.gitconfig`.
    Global,
    /// The machine-wide system config.
    System,
}

impl ConfigScope {
    /// The `git config` CLI flag for this scope.
    #[must_use]
    pub const fn as_flag(self) -> &'static str {
        match self {
            Self::Local => "--local",
            Self::Global => "--global",
            Self::System => "--system",
        }
    }
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Global => write!(f, "global"),
            Self::System => write!(f, "system"),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthorIdentity / CommitTimestamps
// ---------------------------------------------------------------------------

/// The author/committer identity attached to a commit.
///
/// When absent, the adapter falls back to git's own identity resolution
/// (`user.name`/`user.email`, then `GIT_AUTHOR_*`/`GIT_COMMITTER_*`, then the
/// OS user) exactly as the `git` binary itself would.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorIdentity {
    /// Display name, e.g. `"Jane Doe"`.
    pub name: String,
    /// Email address, e.g. `"jane@example.com"`.
    pub email: String,
}

impl fmt::Display for AuthorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Explicit author/committer timestamps for a commit.
///
/// `None` lets git stamp the current time, which is what every command
/// handler does in practice; tests pass an explicit value for determinism.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitTimestamp {
    /// Seconds since the Unix epoch.
    pub seconds: i64,
    /// Offset from UTC in minutes (git stores whole-minute offsets).
    pub offset_minutes: i32,
}

impl CommitTimestamp {
    /// Render in the `<seconds> <+HHMM>` form git expects for
    /// `GIT_AUTHOR_DATE`/`GIT_COMMITTER_DATE`.
    #[must_use]
    pub fn to_git_date(self) -> String {
        let sign = if self.offset_minutes < 0 { '-' } else { '+' };
        let abs = self.offset_minutes.abs();
        format!("{} {}{:02}{:02}", self.seconds, sign, abs / 60, abs % 60)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
