//! Git abstraction layer for onyo.
//!
//! This crate defines the [`GitAdapter`] trait — the single interface through
//! which the rest of onyo interacts with git. No other onyo crate should
//! import `gix` directly; instead, they depend on `onyo-git` and program
//! against the trait.
//!
//! # Crate layout
//!
//! - [`repo`] — the [`GitAdapter`] trait definition.
//! - [`types`] — value types used in trait signatures ([`GitOid`],
//!   [`ConfigScope`], [`AuthorIdentity`], [`CommitTimestamp`]).
//! - [`error`] — the [`GitError`] enum returned by all trait methods.
//! - [`gix_adapter`] — the `gix`-backed read half of [`GixGitAdapter`].
//! - [`cli_adapter`] — `git`-subprocess mutations shared by [`GixGitAdapter`].
//! - [`fake`] — [`FakeGitAdapter`], an in-memory test double.

pub mod cli_adapter;
pub mod error;
pub mod fake;
pub mod gix_adapter;
pub mod repo;
pub mod types;

// Re-export the main trait and commonly used types at the crate root for
// ergonomic imports: `use onyo_git::{GitAdapter, GitOid, GitError};`
pub use error::GitError;
pub use fake::{CommitRecord, FakeGitAdapter};
pub use gix_adapter::GixGitAdapter;
pub use repo::GitAdapter;
pub use types::{AuthorIdentity, CommitTimestamp, ConfigScope, GitOid, OidParseError};
