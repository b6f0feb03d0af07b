//! onyo library crate — the inventory engine: config, the asset/name/value
//! model, the YAML store, the repository view, the operation set, and the
//! transaction engine that turns a batch of operations into a single git
//! commit.
//!
//! The primary interface is the `onyo` CLI binary (in the `onyo-cli` crate),
//! which is a thin wrapper over this crate's [`repository::Repository`] and
//! [`transaction::Transaction`].

pub mod commit_message;
pub mod config;
pub mod error;
pub mod model;
pub mod operation;
pub mod query;
pub mod repository;
pub mod telemetry;
pub mod transaction;
pub mod view;
pub mod yaml;

pub use error::OnyoError;
pub use repository::Repository;
pub use transaction::Transaction;
