//! The YAML Store: round-trip document parsing/rendering and dotted-key
//! patch application.

pub mod document;
pub mod patch;

pub use document::{value_map_to_entries, DocEntry, DocValue, Document, ParseError, ScalarStyle};
pub use patch::{apply_patch, Patch, PatchError};
