//! The Asset Model: name templates, the dynamic body value type, and the
//! `Asset` binding between the two.

pub mod asset;
pub mod name;
pub mod value;

pub use asset::Asset;
pub use name::{NameTemplate, ValidationError};
pub use value::Value;
