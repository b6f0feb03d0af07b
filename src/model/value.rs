//! The dynamic document-body value type.
//!
//! An asset's body is an arbitrary YAML mapping, possibly nested. `Value` is
//! the in-memory shape of one node of that mapping — used by
//! [`crate::yaml::patch::apply_patch`] for dotted-key mutation and by the
//! query engine for rendering `[dict]`/`[list]`/scalar cells.
//!
//! Net new: no teacher module models a recursive document tree (the
//! teacher's `OpPayload::Annotate` carries `BTreeMap<String, serde_json::Value>`
//! directly). `Value` plays the same role but stays a hand-rolled enum
//! because [`crate::yaml::document::Document`] must additionally carry
//! comments and scalar quoting style per node, which `serde_json::Value`
//! has no room for.

use indexmap::IndexMap;

/// A dynamically-typed document value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// YAML `null` / `~` / empty scalar.
    Null,
    /// A boolean scalar.
    Bool(bool),
    /// An integer scalar.
    Int(i64),
    /// A floating-point scalar.
    Float(f64),
    /// A string scalar (already unescaped/unquoted).
    String(String),
    /// A sequence (`- a\n- b`).
    Sequence(Vec<Value>),
    /// A mapping, in source key order.
    Mapping(IndexMap<String, Value>),
}

impl Value {
    /// Returns `true` for `Mapping`/`Sequence`, `false` for scalar variants.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Mapping(_) | Self::Sequence(_))
    }

    /// The query-output rendering token for this value: `[dict]`, `[list]`,
    /// or the scalar rendered as plain text.
    #[must_use]
    pub fn render_token(&self) -> String {
        match self {
            Self::Mapping(_) => "[dict]".to_owned(),
            Self::Sequence(_) => "[list]".to_owned(),
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(x) => x.to_string(),
            Self::String(s) => s.clone(),
        }
    }

    /// Look up a dotted key path (`"a.b.c"`) inside this value, treating
    /// `self` as the root mapping.
    ///
    /// Returns `None` if any segment is missing, or if a non-terminal
    /// segment resolves to a non-mapping value.
    #[must_use]
    pub fn get_path(&self, dotted_key: &str) -> Option<&Self> {
        let mut current = self;
        for segment in dotted_key.split('.') {
            match current {
                Self::Mapping(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> Value {
        let mut inner = IndexMap::new();
        inner.insert("city".to_owned(), Value::from("ghent"));
        let mut outer = IndexMap::new();
        outer.insert("location".to_owned(), Value::Mapping(inner));
        outer.insert("qty".to_owned(), Value::Int(3));
        Value::Mapping(outer)
    }

    #[test]
    fn render_token_for_mapping_and_sequence() {
        assert_eq!(nested().render_token(), "[dict]");
        assert_eq!(Value::Sequence(vec![]).render_token(), "[list]");
    }

    #[test]
    fn render_token_for_scalars() {
        assert_eq!(Value::Int(3).render_token(), "3");
        assert_eq!(Value::Bool(true).render_token(), "true");
        assert_eq!(Value::String("x".to_owned()).render_token(), "x");
        assert_eq!(Value::Null.render_token(), "");
    }

    #[test]
    fn get_path_resolves_dotted_key() {
        let doc = nested();
        assert_eq!(doc.get_path("location.city"), Some(&Value::from("ghent")));
    }

    #[test]
    fn get_path_missing_segment_is_none() {
        let doc = nested();
        assert_eq!(doc.get_path("location.country"), None);
    }

    #[test]
    fn get_path_through_scalar_is_none() {
        let doc = nested();
        assert_eq!(doc.get_path("qty.anything"), None);
    }

    #[test]
    fn is_composite() {
        assert!(nested().is_composite());
        assert!(!Value::Int(1).is_composite());
    }
}
