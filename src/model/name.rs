//! Asset name templates and faux-serial generation.
//!
//! A name template is a string of literal runs and `{field}` placeholders,
//! e.g. the default `{type}_{make}_{model}.{serial}`. Exactly one
//! placeholder — the one following the template's final `.` — is the
//! **tail**: it matches `.+` (any characters, including `_` and `.`). All
//! other placeholders are **strict** fields matching `[^_.]+`.
//!
//! Grounded on the teacher's `WorkspaceId`/`GitOid` newtype pattern
//! (private inner state, a `validate` associated fn, a `ValidationError`
//! carrying `kind`/`value`/`reason`) from `src/model/types.rs`.

use std::fmt;

use indexmap::IndexMap;
use rand::Rng as _;

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// What kind of value failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A [`NameTemplate`] string itself was malformed.
    Template,
    /// A candidate asset name failed to parse against a template.
    AssetName,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template => write!(f, "NameTemplate"),
            Self::AssetName => write!(f, "AssetName"),
        }
    }
}

/// A validation error for name templates and asset names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    /// What kind of value was being validated.
    pub kind: ErrorKind,
    /// The invalid value.
    pub value: String,
    /// Human-readable explanation — used verbatim as the "which template
    /// clause failed" detail in [`crate::error::OnyoError::InvalidAssetName`].
    pub reason: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {:?} — {}", self.kind, self.value, self.reason)
    }
}

impl std::error::Error for ValidationError {}

// ---------------------------------------------------------------------------
// NameTemplate
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field { name: String, is_tail: bool },
}

/// A parsed name template (e.g. `{type}_{make}_{model}.{serial}`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameTemplate {
    segments: Vec<Segment>,
}

impl NameTemplate {
    /// Parse a template string.
    ///
    /// The placeholder following the template's last literal `.` is the
    /// tail field; there must be at least one field, and field names must
    /// not repeat.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] if the template has no placeholders,
    /// has unbalanced braces, or repeats a field name.
    pub fn parse(template: &str) -> Result<Self, ValidationError> {
        let mut segments = Vec::new();
        let mut chars = template.char_indices().peekable();
        let mut literal = String::new();
        let mut last_dot_field_index: Option<usize> = None;

        while let Some((_, c)) = chars.next() {
            if c == '{' {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, fc)) => field.push(fc),
                        None => {
                            return Err(ValidationError {
                                kind: ErrorKind::Template,
                                value: template.to_owned(),
                                reason: "unterminated '{' placeholder".to_owned(),
                            });
                        }
                    }
                }
                if field.is_empty() {
                    return Err(ValidationError {
                        kind: ErrorKind::Template,
                        value: template.to_owned(),
                        reason: "empty placeholder '{}'".to_owned(),
                    });
                }
                segments.push(Segment::Field {
                    name: field,
                    is_tail: false,
                });
            } else if c == '}' {
                return Err(ValidationError {
                    kind: ErrorKind::Template,
                    value: template.to_owned(),
                    reason: "unmatched '}'".to_owned(),
                });
            } else {
                if c == '.' {
                    last_dot_field_index = Some(segments.len());
                }
                literal.push(c);
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let field_count = segments
            .iter()
            .filter(|s| matches!(s, Segment::Field { .. }))
            .count();
        if field_count == 0 {
            return Err(ValidationError {
                kind: ErrorKind::Template,
                value: template.to_owned(),
                reason: "template has no {field} placeholders".to_owned(),
            });
        }

        // The tail is the field immediately following the last literal '.'.
        let tail_index = match last_dot_field_index {
            Some(dot_idx) => segments[dot_idx..]
                .iter()
                .position(|s| matches!(s, Segment::Field { .. }))
                .map(|offset| dot_idx + offset),
            None => None,
        };
        let tail_index = tail_index.unwrap_or_else(|| {
            segments
                .iter()
                .rposition(|s| matches!(s, Segment::Field { .. }))
                .unwrap_or(0)
        });
        if let Segment::Field { is_tail, .. } = &mut segments[tail_index] {
            *is_tail = true;
        }

        let mut seen = std::collections::BTreeSet::new();
        for seg in &segments {
            if let Segment::Field { name, .. } = seg
                && !seen.insert(name.clone())
            {
                return Err(ValidationError {
                    kind: ErrorKind::Template,
                    value: template.to_owned(),
                    reason: format!("field '{name}' appears more than once"),
                });
            }
        }

        Ok(Self { segments })
    }

    /// The name of the tail field (the relaxed-charset field after the
    /// template's final `.`).
    #[must_use]
    pub fn tail_field(&self) -> &str {
        self.segments
            .iter()
            .find_map(|s| match s {
                Segment::Field { name, is_tail: true } => Some(name.as_str()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// All field names in template order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Field { name, .. } => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Render a concrete name from bound field values.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] if a required field is missing.
    pub fn render(&self, fields: &IndexMap<String, String>) -> Result<String, ValidationError> {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Literal(lit) => out.push_str(lit),
                Segment::Field { name, .. } => {
                    let value = fields.get(name).ok_or_else(|| ValidationError {
                        kind: ErrorKind::AssetName,
                        value: name.clone(),
                        reason: format!("missing value for field '{name}'"),
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    /// Parse a candidate name against this template, returning the bound
    /// field values in template order.
    ///
    /// Parsing is greedy left-to-right: non-tail fields match `[^_.]+`, the
    /// tail field matches `.+` (consuming whatever remains before the next
    /// literal, or to the end of the string for the final field).
    ///
    /// # Errors
    /// Returns a [`ValidationError`] naming which clause of the template
    /// failed to match.
    pub fn parse_name(&self, name: &str) -> Result<IndexMap<String, String>, ValidationError> {
        let mut fields = IndexMap::new();
        let mut rest = name;

        for (idx, seg) in self.segments.iter().enumerate() {
            match seg {
                Segment::Literal(lit) => {
                    rest = rest.strip_prefix(lit.as_str()).ok_or_else(|| ValidationError {
                        kind: ErrorKind::AssetName,
                        value: name.to_owned(),
                        reason: format!("expected literal '{lit}' at this position"),
                    })?;
                }
                Segment::Field { name: field_name, is_tail } => {
                    let next_literal = self.segments[idx + 1..].iter().find_map(|s| match s {
                        Segment::Literal(lit) => Some(lit.as_str()),
                        Segment::Field { .. } => None,
                    });
                    let (matched, remainder) = match next_literal {
                        Some(lit) if !lit.is_empty() => match rest.find(lit) {
                            Some(pos) => (&rest[..pos], &rest[pos..]),
                            None => {
                                return Err(ValidationError {
                                    kind: ErrorKind::AssetName,
                                    value: name.to_owned(),
                                    reason: format!(
                                        "could not find separator '{lit}' for field '{field_name}'"
                                    ),
                                });
                            }
                        },
                        _ => (rest, ""),
                    };
                    if matched.is_empty() {
                        return Err(ValidationError {
                            kind: ErrorKind::AssetName,
                            value: name.to_owned(),
                            reason: format!("field '{field_name}' is empty"),
                        });
                    }
                    let charset_ok = if *is_tail {
                        true
                    } else {
                        !matched.contains('_') && !matched.contains('.')
                    };
                    if !charset_ok {
                        return Err(ValidationError {
                            kind: ErrorKind::AssetName,
                            value: name.to_owned(),
                            reason: format!(
                                "field '{field_name}' contains a reserved character ('_' or '.')"
                            ),
                        });
                    }
                    fields.insert((*field_name).clone(), matched.to_owned());
                    rest = remainder;
                }
            }
        }

        if !rest.is_empty() {
            return Err(ValidationError {
                kind: ErrorKind::AssetName,
                value: name.to_owned(),
                reason: format!("unexpected trailing characters: '{rest}'"),
            });
        }

        Ok(fields)
    }
}

// ---------------------------------------------------------------------------
// Faux serial generation
// ---------------------------------------------------------------------------

/// Default length of the random suffix in a faux serial (excluding the
/// `faux` prefix).
pub const DEFAULT_FAUX_SERIAL_LEN: usize = 6;

/// Default number of collision-retry attempts before giving up.
pub const DEFAULT_FAUX_SERIAL_ATTEMPTS: u32 = 32;

const FAUX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random lowercase-alphanumeric faux serial of the form
/// `faux<suffix>`, retrying while `is_taken` reports a collision.
///
/// # Errors
/// Returns the number of attempts made if no free serial was found within
/// `max_attempts` tries.
pub fn generate_faux_serial(
    len: usize,
    max_attempts: u32,
    mut is_taken: impl FnMut(&str) -> bool,
) -> Result<String, u32> {
    let mut rng = rand::rng();
    for attempt in 0..max_attempts {
        let suffix: String = (0..len)
            .map(|_| {
                let idx = rng.random_range(0..FAUX_ALPHABET.len());
                FAUX_ALPHABET[idx] as char
            })
            .collect();
        let candidate = format!("faux{suffix}");
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
        let _ = attempt;
    }
    Err(max_attempts)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn default_template() -> NameTemplate {
        NameTemplate::parse("{type}_{make}_{model}.{serial}").unwrap()
    }

    #[test]
    fn parse_default_template_identifies_tail() {
        let tpl = default_template();
        assert_eq!(tpl.tail_field(), "serial");
        assert_eq!(tpl.field_names(), vec!["type", "make", "model", "serial"]);
    }

    #[test]
    fn parse_name_splits_fields() {
        let tpl = default_template();
        let fields = tpl.parse_name("laptop_dell_xps13.abc123").unwrap();
        assert_eq!(fields.get("type").unwrap(), "laptop");
        assert_eq!(fields.get("make").unwrap(), "dell");
        assert_eq!(fields.get("model").unwrap(), "xps13");
        assert_eq!(fields.get("serial").unwrap(), "abc123");
    }

    #[test]
    fn parse_name_tail_allows_dots() {
        let tpl = default_template();
        let fields = tpl.parse_name("laptop_dell_xps13.faux.a1b2c3").unwrap();
        assert_eq!(fields.get("serial").unwrap(), "faux.a1b2c3");
    }

    #[test]
    fn parse_name_rejects_reserved_char_in_strict_field() {
        let tpl = default_template();
        assert!(tpl.parse_name("lap_top_dell_xps13.abc123").is_err());
    }

    #[test]
    fn parse_name_rejects_missing_separator() {
        let tpl = default_template();
        assert!(tpl.parse_name("laptopdellxps13abc123").is_err());
    }

    #[test]
    fn render_round_trips_with_parse() {
        let tpl = default_template();
        let fields = tpl.parse_name("laptop_dell_xps13.abc123").unwrap();
        assert_eq!(tpl.render(&fields).unwrap(), "laptop_dell_xps13.abc123");
    }

    #[test]
    fn render_missing_field_is_error() {
        let tpl = default_template();
        let fields = IndexMap::new();
        assert!(tpl.render(&fields).is_err());
    }

    #[test]
    fn parse_template_rejects_no_placeholders() {
        assert!(NameTemplate::parse("plain-name").is_err());
    }

    #[test]
    fn parse_template_rejects_duplicate_field() {
        assert!(NameTemplate::parse("{type}_{type}").is_err());
    }

    #[test]
    fn parse_template_rejects_unterminated_brace() {
        assert!(NameTemplate::parse("{type").is_err());
    }

    #[test]
    fn single_field_template_is_tail() {
        let tpl = NameTemplate::parse("{serial}").unwrap();
        assert_eq!(tpl.tail_field(), "serial");
    }

    #[test]
    fn faux_serial_has_prefix_and_length() {
        let serial = generate_faux_serial(6, 8, |_| false).unwrap();
        assert!(serial.starts_with("faux"));
        assert_eq!(serial.len(), 4 + 6);
    }

    #[test]
    fn faux_serial_retries_on_collision() {
        let mut calls = 0;
        let result = generate_faux_serial(6, 8, |_| {
            calls += 1;
            calls < 3
        });
        assert!(result.is_ok());
        assert_eq!(calls, 3);
    }

    #[test]
    fn faux_serial_exhausts_attempts() {
        let result = generate_faux_serial(6, 4, |_| true);
        assert_eq!(result, Err(4));
    }
}
