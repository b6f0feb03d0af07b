//! A round-trip YAML reader/writer for asset documents.
//!
//! Preserves key insertion order (via [`indexmap::IndexMap`]), each scalar's
//! original quoting style, and one trailing `# comment` per entry. This is a
//! deliberately narrow subset of YAML — block mappings, block sequences, and
//! scalars — sufficient for asset documents, which are themselves a narrow
//! subset (a single top-level mapping, no anchors/aliases/flow collections,
//! no multi-document streams). Net new: no mainstream crate round-trips
//! comments and quote style together, so this is hand-rolled.
//!
//! Uses [`indexmap::IndexMap`] for the same reason the teacher reaches for
//! `BTreeMap` in `OpPayload::Annotate` when it wants canonical ordering —
//! here the order we want preserved is insertion order, not sorted order.

use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::model::value::Value;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A YAML document failed to parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based line number where parsing failed.
    pub line: usize,
    /// Human-readable detail.
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

// ---------------------------------------------------------------------------
// Scalar quoting style
// ---------------------------------------------------------------------------

/// How a scalar was quoted in its source form, so `dump` can reproduce it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarStyle {
    /// No quotes (`key: value`).
    Plain,
    /// Single-quoted (`key: 'value'`).
    Single,
    /// Double-quoted (`key: "value"`).
    Double,
}

// ---------------------------------------------------------------------------
// DocValue / DocEntry
// ---------------------------------------------------------------------------

/// A value node in a [`Document`], carrying its rendering style alongside
/// the plain [`Value`].
#[derive(Clone, Debug, PartialEq)]
pub enum DocValue {
    /// A scalar (string/int/float/bool/null), with its source quote style.
    Scalar { value: Value, style: ScalarStyle },
    /// A block sequence.
    Sequence(Vec<DocValue>),
    /// A nested block mapping.
    Mapping(IndexMap<String, DocEntry>),
}

impl DocValue {
    /// Strip styling metadata, producing a plain [`Value`] tree.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Scalar { value, .. } => value.clone(),
            Self::Sequence(items) => Value::Sequence(items.iter().map(Self::to_value).collect()),
            Self::Mapping(map) => Value::Mapping(
                map.iter()
                    .map(|(k, e)| (k.clone(), e.value.to_value()))
                    .collect(),
            ),
        }
    }

    fn plain_string(s: impl Into<String>) -> Self {
        Self::Scalar {
            value: Value::String(s.into()),
            style: ScalarStyle::Plain,
        }
    }

    /// Wrap a plain [`Value`] tree as a [`DocValue`], with no comments and
    /// plain scalar styling throughout — used for freshly created content
    /// that has no source form to preserve.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Mapping(map) => Self::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, DocEntry::new(Self::from_value(v))))
                    .collect(),
            ),
            Value::Sequence(items) => Self::Sequence(items.into_iter().map(Self::from_value).collect()),
            scalar => Self::Scalar { value: scalar, style: ScalarStyle::Plain },
        }
    }
}

/// Wrap a plain body map as document entries, with no comments and plain
/// scalar styling — the fresh-document counterpart to [`Document::to_value_map`].
#[must_use]
pub fn value_map_to_entries(map: IndexMap<String, Value>) -> IndexMap<String, DocEntry> {
    map.into_iter()
        .map(|(k, v)| (k, DocEntry::new(DocValue::from_value(v))))
        .collect()
}

/// One mapping entry: a value plus an optional trailing `# comment`.
#[derive(Clone, Debug, PartialEq)]
pub struct DocEntry {
    /// The entry's value.
    pub value: DocValue,
    /// A trailing same-line comment, if the source had one.
    pub comment: Option<String>,
}

impl DocEntry {
    /// Build an entry with no comment.
    #[must_use]
    pub const fn new(value: DocValue) -> Self {
        Self { value, comment: None }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A parsed YAML asset document.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Document {
    /// Comment lines preceding the `---` marker (or the first key, if no
    /// marker was present).
    pub leading_comments: Vec<String>,
    /// The top-level mapping.
    pub root: IndexMap<String, DocEntry>,
}

impl Document {
    /// An empty document (what the `empty` template ships as: a lone `---`).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Flatten to a plain [`IndexMap`] of [`Value`], discarding comments and
    /// quote style.
    #[must_use]
    pub fn to_value_map(&self) -> IndexMap<String, Value> {
        self.root
            .iter()
            .map(|(k, e)| (k.clone(), e.value.to_value()))
            .collect()
    }

    /// Parse a document from its textual form.
    ///
    /// # Errors
    /// Returns a [`ParseError`] naming the offending line when the text
    /// does not fit the supported subset of YAML.
    pub fn load(text: &str) -> Result<Self, ParseError> {
        let mut lines: Vec<(usize, &str)> = Vec::new();
        let mut leading_comments = Vec::new();
        let mut seen_marker = false;
        let mut seen_content = false;

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let trimmed = raw.trim_end();
            if trimmed.trim() == "---" {
                seen_marker = true;
                continue;
            }
            if trimmed.trim().is_empty() {
                continue;
            }
            if !seen_content && !seen_marker && trimmed.trim_start().starts_with('#') {
                leading_comments.push(trimmed.trim_start().trim_start_matches('#').trim().to_owned());
                continue;
            }
            seen_content = true;
            lines.push((line_no, raw));
        }

        let mut cursor = 0;
        let root = parse_block(&lines, &mut cursor, 0)?;
        if cursor != lines.len() {
            let (line_no, _) = lines[cursor];
            return Err(ParseError {
                line: line_no,
                message: "unexpected indentation".to_owned(),
            });
        }

        Ok(Self { leading_comments, root })
    }

    /// Render back to YAML text, with a leading `---` document marker.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for comment in &self.leading_comments {
            let _ = writeln!(out, "# {comment}");
        }
        out.push_str("---\n");
        write_mapping(&mut out, &self.root, 0);
        out
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn indent_of(raw: &str) -> usize {
    raw.chars().take_while(|c| *c == ' ').count()
}

fn parse_block(
    lines: &[(usize, &str)],
    cursor: &mut usize,
    indent: usize,
) -> Result<IndexMap<String, DocEntry>, ParseError> {
    let mut map = IndexMap::new();

    while *cursor < lines.len() {
        let (line_no, raw) = lines[*cursor];
        let this_indent = indent_of(raw);
        if this_indent < indent {
            break;
        }
        if this_indent > indent {
            return Err(ParseError {
                line: line_no,
                message: "unexpected indentation".to_owned(),
            });
        }

        let content = raw[this_indent..].trim_end();
        if let Some(stripped) = content.strip_prefix("- ") {
            let _ = stripped;
            return Err(ParseError {
                line: line_no,
                message: "expected 'key: value', found a sequence item".to_owned(),
            });
        }

        let colon = find_key_colon(content).ok_or_else(|| ParseError {
            line: line_no,
            message: format!("expected 'key: value', got '{content}'"),
        })?;
        let key = content[..colon].trim().to_owned();
        let rest = content[colon + 1..].trim();

        *cursor += 1;

        if rest.is_empty() {
            // Nested mapping or sequence follows at a deeper indent.
            let value = if *cursor < lines.len() {
                let (_, next_raw) = lines[*cursor];
                let next_indent = indent_of(next_raw);
                if next_indent > indent {
                    let next_content = next_raw[next_indent..].trim_start();
                    if next_content.starts_with("- ") || next_content == "-" {
                        DocValue::Sequence(parse_sequence(lines, cursor, next_indent)?)
                    } else {
                        DocValue::Mapping(parse_block(lines, cursor, next_indent)?)
                    }
                } else {
                    DocValue::plain_string(String::new())
                }
            } else {
                DocValue::plain_string(String::new())
            };
            map.insert(key, DocEntry::new(value));
        } else {
            let (scalar_text, comment) = split_trailing_comment(rest);
            let (value, style) = parse_scalar(scalar_text);
            map.insert(
                key,
                DocEntry {
                    value: DocValue::Scalar { value, style },
                    comment,
                },
            );
        }
    }

    Ok(map)
}

fn parse_sequence(
    lines: &[(usize, &str)],
    cursor: &mut usize,
    indent: usize,
) -> Result<Vec<DocValue>, ParseError> {
    let mut items = Vec::new();
    while *cursor < lines.len() {
        let (line_no, raw) = lines[*cursor];
        let this_indent = indent_of(raw);
        if this_indent != indent {
            break;
        }
        let content = raw[this_indent..].trim_end();
        let Some(item_text) = content.strip_prefix("- ") else {
            break;
        };
        *cursor += 1;
        let (scalar_text, _comment) = split_trailing_comment(item_text.trim());
        if scalar_text.is_empty() {
            return Err(ParseError {
                line: line_no,
                message: "empty sequence item".to_owned(),
            });
        }
        let (value, style) = parse_scalar(scalar_text);
        items.push(DocValue::Scalar { value, style });
    }
    Ok(items)
}

/// Find the colon that separates a mapping key from its value, ignoring
/// colons inside a quoted key (asset documents never quote keys, but this
/// keeps the scanner honest).
fn find_key_colon(content: &str) -> Option<usize> {
    let mut in_quotes: Option<char> = None;
    for (i, c) in content.char_indices() {
        match in_quotes {
            Some(q) if c == q => in_quotes = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => in_quotes = Some(c),
            None if c == ':' => {
                let next = content[i + 1..].chars().next();
                if next.is_none_or(char::is_whitespace) {
                    return Some(i);
                }
            }
            None => {}
        }
    }
    None
}

fn split_trailing_comment(s: &str) -> (&str, Option<String>) {
    if let Some(quote) = s.chars().next().filter(|c| *c == '\'' || *c == '"') {
        // Quoted scalar: find the matching close quote, then look past it
        // for a comment.
        if let Some(end) = s[1..].find(quote) {
            let value_end = end + 2;
            let remainder = s[value_end..].trim_start();
            if let Some(comment) = remainder.strip_prefix('#') {
                return (&s[..value_end], Some(comment.trim().to_owned()));
            }
            return (&s[..value_end], None);
        }
    }
    match s.find(" #") {
        Some(idx) => (s[..idx].trim_end(), Some(s[idx + 2..].trim().to_owned())),
        None => (s, None),
    }
}

fn parse_scalar(text: &str) -> (Value, ScalarStyle) {
    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        return (
            Value::String(text[1..text.len() - 1].replace("''", "'")),
            ScalarStyle::Single,
        );
    }
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return (
            Value::String(unescape_double_quoted(&text[1..text.len() - 1])),
            ScalarStyle::Double,
        );
    }
    let value = match text {
        "~" | "null" | "Null" | "NULL" => Value::Null,
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        _ => {
            if let Ok(i) = text.parse::<i64>() {
                Value::Int(i)
            } else if let Ok(f) = text.parse::<f64>() {
                Value::Float(f)
            } else {
                Value::String(text.to_owned())
            }
        }
    };
    (value, ScalarStyle::Plain)
}

fn unescape_double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn write_mapping(out: &mut String, map: &IndexMap<String, DocEntry>, indent: usize) {
    let pad = " ".repeat(indent);
    for (key, entry) in map {
        match &entry.value {
            DocValue::Scalar { value, style } => {
                let rendered = render_scalar(value, *style);
                match &entry.comment {
                    Some(c) => {
                        let _ = writeln!(out, "{pad}{key}: {rendered} # {c}");
                    }
                    None => {
                        let _ = writeln!(out, "{pad}{key}: {rendered}");
                    }
                }
            }
            DocValue::Mapping(nested) => {
                let _ = writeln!(out, "{pad}{key}:");
                write_mapping(out, nested, indent + 2);
            }
            DocValue::Sequence(items) => {
                let _ = writeln!(out, "{pad}{key}:");
                for item in items {
                    if let DocValue::Scalar { value, style } = item {
                        let _ = writeln!(out, "{pad}- {}", render_scalar(value, *style));
                    }
                }
            }
        }
    }
}

fn render_scalar(value: &Value, style: ScalarStyle) -> String {
    match value {
        Value::Null => "~".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => match style {
            ScalarStyle::Single => format!("'{}'", s.replace('\'', "''")),
            ScalarStyle::Double => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            ScalarStyle::Plain => {
                if needs_quoting(s) {
                    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
                } else {
                    s.clone()
                }
            }
        },
        Value::Sequence(_) | Value::Mapping(_) => unreachable!("composite scalar"),
    }
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s.starts_with(['\'', '"', '[', '{', '*', '&', '!', '|', '>', '%', '@', '`', '#'])
        || s.contains(": ")
        || s.ends_with(':')
        || matches!(s, "~" | "null" | "true" | "false" | "Null" | "True" | "False")
        || s.parse::<i64>().is_ok()
        || s.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_dumps_lone_marker() {
        assert_eq!(Document::empty().dump(), "---\n");
    }

    #[test]
    fn load_flat_mapping() {
        let doc = Document::load("---\ntype: laptop\nmake: dell\n").unwrap();
        assert_eq!(
            doc.root.get("type").unwrap().value,
            DocValue::plain_string("laptop")
        );
        assert_eq!(
            doc.root.get("make").unwrap().value,
            DocValue::plain_string("dell")
        );
    }

    #[test]
    fn load_preserves_key_order() {
        let doc = Document::load("---\nb: 2\na: 1\n").unwrap();
        let keys: Vec<&str> = doc.root.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn load_preserves_trailing_comment() {
        let doc = Document::load("---\nram_gb: 16 # upgraded\n").unwrap();
        assert_eq!(
            doc.root.get("ram_gb").unwrap().comment.as_deref(),
            Some("upgraded")
        );
    }

    #[test]
    fn load_nested_mapping() {
        let doc = Document::load("---\nlocation:\n  city: ghent\n  floor: 2\n").unwrap();
        let DocValue::Mapping(nested) = &doc.root.get("location").unwrap().value else {
            panic!("expected mapping");
        };
        assert_eq!(nested.get("city").unwrap().value, DocValue::plain_string("ghent"));
    }

    #[test]
    fn load_sequence() {
        let doc = Document::load("---\ntags:\n- a\n- b\n").unwrap();
        let DocValue::Sequence(items) = &doc.root.get("tags").unwrap().value else {
            panic!("expected sequence");
        };
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn load_typed_scalars() {
        let doc = Document::load("---\nqty: 3\nactive: true\nratio: 1.5\nempty: ~\n").unwrap();
        assert_eq!(doc.root.get("qty").unwrap().value.to_value(), Value::Int(3));
        assert_eq!(doc.root.get("active").unwrap().value.to_value(), Value::Bool(true));
        assert_eq!(doc.root.get("ratio").unwrap().value.to_value(), Value::Float(1.5));
        assert_eq!(doc.root.get("empty").unwrap().value.to_value(), Value::Null);
    }

    #[test]
    fn load_quoted_scalar_preserves_style() {
        let doc = Document::load("---\nserial: '007'\n").unwrap();
        let DocValue::Scalar { value, style } = &doc.root.get("serial").unwrap().value else {
            panic!("expected scalar");
        };
        assert_eq!(*value, Value::String("007".to_owned()));
        assert_eq!(*style, ScalarStyle::Single);
    }

    #[test]
    fn round_trip_is_stable() {
        let original = "---\ntype: laptop\nmake: dell # flagship\nlocation:\n  city: ghent\ntags:\n- work\n- spare\n";
        let doc = Document::load(original).unwrap();
        let dumped = doc.dump();
        let reparsed = Document::load(&dumped).unwrap();
        assert_eq!(doc, reparsed);
    }

    #[test]
    fn dump_quotes_value_that_looks_like_a_number() {
        let mut root = IndexMap::new();
        root.insert(
            "serial".to_owned(),
            DocEntry::new(DocValue::Scalar {
                value: Value::String("007".to_owned()),
                style: ScalarStyle::Plain,
            }),
        );
        let doc = Document { leading_comments: vec![], root };
        assert!(doc.dump().contains("serial: \"007\""));
    }

    #[test]
    fn load_rejects_malformed_line() {
        assert!(Document::load("---\nnot a mapping entry\n").is_err());
    }

    #[test]
    fn load_preserves_leading_comments() {
        let doc = Document::load("# template for laptops\n---\ntype: laptop\n").unwrap();
        assert_eq!(doc.leading_comments, vec!["template for laptops".to_owned()]);
    }
}
