//! The Query Engine: `get` with include/exclude scoping, depth limiting,
//! `key=regex` match predicates, dotted-key column selection, and stable
//! multi-key natural sort.

use indexmap::IndexMap;
use regex::Regex;

use crate::model::value::Value;

/// One asset's worth of data available to a query: its path plus its
/// document body.
#[derive(Clone, Debug)]
pub struct Row<'a> {
    /// Repository-relative path.
    pub path: &'a std::path::Path,
    /// The asset's document body.
    pub body: &'a IndexMap<String, Value>,
}

/// A `key=regex` match predicate. All predicates in a query are AND-combined.
#[derive(Clone, Debug)]
pub struct MatchPredicate {
    /// Dotted key to test.
    pub key: String,
    /// Unanchored regex the key's rendered value must contain a match for.
    pub pattern: Regex,
}

/// A single sort key: a dotted key plus ascending/descending direction.
#[derive(Clone, Debug)]
pub struct SortKey {
    /// Dotted key to sort by.
    pub key: String,
    /// `false` for ascending (default), `true` for descending.
    pub descending: bool,
}

/// Parameters for a `get` query.
#[derive(Clone, Debug, Default)]
pub struct Query {
    /// Only include assets whose path starts with one of these prefixes.
    /// Empty means "everything".
    pub include: Vec<std::path::PathBuf>,
    /// Exclude assets whose path starts with one of these prefixes, even if
    /// they matched `include`. Exclude wins over include.
    pub exclude: Vec<std::path::PathBuf>,
    /// Maximum number of path components below the shallowest `include`
    /// prefix. `None` means unbounded.
    pub depth: Option<usize>,
    /// AND-combined match predicates.
    pub matches: Vec<MatchPredicate>,
    /// Dotted keys to render as output columns, in order.
    pub keys: Vec<String>,
    /// Sort keys, applied in order (stable).
    pub sort: Vec<SortKey>,
}

/// The reserved token for a dotted key that is absent on a row.
pub const UNSET_TOKEN: &str = "[unset]";

impl Query {
    fn path_in_scope(&self, path: &std::path::Path) -> bool {
        if self.exclude.iter().any(|p| path.starts_with(p)) {
            return false;
        }
        if self.include.is_empty() {
            return true;
        }
        self.include.iter().any(|p| path.starts_with(p))
    }

    fn within_depth(&self, path: &std::path::Path) -> bool {
        let Some(max_depth) = self.depth else { return true };
        let best_prefix_len = self
            .include
            .iter()
            .filter(|p| path.starts_with(p))
            .map(|p| p.components().count())
            .max()
            .unwrap_or(0);
        let relative_depth = path.components().count().saturating_sub(best_prefix_len);
        relative_depth <= max_depth
    }

    fn row_matches(&self, row: &Row<'_>) -> bool {
        self.matches.iter().all(|pred| {
            let rendered = Value::Mapping(row.body.clone())
                .get_path(&pred.key)
                .map(Value::render_token)
                .unwrap_or_else(|| UNSET_TOKEN.to_owned());
            pred.pattern.is_match(&rendered)
        })
    }

    /// Run the query over `rows`, returning rendered output rows: one
    /// `Vec<String>` per matching asset, in `self.keys` order (or just the
    /// path if `keys` is empty), sorted per `self.sort`.
    #[must_use]
    pub fn run<'a>(&self, rows: &[Row<'a>]) -> Vec<QueryRow<'a>> {
        let mut matching: Vec<QueryRow<'a>> = rows
            .iter()
            .filter(|r| self.path_in_scope(r.path) && self.within_depth(r.path) && self.row_matches(r))
            .map(|r| self.render_row(r))
            .collect();

        for sort_key in self.sort.iter().rev() {
            matching.sort_by(|a, b| {
                let av = a.values.get(&sort_key.key).map(String::as_str).unwrap_or(UNSET_TOKEN);
                let bv = b.values.get(&sort_key.key).map(String::as_str).unwrap_or(UNSET_TOKEN);
                let ord = natural_compare(av, bv);
                if sort_key.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        matching
    }

    fn render_row<'a>(&self, row: &Row<'a>) -> QueryRow<'a> {
        let mut values = IndexMap::new();
        let keys: Vec<&str> = if self.keys.is_empty() {
            Vec::new()
        } else {
            self.keys.iter().map(String::as_str).collect()
        };
        for key in &keys {
            let rendered = Value::Mapping(row.body.clone())
                .get_path(key)
                .map(Value::render_token)
                .unwrap_or_else(|| UNSET_TOKEN.to_owned());
            values.insert((*key).to_owned(), rendered);
        }
        QueryRow { path: row.path, values }
    }
}

/// One rendered query result.
#[derive(Clone, Debug)]
pub struct QueryRow<'a> {
    /// The asset's path.
    pub path: &'a std::path::Path,
    /// Rendered column values, keyed by dotted key.
    pub values: IndexMap<String, String>,
}

impl QueryRow<'_> {
    /// Tab-separated line, columns in the order they were inserted,
    /// followed by the path (matching the documented machine-readable
    /// output: columns first, then the path).
    #[must_use]
    pub fn to_tsv_line(&self) -> String {
        let mut cells: Vec<&str> = self.values.values().map(String::as_str).collect();
        let path_str = self.path.to_string_lossy();
        cells.push(&path_str);
        cells.join("\t")
    }
}

/// Compare two strings the way a human expects mixed alphanumeric sort keys
/// to order: runs of digits compare numerically, everything else compares
/// byte-wise. Used so `asset2` sorts before `asset10`.
#[must_use]
pub fn natural_compare(a: &str, b: &str) -> std::cmp::Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();
    loop {
        match (ai.peek(), bi.peek()) {
            (None, None) => return std::cmp::Ordering::Equal,
            (None, Some(_)) => return std::cmp::Ordering::Less,
            (Some(_), None) => return std::cmp::Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let anum = take_number(&mut ai);
                let bnum = take_number(&mut bi);
                match anum.cmp(&bnum) {
                    std::cmp::Ordering::Equal => {}
                    other => return other,
                }
            }
            (Some(x), Some(y)) => {
                match x.cmp(y) {
                    std::cmp::Ordering::Equal => {
                        ai.next();
                        bi.next();
                    }
                    other => return other,
                }
            }
        }
    }
}

fn take_number(iter: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u128 {
    let mut digits = String::new();
    while let Some(c) = iter.peek() {
        if c.is_ascii_digit() {
            digits.push(*c);
            iter.next();
        } else {
            break;
        }
    }
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn body(pairs: &[(&str, &str)]) -> IndexMap<String, Value> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), Value::from(*v))).collect()
    }

    #[test]
    fn include_scopes_to_prefix() {
        let b1 = body(&[]);
        let b2 = body(&[]);
        let rows = vec![
            Row { path: Path::new("shelf/a.1"), body: &b1 },
            Row { path: Path::new("closet/b.1"), body: &b2 },
        ];
        let query = Query { include: vec![PathBuf::from("shelf")], ..Query::default() };
        let result = query.run(&rows);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].path, Path::new("shelf/a.1"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let b1 = body(&[]);
        let rows = vec![Row { path: Path::new("shelf/a.1"), body: &b1 }];
        let query = Query {
            include: vec![PathBuf::from("shelf")],
            exclude: vec![PathBuf::from("shelf/a.1")],
            ..Query::default()
        };
        assert!(query.run(&rows).is_empty());
    }

    #[test]
    fn match_predicate_filters() {
        let b1 = body(&[("make", "dell")]);
        let b2 = body(&[("make", "lenovo")]);
        let rows = vec![
            Row { path: Path::new("a"), body: &b1 },
            Row { path: Path::new("b"), body: &b2 },
        ];
        let query = Query {
            matches: vec![MatchPredicate { key: "make".to_owned(), pattern: Regex::new("^dell$").unwrap() }],
            ..Query::default()
        };
        let result = query.run(&rows);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].path, Path::new("a"));
    }

    #[test]
    fn match_predicate_recognises_unset_token_for_missing_key() {
        let b1 = body(&[("make", "dell")]);
        let b2 = body(&[]);
        let rows = vec![
            Row { path: Path::new("a"), body: &b1 },
            Row { path: Path::new("b"), body: &b2 },
        ];
        let query = Query {
            matches: vec![MatchPredicate {
                key: "make".to_owned(),
                pattern: Regex::new(r"^\[unset\]$").unwrap(),
            }],
            ..Query::default()
        };
        let result = query.run(&rows);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].path, Path::new("b"));
    }

    #[test]
    fn missing_key_renders_unset_token() {
        let b1 = body(&[]);
        let rows = vec![Row { path: Path::new("a"), body: &b1 }];
        let query = Query { keys: vec!["make".to_owned()], ..Query::default() };
        let result = query.run(&rows);
        assert_eq!(result[0].values.get("make").unwrap(), UNSET_TOKEN);
    }

    #[test]
    fn sort_is_natural_for_numeric_suffixes() {
        let b1 = body(&[("n", "asset10")]);
        let b2 = body(&[("n", "asset2")]);
        let rows = vec![
            Row { path: Path::new("a"), body: &b1 },
            Row { path: Path::new("b"), body: &b2 },
        ];
        let query = Query {
            keys: vec!["n".to_owned()],
            sort: vec![SortKey { key: "n".to_owned(), descending: false }],
            ..Query::default()
        };
        let result = query.run(&rows);
        assert_eq!(result[0].values.get("n").unwrap(), "asset2");
        assert_eq!(result[1].values.get("n").unwrap(), "asset10");
    }

    #[test]
    fn natural_compare_orders_numeric_suffix_correctly() {
        assert_eq!(natural_compare("asset2", "asset10"), std::cmp::Ordering::Less);
        assert_eq!(natural_compare("abc", "abd"), std::cmp::Ordering::Less);
    }

    #[test]
    fn depth_limits_recursion_below_include_prefix() {
        let b1 = body(&[]);
        let b2 = body(&[]);
        let rows = vec![
            Row { path: Path::new("shelf/a.1"), body: &b1 },
            Row { path: Path::new("shelf/sub/b.1"), body: &b2 },
        ];
        let query = Query {
            include: vec![PathBuf::from("shelf")],
            depth: Some(1),
            ..Query::default()
        };
        let result = query.run(&rows);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].path, Path::new("shelf/a.1"));
    }

    #[test]
    fn to_tsv_line_appends_path_last() {
        let b1 = body(&[("make", "dell")]);
        let rows = vec![Row { path: Path::new("shelf/a.1"), body: &b1 }];
        let query = Query { keys: vec!["make".to_owned()], ..Query::default() };
        let result = query.run(&rows);
        assert_eq!(result[0].to_tsv_line(), "dell\tshelf/a.1");
    }
}
