//! Parsing `-k/--keys key=value` pairs into typed [`onyo::model::value::Value`]s.

use anyhow::{bail, Result};
use indexmap::IndexMap;
use onyo::model::value::Value;

/// Parse one `key=value` argument.
///
/// # Errors
/// Returns an error if `kv` has no `=`.
pub fn parse_pair(kv: &str) -> Result<(String, Value)> {
    let Some((key, value)) = kv.split_once('=') else {
        bail!("expected key=value, got '{kv}'");
    };
    Ok((key.to_owned(), parse_scalar(value)))
}

/// Parse a batch of `key=value` arguments into an ordered map, in the order
/// given (later duplicates of the same key overwrite earlier ones).
///
/// # Errors
/// Propagates [`parse_pair`]'s error for any malformed entry.
pub fn parse_pairs(pairs: &[String]) -> Result<IndexMap<String, Value>> {
    let mut out = IndexMap::new();
    for kv in pairs {
        let (key, value) = parse_pair(kv)?;
        out.insert(key, value);
    }
    Ok(out)
}

/// Interpret a raw `--keys`/TSV cell string as a typed scalar: `true`/`false`
/// as bool, integers as `Int`, decimals as `Float`, everything else as a
/// plain string.
#[must_use]
pub fn parse_scalar(raw: &str) -> Value {
    if raw == "true" {
        Value::Bool(true)
    } else if raw == "false" {
        Value::Bool(false)
    } else if let Ok(i) = raw.parse::<i64>() {
        Value::Int(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        Value::Float(f)
    } else {
        Value::String(raw.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_scalars() {
        assert_eq!(parse_scalar("true"), Value::Bool(true));
        assert_eq!(parse_scalar("42"), Value::Int(42));
        assert_eq!(parse_scalar("4.5"), Value::Float(4.5));
        assert_eq!(parse_scalar("dell"), Value::String("dell".to_owned()));
    }

    #[test]
    fn parse_pair_splits_on_first_equals() {
        let (k, v) = parse_pair("make=dell").unwrap();
        assert_eq!(k, "make");
        assert_eq!(v, Value::String("dell".to_owned()));
    }

    #[test]
    fn parse_pair_rejects_missing_equals() {
        assert!(parse_pair("make").is_err());
    }
}
