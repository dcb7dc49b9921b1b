//! Tolerant field extraction from raw records.
//!
//! Every helper takes a JSON pointer (`/transportation/product/class`) and
//! returns `None` when any segment along the path is missing or `null`.
//! Present values are coerced to the requested type where the coercion is
//! unambiguous (numeric strings to integers, `"1"` to `true`, numbers to
//! text); anything else also yields `None`.

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use crate::domain::Coord;

use super::error::Rejection;

/// The value at `path`, treating `null` as absent.
pub fn get<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    record.pointer(path).filter(|v| !v.is_null())
}

/// Text at `path`. Numbers and booleans are rendered; empty strings count
/// as absent.
pub fn text(record: &Value, path: &str) -> Option<String> {
    match get(record, path)? {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integer at `path`. Accepts integral numbers and numeric strings.
pub fn int(record: &Value, path: &str) -> Option<i64> {
    match get(record, path)? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Boolean at `path`. Accepts booleans, `"true"`/`"false"`, `"1"`/`"0"`
/// and the numbers 1/0.
pub fn flag(record: &Value, path: &str) -> Option<bool> {
    match get(record, path)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// RFC 3339 timestamp at `path`.
pub fn time(record: &Value, path: &str) -> Option<DateTime<FixedOffset>> {
    let s = get(record, path)?.as_str()?;
    DateTime::parse_from_rfc3339(s.trim()).ok()
}

/// Two-element numeric coordinate array at `path`.
pub fn coord(record: &Value, path: &str) -> Option<Coord> {
    match get(record, path)?.as_array()?.as_slice() {
        [x, y, ..] => Some(Coord {
            x: x.as_f64()?,
            y: y.as_f64()?,
        }),
        _ => None,
    }
}

/// Text at `path`, where the source may be a single string or a list of
/// strings. Lists are joined with `,`.
pub fn joined_text(record: &Value, path: &str) -> Option<String> {
    match get(record, path)? {
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join(","))
        }
        _ => text(record, path),
    }
}

/// The JSON text of whatever is at `path`.
pub fn json_text(record: &Value, path: &str) -> Option<String> {
    get(record, path).map(Value::to_string)
}

/// The object at `path`, if there is one.
pub fn object<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    get(record, path).filter(|v| v.is_object())
}

/// The list at `path`. Absent lists are empty; a present value that is not
/// a list is a structural error.
pub fn list<'a>(record: &'a Value, path: &str) -> Result<&'a [Value], Rejection> {
    match get(record, path) {
        None => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(Rejection::malformed(path, "a list")),
    }
}

/// Fail unless `value` is an object.
pub fn expect_object(value: &Value, path: &str) -> Result<(), Rejection> {
    if value.is_object() {
        Ok(())
    } else {
        Err(Rejection::malformed(path, "an object"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "a": {
                "b": { "c": "deep" },
                "n": 42,
                "s": "17",
                "f": 2.5,
                "whole": 3.0,
                "nul": null,
                "empty": "",
                "yes": "true",
                "one": "1",
                "no": 0,
                "bool": false,
                "when": "2022-10-05T12:34:00Z",
                "xy": [48.78, 9.18],
                "short": [1.0],
                "tags": ["MONITORED", "DEVIATION"]
            },
            "items": [ { "x": 1 }, { "x": 2 } ],
            "notlist": { "x": 1 }
        })
    }

    #[test]
    fn missing_segments_are_none() {
        let r = record();
        assert_eq!(text(&r, "/a/b/c"), Some("deep".into()));
        assert_eq!(text(&r, "/a/b/missing"), None);
        assert_eq!(text(&r, "/nope/b/c"), None);
        assert_eq!(text(&r, "/a/n/deeper"), None);
        assert!(get(&r, "/a/nul").is_none());
    }

    #[test]
    fn text_coercion() {
        let r = record();
        assert_eq!(text(&r, "/a/n"), Some("42".into()));
        assert_eq!(text(&r, "/a/bool"), Some("false".into()));
        assert_eq!(text(&r, "/a/empty"), None);
        assert_eq!(text(&r, "/a/b"), None);
    }

    #[test]
    fn int_coercion() {
        let r = record();
        assert_eq!(int(&r, "/a/n"), Some(42));
        assert_eq!(int(&r, "/a/s"), Some(17));
        assert_eq!(int(&r, "/a/whole"), Some(3));
        assert_eq!(int(&r, "/a/f"), None);
        assert_eq!(int(&r, "/a/b/c"), None);
    }

    #[test]
    fn flag_coercion() {
        let r = record();
        assert_eq!(flag(&r, "/a/yes"), Some(true));
        assert_eq!(flag(&r, "/a/one"), Some(true));
        assert_eq!(flag(&r, "/a/no"), Some(false));
        assert_eq!(flag(&r, "/a/bool"), Some(false));
        assert_eq!(flag(&r, "/a/b/c"), None);
    }

    #[test]
    fn time_and_coord() {
        let r = record();
        let t = time(&r, "/a/when").unwrap();
        assert_eq!(t.to_rfc3339(), "2022-10-05T12:34:00+00:00");
        assert_eq!(time(&r, "/a/s"), None);

        assert_eq!(coord(&r, "/a/xy"), Some(Coord { x: 48.78, y: 9.18 }));
        assert_eq!(coord(&r, "/a/short"), None);
        assert_eq!(coord(&r, "/a/n"), None);
    }

    #[test]
    fn joined_and_json_text() {
        let r = record();
        assert_eq!(joined_text(&r, "/a/tags"), Some("MONITORED,DEVIATION".into()));
        assert_eq!(joined_text(&r, "/a/b/c"), Some("deep".into()));
        assert_eq!(json_text(&r, "/a/xy"), Some("[48.78,9.18]".into()));
    }

    #[test]
    fn list_shapes() {
        let r = record();
        assert_eq!(list(&r, "/items").unwrap().len(), 2);
        assert!(list(&r, "/absent").unwrap().is_empty());
        assert!(list(&r, "/a/nul").unwrap().is_empty());

        let err = list(&r, "/notlist").unwrap_err();
        assert_eq!(err.to_string(), "malformed record at /notlist: expected a list");
    }

    #[test]
    fn object_shapes() {
        let r = record();
        assert!(object(&r, "/a/b").is_some());
        assert!(object(&r, "/a/n").is_none());
        assert!(expect_object(&r, "").is_ok());
        assert!(expect_object(&json!([1]), "/legs/0").is_err());
    }
}
