//! Flattening nested records into single-level rows

use serde_json::{Map, Value};

use crate::client::payload::Record;

/// Flatten nested objects into dot-joined keys.
///
/// Arrays and scalars are kept as-is; an empty nested object contributes no
/// keys.
pub fn flatten_nested(record: &Record) -> Record {
    let mut out = Map::new();
    flatten_into(&mut out, None, record);
    out
}

fn flatten_into(out: &mut Record, prefix: Option<&str>, record: &Record) {
    for (key, value) in record {
        let full_key = match prefix {
            Some(p) => format!("{}.{}", p, key),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) => flatten_into(out, Some(&full_key), inner),
            other => {
                out.insert(full_key, other.clone());
            }
        }
    }
}

/// CSV-safe one-level view: arrays become comma-joined text and objects are
/// JSON-encoded. Nulls and scalars pass through.
pub fn flatten_shallow(record: &Record) -> Record {
    record
        .iter()
        .map(|(key, value)| {
            let flat = match value {
                Value::Array(items) => Value::String(
                    items
                        .iter()
                        .map(display_scalar)
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
                Value::Object(_) => Value::String(value.to_string()),
                other => other.clone(),
            };
            (key.clone(), flat)
        })
        .collect()
}

/// Render a value for a single text cell; strings lose their quotes.
pub(crate) fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_flatten_nested_dot_keys() {
        let flat = flatten_nested(&record(json!({
            "id": "f1",
            "plugin": {"id": 98000, "meta": {"family": "xss"}},
            "urls": ["a", "b"],
            "empty": {}
        })));

        assert_eq!(flat["plugin.id"], json!(98000));
        assert_eq!(flat["plugin.meta.family"], json!("xss"));
        assert_eq!(flat["urls"], json!(["a", "b"]));
        assert!(!flat.contains_key("empty"));
        assert!(!flat.contains_key("plugin"));
    }

    #[test]
    fn test_flatten_shallow_csv_safe() {
        let flat = flatten_shallow(&record(json!({
            "tags": ["prod", 7],
            "details": {"k": "v"},
            "score": 9.1,
            "missing": null
        })));

        assert_eq!(flat["tags"], json!("prod, 7"));
        assert_eq!(flat["details"], json!("{\"k\":\"v\"}"));
        assert_eq!(flat["score"], json!(9.1));
        assert_eq!(flat["missing"], Value::Null);
    }
}
