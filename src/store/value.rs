use serde_json::{json, Map, Value};

use super::StoreError;
use crate::models::Fields;

/// Encode a JSON value as a Firestore REST `Value`
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                // Values past i64::MAX cannot be stored as integers
                json!({ "doubleValue": u as f64 })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encode every field of a document
pub fn encode_fields(fields: &Fields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

/// Turn `{"a.b": 1, "c": 2}` into `{"a": {"b": 1}, "c": 2}`
pub fn expand_field_paths(fields: &Fields) -> Result<Fields, StoreError> {
    let mut expanded = Map::new();
    for (path, value) in fields {
        let segments = split_field_path(path)?;
        set_path(&mut expanded, &segments, value.clone());
    }
    Ok(expanded)
}

/// Split a dot-separated field path, rejecting empty segments
pub fn split_field_path(path: &str) -> Result<Vec<&str>, StoreError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(StoreError::invalid_data(format!("invalid field path '{}'", path)));
    }
    Ok(segments)
}

/// Split every key of an update into segments. A path that equals or
/// is a prefix of another path in the same update is rejected.
pub fn update_paths(fields: &Fields) -> Result<Vec<Vec<&str>>, StoreError> {
    let mut paths: Vec<Vec<&str>> = Vec::with_capacity(fields.len());
    for key in fields.keys() {
        let segments = split_field_path(key)?;
        if let Some(other) = paths.iter().find(|p| overlaps(p, &segments)) {
            return Err(StoreError::invalid_data(format!(
                "field paths '{}' and '{}' overlap",
                other.join("."),
                key
            )));
        }
        paths.push(segments);
    }
    Ok(paths)
}

fn overlaps(a: &[&str], b: &[&str]) -> bool {
    let shared = a.len().min(b.len());
    a[..shared] == b[..shared]
}

/// Write `value` at `segments`, creating intermediate maps. A non-map
/// value in the way is replaced.
pub fn set_path(target: &mut Fields, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            target.insert(last.to_string(), value);
        }
        [head, rest @ ..] => {
            let entry = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                set_path(child, rest, value);
            }
        }
    }
}

/// Quote a field path for an update mask. Segments that are not simple
/// identifiers are wrapped in backticks.
pub fn quote_field_path(path: &str) -> Result<String, StoreError> {
    let segments = split_field_path(path)?;
    let quoted: Vec<String> = segments
        .into_iter()
        .map(|segment| {
            if is_simple_segment(segment) {
                segment.to_string()
            } else {
                format!("`{}`", segment.replace('\\', "\\\\").replace('`', "\\`"))
            }
        })
        .collect();
    Ok(quoted.join("."))
}

fn is_simple_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode_value(&json!(null)), json!({"nullValue": null}));
        assert_eq!(encode_value(&json!(true)), json!({"booleanValue": true}));
        assert_eq!(encode_value(&json!(42)), json!({"integerValue": "42"}));
        assert_eq!(encode_value(&json!(-7)), json!({"integerValue": "-7"}));
        assert_eq!(encode_value(&json!(1.5)), json!({"doubleValue": 1.5}));
        assert_eq!(encode_value(&json!("hi")), json!({"stringValue": "hi"}));
    }

    #[test]
    fn test_encode_nested() {
        let encoded = encode_fields(&fields(json!({
            "tags": ["a", 1],
            "address": {"city": "Lima"}
        })));

        assert_eq!(
            encoded["tags"],
            json!({"arrayValue": {"values": [{"stringValue": "a"}, {"integerValue": "1"}]}})
        );
        assert_eq!(
            encoded["address"],
            json!({"mapValue": {"fields": {"city": {"stringValue": "Lima"}}}})
        );
    }

    #[test]
    fn test_expand_field_paths() {
        let expanded = expand_field_paths(&fields(json!({
            "address.city": "Cusco",
            "address.zip": "08000",
            "name": "Ana"
        })))
        .unwrap();

        assert_eq!(
            Value::Object(expanded),
            json!({"address": {"city": "Cusco", "zip": "08000"}, "name": "Ana"})
        );
    }

    #[test]
    fn test_expand_rejects_empty_segment() {
        assert!(expand_field_paths(&fields(json!({"a..b": 1}))).is_err());
        assert!(expand_field_paths(&fields(json!({".a": 1}))).is_err());
    }

    #[test]
    fn test_update_paths_rejects_overlap() {
        let err = update_paths(&fields(json!({"a": {"x": 1}, "a.b": 1}))).unwrap_err();
        assert!(err.to_string().contains("overlap"));

        let input = fields(json!({"a.b": 1, "a.c": 2, "ab": 3}));
        let paths = update_paths(&input).unwrap();
        assert_eq!(paths, vec![vec!["a", "b"], vec!["a", "c"], vec!["ab"]]);
        assert!(update_paths(&Fields::new()).unwrap().is_empty());
    }

    #[test]
    fn test_set_path_replaces_scalar_parent() {
        let mut target = fields(json!({"a": 5}));
        set_path(&mut target, &["a", "b"], json!(1));
        assert_eq!(Value::Object(target), json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_quote_field_path() {
        assert_eq!(quote_field_path("name").unwrap(), "name");
        assert_eq!(quote_field_path("address.city").unwrap(), "address.city");
        assert_eq!(quote_field_path("first-name").unwrap(), "`first-name`");
        assert_eq!(quote_field_path("a.1st").unwrap(), "a.`1st`");
        assert_eq!(quote_field_path("we`ird").unwrap(), "`we\\`ird`");
    }
}
