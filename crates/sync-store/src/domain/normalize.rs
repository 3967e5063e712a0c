//! Field normalization helpers.
//!
//! Entities arrive with several historical spellings of the same field
//! (`id`, `bucketId`, `bucket_id`, `_id`). Each canonical field is described by
//! an alias group whose first element is the canonical key. The first alias
//! holding a usable value wins; every alias is consumed so only the canonical
//! key survives in the stored entity.

use serde::Serialize;
use serde_json::{Map, Value};

/// Read the first usable value among `keys` as a string and remove all of
/// them from `fields`.
///
/// Usable means a non-empty string (after trimming) or a number. Nulls,
/// empty strings and other JSON types are skipped.
pub fn take_string(fields: &mut Map<String, Value>, keys: &[&str]) -> Option<String> {
    let mut found = None;
    for key in keys {
        let Some(value) = fields.remove(*key) else {
            continue;
        };
        if found.is_none() {
            found = as_identifier(&value);
        }
    }
    found
}

/// Read the first integer-like value among `keys` and remove all of them.
///
/// Accepts JSON integers, whole floats and numeric strings.
pub fn take_integer(fields: &mut Map<String, Value>, keys: &[&str]) -> Option<i64> {
    let mut found = None;
    for key in keys {
        let Some(value) = fields.remove(*key) else {
            continue;
        };
        if found.is_none() {
            found = as_integer(&value);
        }
    }
    found
}

/// Extract an identifier without consuming anything.
///
/// `raw` may be the id itself (string or number) or an object carrying one of
/// `keys`.
pub fn identifier_of(raw: &Value, keys: &[&str]) -> Option<String> {
    match raw {
        Value::Object(fields) => keys
            .iter()
            .find_map(|key| fields.get(*key).and_then(as_identifier)),
        other => as_identifier(other),
    }
}

fn as_identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Turn any value into a field map. Non-objects yield an empty map.
pub fn into_fields(raw: Value) -> Map<String, Value> {
    match raw {
        Value::Object(fields) => fields,
        _ => Map::new(),
    }
}

/// Serialize a canonical entity back into a field map.
pub fn to_fields<T: Serialize>(entity: &T) -> Map<String, Value> {
    serde_json::to_value(entity)
        .map(into_fields)
        .unwrap_or_default()
}

/// Shallow-merge `patch` over `base`.
///
/// When the patch names any alias of a group, the whole group is cleared from
/// the base first so a stale canonical value cannot shadow the new one.
pub fn merge_fields(
    mut base: Map<String, Value>,
    patch: Map<String, Value>,
    alias_groups: &[&[&str]],
) -> Map<String, Value> {
    for group in alias_groups {
        if group.iter().any(|key| patch.contains_key(*key)) {
            for key in *group {
                base.remove(*key);
            }
        }
    }
    base.extend(patch);
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &[&str] = &["id", "bucketId", "bucket_id", "_id"];

    fn fields(value: Value) -> Map<String, Value> {
        into_fields(value)
    }

    #[test]
    fn test_first_match_wins_and_consumes_aliases() {
        let mut f = fields(json!({"bucket_id": "b2", "bucketId": "b1", "color": "red"}));
        assert_eq!(take_string(&mut f, ID), Some("b1".to_string()));
        assert_eq!(f, fields(json!({"color": "red"})));
    }

    #[test]
    fn test_skips_unusable_values() {
        let mut f = fields(json!({"id": null, "bucketId": "  ", "_id": 42}));
        assert_eq!(take_string(&mut f, ID), Some("42".to_string()));
        assert!(f.is_empty());
    }

    #[test]
    fn test_no_identifier() {
        let mut f = fields(json!({"name": "x"}));
        assert_eq!(take_string(&mut f, ID), None);
    }

    #[test]
    fn test_take_integer_accepts_strings() {
        let mut f = fields(json!({"objective_count": "12"}));
        assert_eq!(
            take_integer(&mut f, &["objectiveCount", "objective_count"]),
            Some(12)
        );
        let mut f = fields(json!({"objectiveCount": 3.0}));
        assert_eq!(take_integer(&mut f, &["objectiveCount"]), Some(3));
        let mut f = fields(json!({"objectiveCount": 3.5}));
        assert_eq!(take_integer(&mut f, &["objectiveCount"]), None);
    }

    #[test]
    fn test_identifier_of_accepts_bare_and_object() {
        assert_eq!(identifier_of(&json!("b1"), ID), Some("b1".into()));
        assert_eq!(identifier_of(&json!(7), ID), Some("7".into()));
        assert_eq!(identifier_of(&json!({"_id": "b3"}), ID), Some("b3".into()));
        assert_eq!(identifier_of(&json!(null), ID), None);
    }

    #[test]
    fn test_merge_clears_alias_group() {
        let base = fields(json!({"id": "b1", "name": "Old", "color": "red"}));
        let patch = fields(json!({"bucketName": "New"}));
        let merged = merge_fields(base, patch, &[&["name", "bucketName", "bucket_name"]]);
        assert_eq!(
            merged,
            fields(json!({"id": "b1", "bucketName": "New", "color": "red"}))
        );
    }
}
