//! Reshaping validated values (`remapIt`).

use serde_json::{Map, Value};

/// A `remapIt` declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Remap {
    /// `{ fromArrayToMap: { mapKeyField, allowProperties? } }`
    FromArrayToMap {
        map_key_field: String,
        allow_properties: Option<Vec<String>>,
    },
}

impl Remap {
    /// `fromArrayToMap` keeping whole elements.
    pub fn from_array_to_map(map_key_field: impl Into<String>) -> Self {
        Remap::FromArrayToMap {
            map_key_field: map_key_field.into(),
            allow_properties: None,
        }
    }

    /// `fromArrayToMap` projecting only `allow_properties` per entry.
    pub fn from_array_to_map_with<I, S>(map_key_field: impl Into<String>, allow_properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Remap::FromArrayToMap {
            map_key_field: map_key_field.into(),
            allow_properties: Some(allow_properties.into_iter().map(Into::into).collect()),
        }
    }

    /// Applies the remap. Values of the wrong shape pass through unchanged.
    pub fn apply(&self, value: Value) -> Value {
        match (self, value) {
            (
                Remap::FromArrayToMap {
                    map_key_field,
                    allow_properties,
                },
                Value::Array(items),
            ) => Value::Object(from_array_to_map(
                &items,
                map_key_field,
                allow_properties.as_deref(),
            )),
            (_, other) => other,
        }
    }
}

/// Builds a map keyed by each element's `map_key_field`.
///
/// With `allow_properties`, only those fields are projected per entry;
/// otherwise each element is kept whole. Elements without a scalar key are
/// skipped, and later elements overwrite earlier ones with the same key.
///
/// ```rust
/// use contextual_validator::from_array_to_map;
/// use serde_json::{json, Value};
///
/// let items = vec![json!({"id": 1, "name": "a"}), json!({"id": 2, "name": "b"})];
/// let map = from_array_to_map(&items, "id", None);
///
/// assert_eq!(
///     Value::Object(map),
///     json!({"1": {"id": 1, "name": "a"}, "2": {"id": 2, "name": "b"}})
/// );
/// ```
pub fn from_array_to_map(
    items: &[Value],
    map_key_field: &str,
    allow_properties: Option<&[String]>,
) -> Map<String, Value> {
    let mut map = Map::new();
    for item in items {
        let Some(key) = item.get(map_key_field).and_then(map_key) else {
            tracing::trace!(map_key_field, "skipping element without map key");
            continue;
        };
        let entry = match allow_properties {
            None => item.clone(),
            Some(allowed) => Value::Object(
                allowed
                    .iter()
                    .filter_map(|prop| item.get(prop).map(|v| (prop.clone(), v.clone())))
                    .collect(),
            ),
        };
        map.insert(key, entry);
    }
    map
}

fn map_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
