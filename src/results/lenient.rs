//! Field-level permissive deserializers
//!
//! The Instant Answer API is loose with types: sizes arrive as numbers or
//! empty strings, arrays are sometimes replaced by `""`. A single odd field
//! must not sink the whole response, so these helpers go through
//! `serde_json::Value` and fall back to "absent" instead of failing.

use super::types::{Icon, RelatedTopic};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Scalars become strings, anything else becomes `None`
pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_to_string))
}

/// Arrays of objects become topics; non-arrays become empty, non-objects are skipped
pub fn topics<'de, D>(deserializer: D) -> Result<Vec<RelatedTopic>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };

    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// An object becomes an icon, anything else becomes `None`
pub fn icon<'de, D>(deserializer: D) -> Result<Option<Icon>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(item @ Value::Object(_)) => serde_json::from_value(item).ok(),
        _ => None,
    })
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
