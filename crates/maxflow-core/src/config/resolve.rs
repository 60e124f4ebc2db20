//! `@`-reference resolution over the raw configuration document.
//!
//! Any string value of the form `@path.to.entry` is replaced by the value at
//! that path inside the document's `buttons` section. Resolution walks the
//! whole document, so references work in flows, errors, commands and inside
//! the buttons section's own nested values.

use crate::config::types::ConfigError;
use serde_json::Value;

/// Resolve every `@`-reference in `doc` against its `buttons` section.
pub fn resolve_document(doc: &Value) -> Result<Value, ConfigError> {
    let buttons = doc.get("buttons").cloned().unwrap_or(Value::Null);
    resolve_value(doc, &buttons)
}

fn resolve_value(value: &Value, buttons: &Value) -> Result<Value, ConfigError> {
    match value {
        Value::Object(map) => {
            let mut resolved = serde_json::Map::with_capacity(map.len());
            for (key, entry) in map {
                resolved.insert(key.clone(), resolve_value(entry, buttons)?);
            }
            Ok(Value::Object(resolved))
        }
        Value::Array(items) => {
            let mut resolved = Vec::with_capacity(items.len());
            for item in items {
                resolved.push(resolve_value(item, buttons)?);
            }
            Ok(Value::Array(resolved))
        }
        Value::String(s) if s.starts_with('@') => resolve_reference(&s[1..], buttons),
        other => Ok(other.clone()),
    }
}

fn resolve_reference(reference: &str, buttons: &Value) -> Result<Value, ConfigError> {
    let mut current = buttons;
    for segment in reference.split('.') {
        current = current
            .get(segment)
            .ok_or_else(|| ConfigError::UnresolvedReference {
                reference: reference.to_string(),
                segment: segment.to_string(),
            })?;
    }
    Ok(current.clone())
}
