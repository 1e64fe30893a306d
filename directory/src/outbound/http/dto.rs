//! DTOs for bodies the REST API returns outside the record payloads.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::FieldMessages;

#[derive(Debug, Deserialize)]
pub(super) struct EmailCheckDto {
    pub(super) exists: bool,
}

/// Validation error body: an object keyed by field name.
///
/// Values are usually lists of strings, but single strings (`detail`) and
/// nested values occur too; each is flattened to a list of messages.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub(super) struct ErrorBodyDto(BTreeMap<String, Value>);

impl ErrorBodyDto {
    pub(super) fn into_field_messages(self) -> FieldMessages {
        let messages = self
            .0
            .into_iter()
            .map(|(field, value)| (field, flatten_messages(value)))
            .collect::<BTreeMap<_, _>>();
        FieldMessages::from(messages)
    }
}

fn flatten_messages(value: Value) -> Vec<String> {
    match value {
        Value::String(message) => vec![message],
        Value::Array(items) => items.into_iter().flat_map(flatten_messages).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}
