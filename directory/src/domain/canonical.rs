//! Canonical JSON form used at buffer-write boundaries.
//!
//! Every record that enters the edit buffer from a field write, or leaves it
//! for the persistent mirror, passes through [`encode`] and [`decode`]. The
//! canonical form is compact JSON with object keys in sorted order, so two
//! values are equal exactly when their canonical strings are byte-identical.
//! Decoding the canonical string back is the normalisation step: anything
//! that does not survive JSON is dropped at that point rather than later.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Failures while converting to or from the canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalError {
    /// The value could not be represented as JSON.
    #[error("failed to encode canonical JSON: {message}")]
    Encode {
        /// Description of the serialisation failure.
        message: String,
    },
    /// The text was not valid JSON for the requested type.
    #[error("failed to decode canonical JSON: {message}")]
    Decode {
        /// Description of the deserialisation failure.
        message: String,
    },
}

/// Serialise `value` into its canonical string.
///
/// # Errors
///
/// Returns [`CanonicalError::Encode`] when `value` cannot be expressed as
/// JSON (for example a map with non-string keys).
///
/// # Examples
/// ```
/// use employee_directory::domain::canonical;
/// use serde_json::json;
///
/// let encoded = canonical::encode(&json!({ "b": 1, "a": [true] })).expect("encode");
/// assert_eq!(encoded, r#"{"a":[true],"b":1}"#);
/// ```
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, CanonicalError> {
    let tree = to_tree(value)?;
    Ok(canonical_text(&tree))
}

/// Deserialise a canonical (or any JSON) string.
///
/// # Errors
///
/// Returns [`CanonicalError::Decode`] when `raw` is not valid JSON for `T`.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, CanonicalError> {
    serde_json::from_str(raw).map_err(|err| CanonicalError::Decode {
        message: err.to_string(),
    })
}

/// Push `value` through the canonical form and back.
///
/// # Errors
///
/// Propagates [`encode`] and [`decode`] failures.
pub fn normalise<T: Serialize + DeserializeOwned>(value: &T) -> Result<T, CanonicalError> {
    decode(&encode(value)?)
}

/// Convert `value` into a JSON tree with object keys in sorted order.
///
/// # Errors
///
/// Returns [`CanonicalError::Encode`] when `value` cannot be expressed as
/// JSON.
pub fn to_tree<T: Serialize + ?Sized>(value: &T) -> Result<Value, CanonicalError> {
    serde_json::to_value(value)
        .map(sorted)
        .map_err(|err| CanonicalError::Encode {
            message: err.to_string(),
        })
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(fields) => {
            let mut entries: Vec<(String, Value)> = fields.into_iter().collect();
            entries.sort_by(|left, right| left.0.cmp(&right.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, nested)| (key, sorted(nested)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

fn canonical_text(value: &Value) -> String {
    sorted(value.clone()).to_string()
}

/// Keys of `incoming` whose canonical value differs from `reference`.
///
/// Only keys present on `incoming` are inspected; a key missing from
/// `reference` counts as a difference. When `incoming` is not an object the
/// whole values are compared and the empty key `""` stands for the value
/// itself. Keys are returned in sorted order.
pub fn differing_keys(incoming: &Value, reference: &Value) -> Vec<String> {
    let Value::Object(incoming_fields) = incoming else {
        return if canonical_text(incoming) == canonical_text(reference) {
            Vec::new()
        } else {
            vec![String::new()]
        };
    };

    let mut keys: Vec<String> = incoming_fields
        .iter()
        .filter(|(key, value)| {
            reference
                .get(key.as_str())
                .is_none_or(|other| canonical_text(value) != canonical_text(other))
        })
        .map(|(key, _)| key.clone())
        .collect();
    keys.sort();
    keys
}
