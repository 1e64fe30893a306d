//! Input validation predicates and server-reported field messages.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::EmployeeDraft;

static PHONE_NUMBER_RE: OnceLock<Regex> = OnceLock::new();

fn phone_number_regex() -> &'static Regex {
    PHONE_NUMBER_RE.get_or_init(|| {
        // Optional `+` and 1-3 digit country code, optional separator, then ten digits.
        let pattern = r"^(\+\d{1,3}[- ]?)?\d{10}$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("phone number regex failed to compile: {error}"))
    })
}

/// Whether `phone_number` is an acceptable contact number.
///
/// # Examples
/// ```
/// use employee_directory::domain::validate_phone_number;
///
/// assert!(validate_phone_number("1234567890"));
/// assert!(validate_phone_number("+44 1234567890"));
/// assert!(!validate_phone_number("12345"));
/// ```
pub fn validate_phone_number(phone_number: &str) -> bool {
    phone_number_regex().is_match(phone_number)
}

/// Field-keyed messages reported by the backend or by local checks.
///
/// Serialises as the backend's error body: `{"email": ["Email already exists"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMessages(BTreeMap<String, Vec<String>>);

impl FieldMessages {
    /// Messages holding a single entry.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(BTreeMap::from([(field.into(), vec![message.into()])]))
    }

    /// Messages recorded against `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Whether `field` has at least one message.
    pub fn has_error(&self, field: &str) -> bool {
        self.get(field).is_some_and(|messages| !messages.is_empty())
    }

    /// Whether no field has a message.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Iterate over `(field, messages)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl From<BTreeMap<String, Vec<String>>> for FieldMessages {
    fn from(value: BTreeMap<String, Vec<String>>) -> Self {
        Self(value)
    }
}

impl fmt::Display for FieldMessages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

/// Whether the draft carries a message for `field`.
///
/// True only when the draft's message map is present and holds a non-empty
/// entry for the field.
pub fn field_has_error(field: impl AsRef<str>, draft: &EmployeeDraft) -> bool {
    draft
        .message
        .as_ref()
        .is_some_and(|messages| messages.has_error(field.as_ref()))
}

#[cfg(test)]
mod tests {
    //! Covers phone validation and message lookup.

    use rstest::rstest;

    use super::*;
    use crate::domain::EmployeeField;

    #[rstest]
    #[case("1234567890", true)]
    #[case("+44 1234567890", true)]
    #[case("+1-1234567890", true)]
    #[case("+3531234567890", true)]
    #[case("12345", false)]
    #[case("+123-12345678901", false)]
    #[case("+12345 1234567890", false)]
    #[case("123-456-7890", false)]
    #[case("", false)]
    #[case(" 1234567890", false)]
    fn phone_numbers(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(validate_phone_number(input), expected);
    }

    #[test]
    fn messages_render_field_by_field() {
        let messages = FieldMessages::from(BTreeMap::from([
            ("postcode".to_owned(), vec!["Postcode must be 4 characters".to_owned()]),
            ("email".to_owned(), vec!["Email already exists".to_owned()]),
        ]));
        assert_eq!(
            messages.to_string(),
            "email: Email already exists; postcode: Postcode must be 4 characters"
        );
    }

    #[test]
    fn messages_decode_from_backend_error_body() {
        let messages: FieldMessages =
            serde_json::from_str(r#"{"email": ["Enter a valid email address."]}"#).expect("decode");
        assert!(messages.has_error("email"));
        assert!(!messages.has_error("city"));
    }

    #[test]
    fn field_has_error_requires_a_message_map() {
        let draft = EmployeeDraft::default();
        assert!(!field_has_error(EmployeeField::Email, &draft));
    }

    #[test]
    fn field_has_error_ignores_empty_entries() {
        let draft = EmployeeDraft {
            message: Some(FieldMessages::from(BTreeMap::from([(
                "email".to_owned(),
                Vec::new(),
            )]))),
            ..EmployeeDraft::default()
        };
        assert!(!field_has_error("email", &draft));
    }

    #[test]
    fn field_has_error_finds_populated_entries() {
        let draft = EmployeeDraft {
            message: Some(FieldMessages::single("email", "Email already exists")),
            ..EmployeeDraft::default()
        };
        assert!(field_has_error(EmployeeField::Email, &draft));
        assert!(!field_has_error(EmployeeField::FirstName, &draft));
    }
}
