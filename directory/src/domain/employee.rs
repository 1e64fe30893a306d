//! Employee and skill records exchanged with the directory backend.
//!
//! Records are deliberately permissive: drafts carry empty strings until the
//! user fills them in, and the backend may return `null` for optional
//! address fields. Both shapes deserialise into the same [`EmployeeRecord`].
//!
//! Serialisation contract: field names match the REST payloads
//! (`first_name`, `contact_number`, ...). Optional identities and server
//! timestamps are omitted when absent, so a draft never serialises an `id`
//! key.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Backend-issued employee identifier (two letters followed by four digits).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(String);

impl EmployeeId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for EmployeeId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend-issued skill identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(u64);

impl SkillId {
    /// Wrap a raw identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Numeric value of the identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A skill held by an employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    /// Identifier, absent until the backend persists the skill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SkillId>,
    /// Skill name, e.g. `Rust`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Years of experience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yrs_exp: Option<u32>,
    /// Seniority label, e.g. `Senior`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub seniority: String,
    /// Owning employee; only sent when creating the skill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<EmployeeId>,
}

impl SkillRecord {
    /// Build an unsaved skill.
    pub fn new(name: impl Into<String>, yrs_exp: u32, seniority: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            yrs_exp: Some(yrs_exp),
            seniority: seniority.into(),
            employee: None,
        }
    }

    /// Whether the skill carries enough data to be created remotely.
    ///
    /// Name and seniority must be non-empty and `yrs_exp` must be positive;
    /// a skill with zero years of experience is treated as unfinished.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.seniority.is_empty() && self.yrs_exp.is_some_and(|y| y > 0)
    }

    /// Copy of this skill bound to `employee`, ready for creation.
    pub fn for_employee(&self, employee: &EmployeeId) -> Self {
        Self {
            id: None,
            employee: Some(employee.clone()),
            ..self.clone()
        }
    }
}

/// An employee record as edited by the directory UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Identifier; `None` for drafts that have never been saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EmployeeId>,
    /// Given name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    /// Family name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    /// Date of birth as entered (`YYYY-MM-DD` once complete).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date_of_birth: String,
    /// Contact e-mail address.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    /// Phone number.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contact_number: String,
    /// Street address.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub street_address: String,
    /// City.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city: String,
    /// State or region.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub state: String,
    /// Postal code.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub postcode: String,
    /// ISO country short code.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub country: String,
    /// Skills held by the employee.
    #[serde(default)]
    pub skills: Vec<SkillRecord>,
    /// Server creation timestamp, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Server modification timestamp, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl EmployeeRecord {
    /// The blank record a create form starts from.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read one editable field.
    pub fn field(&self, field: EmployeeField) -> FieldValue {
        match field {
            EmployeeField::Skills => FieldValue::Skills(self.skills.clone()),
            text => FieldValue::Text(self.text_slot(text).map(String::clone).unwrap_or_default()),
        }
    }

    /// Write one editable field.
    ///
    /// The country field accepts only a [`CountrySelection`] and stores its
    /// short code; the skills field accepts only a skill list; every other
    /// field accepts text verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ValueKindMismatch`] when the value kind does not fit the
    /// field. The record is left untouched in that case.
    pub fn assign(&mut self, field: EmployeeField, value: FieldValue) -> Result<(), ValueKindMismatch> {
        let expected = field.value_kind();
        match (field, value) {
            (EmployeeField::Skills, FieldValue::Skills(skills)) => {
                self.skills = skills;
                Ok(())
            }
            (EmployeeField::Country, FieldValue::Country(selection)) => {
                self.country = selection.country_short_code;
                Ok(())
            }
            (_, FieldValue::Text(text)) if expected == ValueKind::Text => {
                if let Some(slot) = self.text_slot_mut(field) {
                    *slot = text;
                }
                Ok(())
            }
            (_, value) => Err(ValueKindMismatch {
                field,
                expected,
                found: value.kind(),
            }),
        }
    }

    fn text_slot(&self, field: EmployeeField) -> Option<&String> {
        match field {
            EmployeeField::FirstName => Some(&self.first_name),
            EmployeeField::LastName => Some(&self.last_name),
            EmployeeField::DateOfBirth => Some(&self.date_of_birth),
            EmployeeField::Email => Some(&self.email),
            EmployeeField::ContactNumber => Some(&self.contact_number),
            EmployeeField::StreetAddress => Some(&self.street_address),
            EmployeeField::City => Some(&self.city),
            EmployeeField::State => Some(&self.state),
            EmployeeField::Postcode => Some(&self.postcode),
            EmployeeField::Country => Some(&self.country),
            EmployeeField::Skills => None,
        }
    }

    fn text_slot_mut(&mut self, field: EmployeeField) -> Option<&mut String> {
        match field {
            EmployeeField::FirstName => Some(&mut self.first_name),
            EmployeeField::LastName => Some(&mut self.last_name),
            EmployeeField::DateOfBirth => Some(&mut self.date_of_birth),
            EmployeeField::Email => Some(&mut self.email),
            EmployeeField::ContactNumber => Some(&mut self.contact_number),
            EmployeeField::StreetAddress => Some(&mut self.street_address),
            EmployeeField::City => Some(&mut self.city),
            EmployeeField::State => Some(&mut self.state),
            EmployeeField::Postcode => Some(&mut self.postcode),
            EmployeeField::Country => Some(&mut self.country),
            EmployeeField::Skills => None,
        }
    }
}

/// Editable fields of an [`EmployeeRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmployeeField {
    /// `first_name`
    FirstName,
    /// `last_name`
    LastName,
    /// `date_of_birth`
    DateOfBirth,
    /// `email`
    Email,
    /// `contact_number`
    ContactNumber,
    /// `street_address`
    StreetAddress,
    /// `city`
    City,
    /// `state`
    State,
    /// `postcode`
    Postcode,
    /// `country`
    Country,
    /// `skills`
    Skills,
}

impl EmployeeField {
    /// Every editable field, in form order.
    pub const ALL: [Self; 11] = [
        Self::FirstName,
        Self::LastName,
        Self::DateOfBirth,
        Self::Email,
        Self::ContactNumber,
        Self::StreetAddress,
        Self::City,
        Self::State,
        Self::Postcode,
        Self::Country,
        Self::Skills,
    ];

    /// Wire name of the field, also used as the key in server messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::DateOfBirth => "date_of_birth",
            Self::Email => "email",
            Self::ContactNumber => "contact_number",
            Self::StreetAddress => "street_address",
            Self::City => "city",
            Self::State => "state",
            Self::Postcode => "postcode",
            Self::Country => "country",
            Self::Skills => "skills",
        }
    }

    /// Look a field up by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }

    /// Kind of value a write to this field must carry.
    pub const fn value_kind(self) -> ValueKind {
        match self {
            Self::Country => ValueKind::Country,
            Self::Skills => ValueKind::Skills,
            _ => ValueKind::Text,
        }
    }
}

impl AsRef<str> for EmployeeField {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EmployeeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rich value produced by a country picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySelection {
    /// ISO short code, e.g. `US`.
    pub country_short_code: String,
    /// Display name, e.g. `United States`.
    pub name: String,
}

impl CountrySelection {
    /// Build a selection from its code and display name.
    pub fn new(country_short_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            country_short_code: country_short_code.into(),
            name: name.into(),
        }
    }
}

/// A value read from or written to an [`EmployeeField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Plain text input.
    Text(String),
    /// Country picker selection.
    Country(CountrySelection),
    /// Full skill list.
    Skills(Vec<SkillRecord>),
}

impl FieldValue {
    /// Convenience constructor for text input.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Kind tag of this value.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Country(_) => ValueKind::Country,
            Self::Skills(_) => ValueKind::Skills,
        }
    }

    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Kind tag used to match values against fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Plain text.
    Text,
    /// Country selection.
    Country,
    /// Skill list.
    Skills,
}

/// A write carried a value of the wrong kind for its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("field {field} expects a {expected:?} value, got {found:?}")]
pub struct ValueKindMismatch {
    /// Field that was written.
    pub field: EmployeeField,
    /// Kind the field accepts.
    pub expected: ValueKind,
    /// Kind that was supplied.
    pub found: ValueKind,
}
