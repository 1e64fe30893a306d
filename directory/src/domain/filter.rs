//! Structured employee list filter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Criteria narrowing the employee list.
///
/// Text criteria match case-insensitively as substrings. `skills` matches
/// employees holding any of the named skills. The date-of-birth range is
/// inclusive on both ends. Unset criteria do not constrain the list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFilter {
    /// Substring of the first name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Substring of the last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Substring of the e-mail address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Exact skill names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    /// Exact date of birth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    /// Earliest date of birth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date_of_birth: Option<NaiveDate>,
    /// Latest date of birth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date_of_birth: Option<NaiveDate>,
}

impl EmployeeFilter {
    /// Whether no criterion is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Restrict to employees holding `skill`.
    #[must_use]
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }

    /// Restrict to employees born within `start..=end`.
    #[must_use]
    pub fn born_between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date_of_birth = Some(start);
        self.end_date_of_birth = Some(end);
        self
    }

    /// Whether the date range is inverted and can never match.
    pub fn has_inverted_range(&self) -> bool {
        matches!(
            (self.start_date_of_birth, self.end_date_of_birth),
            (Some(start), Some(end)) if start > end
        )
    }
}
