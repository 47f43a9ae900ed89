//! User domain model.
//!
//! # Responsibility
//! - Define the persisted user record and its creation/replacement candidate.
//! - Derive the reported age and the duplicate-person identity key.
//!
//! # Invariants
//! - `id` is assigned on insert and immutable afterwards.
//! - Two users never share the same identity key.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable user identifier.
pub type UserId = Uuid;

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
}

impl User {
    /// Builds a record from validated fields and a storage-assigned id.
    pub fn from_fields(id: UserId, fields: UserFields) -> Self {
        Self {
            id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            birth_date: fields.birth_date,
        }
    }

    /// Reported age: calendar year difference, birthday not considered.
    ///
    /// This differs from the whole-year age used by validation.
    pub fn age(&self, today: NaiveDate) -> i32 {
        today.year() - self.birth_date.year()
    }

    /// Key used for duplicate-person detection.
    pub fn identity_key(&self) -> String {
        identity_key(&self.first_name, &self.last_name, self.birth_date)
    }

    /// Replaces all mutable fields.
    pub fn replace_fields(&mut self, fields: UserFields) {
        self.first_name = fields.first_name;
        self.last_name = fields.last_name;
        self.birth_date = fields.birth_date;
    }
}

/// Unvalidated user candidate, used for creation and full replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl UserDraft {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            birth_date: Some(birth_date),
        }
    }
}

/// User fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
}

impl UserFields {
    pub fn identity_key(&self) -> String {
        identity_key(&self.first_name, &self.last_name, self.birth_date)
    }
}

/// Case-insensitive names plus exact birth date.
pub fn identity_key(first_name: &str, last_name: &str, birth_date: NaiveDate) -> String {
    format!(
        "{}\u{1f}{}\u{1f}{}",
        first_name.to_lowercase(),
        last_name.to_lowercase(),
        birth_date.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::{identity_key, User};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_is_year_difference_ignoring_birthday() {
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Ana".to_string(),
            last_name: "Lima".to_string(),
            birth_date: date(2000, 12, 31),
        };
        assert_eq!(user.age(date(2025, 1, 1)), 25);
    }

    #[test]
    fn identity_key_ignores_name_case_only() {
        let birth = date(1990, 1, 15);
        assert_eq!(
            identity_key("João", "SILVA", birth),
            identity_key("joão", "silva", birth)
        );
        assert_ne!(
            identity_key("Ana", "Lima", birth),
            identity_key("Ana", "Lima", date(1990, 1, 16))
        );
    }
}
