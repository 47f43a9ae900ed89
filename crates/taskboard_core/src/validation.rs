//! Business-rule validation for user and task candidates.
//!
//! # Responsibility
//! - Check candidates against field and date rules before any write.
//! - Turn a valid candidate into the typed field set persisted by services.
//!
//! # Invariants
//! - Pure: no I/O, "today" is supplied by the caller.
//! - Rules run in a fixed order and the first failure is reported.
//! - Lengths are counted in Unicode scalar values.

use crate::model::task::{Priority, TaskDraft, TaskFields, TaskStatus};
use crate::model::user::{UserDraft, UserFields, UserId};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const TAGS_MAX_CHARS: usize = 100;
pub const FIRST_NAME_MAX_CHARS: usize = 30;
pub const LAST_NAME_MAX_CHARS: usize = 100;
pub const MIN_AGE_YEARS: u32 = 18;
pub const MAX_AGE_YEARS: u32 = 100;

/// A candidate violated a business rule. `Display` is the client-facing reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    TitleInvalid,
    DescriptionTooLong,
    EndDateMissing,
    EndDateInPast,
    CreatorMissing,
    AssigneeMissing,
    TagsTooLong,
    PriorityOutOfRange,
    StatusMissing,
    StatusUnknown(String),
    CreatorNotFound(UserId),
    AssigneeNotFound(UserId),
    FirstNameInvalid,
    LastNameInvalid,
    BirthDateMissing,
    UserTooYoung,
    UserTooOld,
    DuplicateUser,
}

impl ValidationError {
    /// Human-readable reason returned to clients.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TitleInvalid => write!(
                f,
                "Title must not be empty and must be less than {TITLE_MAX_CHARS} characters"
            ),
            Self::DescriptionTooLong => write!(
                f,
                "Description must be less than {DESCRIPTION_MAX_CHARS} characters"
            ),
            Self::EndDateMissing => write!(f, "End date must not be null"),
            Self::EndDateInPast => write!(f, "Please enter a valid date from today onwards"),
            Self::CreatorMissing => write!(f, "Creator must not be null"),
            Self::AssigneeMissing => write!(f, "Assignee must not be null"),
            Self::TagsTooLong => write!(f, "Tags must be less than {TAGS_MAX_CHARS} characters"),
            Self::PriorityOutOfRange => write!(
                f,
                "Priority must be between {} and {}",
                Priority::MIN,
                Priority::MAX
            ),
            Self::StatusMissing => write!(f, "Status must not be empty"),
            Self::StatusUnknown(_) => {
                let allowed = TaskStatus::ALL
                    .iter()
                    .map(|status| status.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Status must be one of {allowed}")
            }
            Self::CreatorNotFound(_) => write!(f, "Creator does not exist"),
            Self::AssigneeNotFound(_) => write!(f, "Assignee does not exist"),
            Self::FirstNameInvalid => write!(
                f,
                "First name must not be empty and must be less than {FIRST_NAME_MAX_CHARS} characters"
            ),
            Self::LastNameInvalid => write!(
                f,
                "Last name must not be empty and must be less than {LAST_NAME_MAX_CHARS} characters"
            ),
            Self::BirthDateMissing => write!(f, "Birth date must not be null"),
            Self::UserTooYoung => {
                write!(f, "User must be at least {MIN_AGE_YEARS} years old")
            }
            Self::UserTooOld => write!(f, "User must be at most {MAX_AGE_YEARS} years old"),
            Self::DuplicateUser => write!(f, "User already registered"),
        }
    }
}

impl Error for ValidationError {}

/// Validates a task candidate against `today`.
pub fn validate_task(candidate: &TaskDraft, today: NaiveDate) -> Result<TaskFields, ValidationError> {
    let title = match candidate.title.as_deref() {
        Some(title) if is_present_within(title, TITLE_MAX_CHARS) => title.to_string(),
        _ => return Err(ValidationError::TitleInvalid),
    };

    if let Some(description) = candidate.description.as_deref() {
        if char_len(description) > DESCRIPTION_MAX_CHARS {
            return Err(ValidationError::DescriptionTooLong);
        }
    }

    let end_date = candidate.end_date.ok_or(ValidationError::EndDateMissing)?;
    if end_date < today {
        return Err(ValidationError::EndDateInPast);
    }

    let creator_id = candidate.creator_id.ok_or(ValidationError::CreatorMissing)?;
    let assignee_id = candidate.assignee_id.ok_or(ValidationError::AssigneeMissing)?;

    if let Some(tags) = candidate.tags.as_deref() {
        if char_len(tags) > TAGS_MAX_CHARS {
            return Err(ValidationError::TagsTooLong);
        }
    }

    let priority = candidate
        .priority
        .and_then(Priority::new)
        .ok_or(ValidationError::PriorityOutOfRange)?;

    let status = match candidate.status.as_deref() {
        Some(status) if !status.trim().is_empty() => status
            .parse::<TaskStatus>()
            .map_err(|err| ValidationError::StatusUnknown(err.0))?,
        _ => return Err(ValidationError::StatusMissing),
    };

    Ok(TaskFields {
        title,
        description: candidate.description.clone(),
        end_date,
        creator_id,
        assignee_id,
        tags: candidate.tags.clone(),
        priority,
        status,
    })
}

/// Validates a user candidate against `today`.
pub fn validate_user(candidate: &UserDraft, today: NaiveDate) -> Result<UserFields, ValidationError> {
    let first_name = match candidate.first_name.as_deref() {
        Some(name) if is_present_within(name, FIRST_NAME_MAX_CHARS) => name.to_string(),
        _ => return Err(ValidationError::FirstNameInvalid),
    };

    let last_name = match candidate.last_name.as_deref() {
        Some(name) if is_present_within(name, LAST_NAME_MAX_CHARS) => name.to_string(),
        _ => return Err(ValidationError::LastNameInvalid),
    };

    let birth_date = candidate.birth_date.ok_or(ValidationError::BirthDateMissing)?;

    // None: birth date lies after today.
    match today.years_since(birth_date) {
        Some(age) if age > MAX_AGE_YEARS => return Err(ValidationError::UserTooOld),
        Some(age) if age >= MIN_AGE_YEARS => {}
        _ => return Err(ValidationError::UserTooYoung),
    }

    Ok(UserFields {
        first_name,
        last_name,
        birth_date,
    })
}

fn is_present_within(value: &str, max_chars: usize) -> bool {
    !value.trim().is_empty() && char_len(value) <= max_chars
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

#[cfg(test)]
mod tests {
    use super::{validate_user, ValidationError};
    use crate::model::user::UserDraft;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn check_age(birth_date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
        validate_user(&UserDraft::new("Rita", "Moura", birth_date), today).map(|_| ())
    }

    #[test]
    fn age_counts_only_completed_birthdays() {
        assert_eq!(
            check_age(date(2000, 6, 15), date(2018, 6, 14)),
            Err(ValidationError::UserTooYoung)
        );
        assert_eq!(check_age(date(2000, 6, 15), date(2018, 6, 15)), Ok(()));
        assert_eq!(
            check_age(date(2008, 2, 29), date(2026, 2, 28)),
            Err(ValidationError::UserTooYoung)
        );
        assert_eq!(check_age(date(2008, 2, 29), date(2026, 3, 1)), Ok(()));
    }

    #[test]
    fn future_birth_date_is_too_young() {
        assert_eq!(
            check_age(date(2030, 1, 1), date(2026, 1, 1)),
            Err(ValidationError::UserTooYoung)
        );
    }

    #[test]
    fn reference_reasons_carry_no_ids() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            ValidationError::CreatorNotFound(id).reason(),
            "Creator does not exist"
        );
        assert_eq!(
            ValidationError::AssigneeNotFound(id).reason(),
            "Assignee does not exist"
        );
        assert_eq!(
            ValidationError::StatusUnknown("ARCHIVED".to_string()).reason(),
            "Status must be one of TODO, IN_PROGRESS, DONE, CANCELLED"
        );
    }
}
