use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;
use crate::model::{NewStudent, StudentPatch};

/// Lowest accepted GPA, inclusive.
pub const MIN_GPA: f64 = 0.0;
/// Highest accepted GPA, inclusive.
pub const MAX_GPA: f64 = 4.0;
/// Minimum age in full years for a student record.
pub const MIN_AGE: i32 = 18;

// Basic address shape only: local@domain.suffix without whitespace or extra '@'.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// True iff `gpa` lies in `[0, 4.0]`. NaN is out of range.
pub fn gpa_in_range(gpa: f64) -> bool {
    (MIN_GPA..=MAX_GPA).contains(&gpa)
}

/// Full years elapsed between `date_of_birth` and `on`.
///
/// One is subtracted from the naive year difference when the month/day of
/// `on` falls before the birthday's month/day. Born in the future yields a
/// negative age.
pub fn calculate_age(date_of_birth: NaiveDate, on: NaiveDate) -> i32 {
    let mut age = on.year() - date_of_birth.year();
    if (on.month(), on.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// True iff the person is at least [`MIN_AGE`] years old on `on`.
pub fn is_adult(date_of_birth: NaiveDate, on: NaiveDate) -> bool {
    calculate_age(date_of_birth, on) >= MIN_AGE
}

pub fn email_is_well_formed(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Business rule checks for student data.
pub struct Validator;

impl Validator {
    /// Validate GPA bounds.
    pub fn validate_gpa(gpa: f64) -> Result<(), ValidationError> {
        if !gpa_in_range(gpa) {
            return Err(ValidationError::GpaOutOfRange(gpa));
        }
        Ok(())
    }

    /// Validate that the student is an adult on `today`.
    pub fn validate_age(date_of_birth: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
        let age = calculate_age(date_of_birth, today);
        if age < MIN_AGE {
            return Err(ValidationError::Underage(age));
        }
        Ok(())
    }

    /// Validate email shape.
    pub fn validate_email(email: &str) -> Result<(), ValidationError> {
        if !email_is_well_formed(email) {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }
        Ok(())
    }

    /// Validate a full record: GPA, then age, then email.
    pub fn validate_new_student(
        student: &NewStudent,
        today: NaiveDate,
    ) -> Result<(), ValidationError> {
        Self::validate_gpa(student.gpa)?;
        Self::validate_age(student.date_of_birth, today)?;
        Self::validate_email(&student.email)?;
        Ok(())
    }

    /// Validate the supplied fields of a patch in the same order as
    /// [`Validator::validate_new_student`]. Absent fields are skipped.
    pub fn validate_patch(patch: &StudentPatch, today: NaiveDate) -> Result<(), ValidationError> {
        if let Some(gpa) = patch.gpa {
            Self::validate_gpa(gpa)?;
        }
        if let Some(date_of_birth) = patch.date_of_birth {
            Self::validate_age(date_of_birth, today)?;
        }
        if let Some(email) = &patch.email {
            Self::validate_email(email)?;
        }
        Ok(())
    }
}
