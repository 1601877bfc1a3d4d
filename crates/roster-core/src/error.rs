use thiserror::Error;

use crate::model::StudentId;

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Student not found")]
    NotFound(StudentId),

    #[error("Internal store error: {0}")]
    Internal(String),
}

/// A business rule a student record failed.
///
/// The messages are part of the public contract and are returned to API
/// callers verbatim.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("GPA must be between 0 and 4.0")]
    GpaOutOfRange(f64),

    #[error("Student must be at least 18 years old")]
    Underage(i32),

    #[error("Invalid email format")]
    InvalidEmail(String),
}
