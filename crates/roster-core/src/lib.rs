//! Roster Core - Student records, validation rules, and the in-memory store.
//!
//! This crate holds the domain logic of the roster service. It knows nothing
//! about HTTP; the server crate maps its errors to status codes.

pub mod error;
pub mod model;
pub mod stats;
pub mod store;
pub mod validation;

// Re-exports for convenience
pub use error::{StoreError, ValidationError};
pub use model::{NewStudent, Student, StudentId, StudentPatch};
pub use stats::Statistics;
pub use store::{StoreResult, StudentStore};
pub use validation::{calculate_age, email_is_well_formed, gpa_in_range, is_adult, Validator};
