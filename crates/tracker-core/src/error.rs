//! Error types for the tracker core.
//!
//! The core is infallible for derivations (calendar, digest, ordering).
//! Errors only come from validating user input before it is sent to the
//! store.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A required form field was empty after trimming.
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),

    #[error("unknown role {0:?}")]
    UnknownRole(String),

    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}
