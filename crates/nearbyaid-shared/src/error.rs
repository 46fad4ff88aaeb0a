use thiserror::Error;

/// A rejected input, tagged with the field that caused it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: ValidationReason) -> Self {
        Self { field, reason }
    }

    pub fn missing(field: &'static str) -> Self {
        Self::new(field, ValidationReason::Missing)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    #[error("is required")]
    Missing,

    #[error("cannot be more than {max} characters")]
    TooLong { max: usize },

    #[error("must be at least {min} characters")]
    TooShort { min: usize },

    #[error("must be a number")]
    NotANumber,

    #[error("is out of range")]
    OutOfRange,

    #[error("'{0}' is not a valid choice")]
    InvalidChoice(String),

    #[error("is malformed")]
    Malformed,
}
