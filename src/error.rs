//! Library error types.

use thiserror::Error;

use crate::auth::{Capability, Role};

/// Failures talking to the rental backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected agency listing payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Failures of the login attempt store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("attempt store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("attempt store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A role lacks a capability
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("role {role} is not allowed to {capability}")]
pub struct AccessError {
    pub role: Role,
    pub capability: Capability,
}

/// A single field failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("this field is required")]
    Required,
    #[error("must be at most {max} characters")]
    TooLong { max: usize },
    #[error("invalid email address")]
    InvalidEmail,
    #[error("invalid phone number")]
    InvalidPhone,
    #[error("postal code must have 4 or 5 digits")]
    InvalidPostalCode,
    #[error("URL must start with http:// or https://")]
    InvalidUrl,
    #[error("year must be between {min} and {max}")]
    YearOutOfRange { min: i32, max: i32 },
    #[error("price must be greater than 0 and at most {max}")]
    InvalidPrice { max: u32 },
    #[error("seats must be between 1 and {max}")]
    InvalidSeats { max: u8 },
    #[error("invalid registration number")]
    InvalidRegistration,
    #[error("must not be negative")]
    Negative,
    #[error("unknown value '{0}'")]
    UnknownChoice(String),
}
