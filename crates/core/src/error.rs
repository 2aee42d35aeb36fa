//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation,
/// invariants, lifecycle guards). Infrastructure concerns belong elsewhere.
/// Every variant is a user-visible validation failure surfaced synchronously
/// to the caller; none of these warrant a retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A globally-unique identifying number (VIN) is already taken.
    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    /// A non-owner classification is missing its vendor or commission terms.
    #[error("incomplete classification: {0}")]
    IncompleteClassification(String),

    /// An illegal lifecycle move was requested.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// A sale or return referenced a serial number no vehicle carries.
    #[error("unknown serial: {0}")]
    UnknownSerial(String),

    /// A conflict occurred (e.g. record already exists).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn duplicate_identifier(vin: impl Into<String>) -> Self {
        Self::DuplicateIdentifier(vin.into())
    }

    pub fn incomplete_classification(msg: impl Into<String>) -> Self {
        Self::IncompleteClassification(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn unknown_serial(serial: impl Into<String>) -> Self {
        Self::UnknownSerial(serial.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
