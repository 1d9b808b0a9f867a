//! # Error
//!
//! Centralized error taxonomy for the whole workspace. Services map every
//! repository failure into one of these kinds; the message strings of
//! permission and state violations are stable and matched by tests.

use thiserror::Error;

/// Error kinds, aligned with RPC status-code semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    InvalidArgument,
    FailedPrecondition,
    AlreadyExists,
    Unauthenticated,
    Internal,
}

/// The primary error type for all core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Requested entity is absent. Row-absent conditions from storage are
    /// always translated into this variant.
    #[error("{0}")]
    NotFound(String),

    /// Ownership or archival-state violation.
    #[error("{0}")]
    PermissionDenied(String),

    /// Validation failure; the message names the offending field.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation rejected because the system is not in the required state.
    #[error("{0}")]
    FailedPrecondition(String),

    /// An entity with the same identity already exists.
    #[error("{0}")]
    AlreadyExists(String),

    /// Caller identity is missing or invalid.
    #[error("invalid credentials")]
    Unauthenticated,

    /// Unexpected infrastructure failure. The underlying cause is logged at
    /// the point of classification and not exposed verbatim to callers.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::FailedPrecondition(_) => ErrorKind::FailedPrecondition,
            Error::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Error::Unauthenticated => ErrorKind::Unauthenticated,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Error::PermissionDenied(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Validation error naming the offending field.
    pub fn invalid_field(field: &str, reason: &str) -> Self {
        Error::InvalidArgument(format!("{field}: {reason}"))
    }

    pub fn failed_precondition(msg: impl Into<String>) -> Self {
        Error::FailedPrecondition(msg.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Error::AlreadyExists(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            Error::permission_denied("event is archived").kind(),
            ErrorKind::PermissionDenied
        );
        assert_eq!(Error::Unauthenticated.kind(), ErrorKind::Unauthenticated);
    }

    #[test]
    fn invalid_field_names_the_field() {
        let err = Error::invalid_field("start_time", "bad value");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("start_time"));
    }
}
