//! Application error types for session-booking
//!
//! This module defines common error types used throughout the application.
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Token verification failures
///
/// Verification failure is an ordinary outcome for the caller, so every
/// variant is returned as a value and never escalated to a panic.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VerifyError {
    /// Blank input
    #[error("JWT claims string is empty")]
    Empty,

    /// Not a three-segment compact token
    #[error("Invalid JWT token")]
    Malformed,

    /// Signature does not match the server secret
    #[error("Invalid JWT signature")]
    BadSignature,

    /// Current time is past the expiry claim
    #[error("JWT token is expired")]
    Expired,

    /// Structurally valid but uses a disallowed algorithm or claim set
    #[error("JWT token is unsupported")]
    Unsupported,
}

impl VerifyError {
    /// Returns true when the input could not be parsed as a token at all
    pub fn is_malformed(&self) -> bool {
        matches!(self, VerifyError::Empty | VerifyError::Malformed)
    }

    /// Short label used in log fields and metric attributes
    pub fn kind(&self) -> &'static str {
        match self {
            VerifyError::Empty => "empty",
            VerifyError::Malformed => "malformed",
            VerifyError::BadSignature => "bad_signature",
            VerifyError::Expired => "expired",
            VerifyError::Unsupported => "unsupported",
        }
    }
}

/// Authentication-related errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    /// Unknown username or wrong password
    #[error("Bad credentials")]
    BadCredentials,

    /// Token could not be signed
    #[error("Failed to issue token: {0}")]
    TokenIssue(String),

    /// Password hashing failed
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DbError {
    /// SQLite error
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection worker error
    #[error("Database connection error: {0}")]
    Connection(#[from] tokio_rusqlite::Error),

    /// Record not found
    #[error("Record not found")]
    NotFound,

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Errors raised by the service layer
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Referenced resource does not exist
    #[error("Resource not found")]
    NotFound,

    /// Requested transition is not valid for the current state
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Registration with an email already on file
    #[error("Error: Email is already taken!")]
    EmailTaken,

    /// Acting principal does not own the resource
    #[error("Not allowed to modify this resource")]
    Unauthorized,

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test 1: Error message formatting
    #[test]
    fn test_auth_error_messages() {
        assert_eq!(AuthError::BadCredentials.to_string(), "Bad credentials");
        assert_eq!(
            AuthError::TokenIssue("bad key".to_string()).to_string(),
            "Failed to issue token: bad key"
        );
        assert_eq!(
            AuthError::PasswordHash("salt".to_string()).to_string(),
            "Password hashing failed: salt"
        );
    }

    // Test 2: VerifyError messages
    #[test]
    fn test_verify_error_messages() {
        assert_eq!(VerifyError::Empty.to_string(), "JWT claims string is empty");
        assert_eq!(VerifyError::Malformed.to_string(), "Invalid JWT token");
        assert_eq!(VerifyError::BadSignature.to_string(), "Invalid JWT signature");
        assert_eq!(VerifyError::Expired.to_string(), "JWT token is expired");
        assert_eq!(VerifyError::Unsupported.to_string(), "JWT token is unsupported");
    }

    // Test 3: Empty input counts as malformed
    #[test]
    fn test_verify_error_is_malformed() {
        assert!(VerifyError::Empty.is_malformed());
        assert!(VerifyError::Malformed.is_malformed());
        assert!(!VerifyError::BadSignature.is_malformed());
        assert!(!VerifyError::Expired.is_malformed());
        assert!(!VerifyError::Unsupported.is_malformed());
    }

    // Test 4: VerifyError kind labels
    #[test]
    fn test_verify_error_kind() {
        assert_eq!(VerifyError::Empty.kind(), "empty");
        assert_eq!(VerifyError::BadSignature.kind(), "bad_signature");
        assert_eq!(VerifyError::Expired.kind(), "expired");
    }

    // Test 5: From trait conversions for ServiceError
    #[test]
    fn test_service_error_from_auth_error() {
        let err: ServiceError = AuthError::BadCredentials.into();

        match err {
            ServiceError::Auth(AuthError::BadCredentials) => (),
            _ => panic!("Expected ServiceError::Auth(AuthError::BadCredentials)"),
        }
    }

    // Test 6: ServiceError from DbError
    #[test]
    fn test_service_error_from_db_error() {
        let err: ServiceError = DbError::NotFound.into();

        match err {
            ServiceError::Database(DbError::NotFound) => (),
            _ => panic!("Expected ServiceError::Database(DbError::NotFound)"),
        }
    }

    // Test 7: EmailTaken carries the registration conflict message
    #[test]
    fn test_email_taken_message() {
        assert_eq!(
            ServiceError::EmailTaken.to_string(),
            "Error: Email is already taken!"
        );
    }

    // Test 8: DbError messages
    #[test]
    fn test_db_error_messages() {
        assert_eq!(DbError::NotFound.to_string(), "Record not found");
        assert_eq!(
            DbError::ConstraintViolation("unique".to_string()).to_string(),
            "Constraint violation: unique"
        );
    }

    // Test 9: DbError from rusqlite::Error
    #[test]
    fn test_db_error_from_sqlite() {
        let sqlite_err = rusqlite::Error::InvalidParameterName("test".to_string());
        let db_err: DbError = sqlite_err.into();

        match db_err {
            DbError::Sqlite(_) => (),
            _ => panic!("Expected DbError::Sqlite"),
        }
    }

    // Test 10: AuthError Clone and PartialEq
    #[test]
    fn test_auth_error_clone_and_eq() {
        let err1 = AuthError::TokenIssue("a".to_string());
        let err2 = err1.clone();
        assert_eq!(err1, err2);
        assert_ne!(err1, AuthError::BadCredentials);
    }
}
