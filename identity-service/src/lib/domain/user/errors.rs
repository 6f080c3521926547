use auth::PasswordError;
use auth::TokenClass;
use auth::TokenError;
use thiserror::Error;

use crate::domain::validation::ValidationErrorSet;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Failures reported by a user repository.
///
/// "Not found" is not an error: lookups return `Ok(None)`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Email already exists: {0}")]
    EmailTaken(String),

    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Top-level error for authentication operations.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Validation failures: returned as data, never logged as faults
    #[error("Validation failed: {0}")]
    Validation(ValidationErrorSet),

    // Authentication failures
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(TokenError),

    #[error("Expected an access token, got a {0} token")]
    WrongTokenClass(TokenClass),

    #[error("No user for token subject {0}")]
    IdentityNotFound(String),

    // Conflicts
    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(&'static str),

    // Internal failures
    #[error("{operation}: password hashing failed: {source}")]
    PasswordHashing {
        operation: &'static str,
        source: PasswordError,
    },

    #[error("{operation}: token issuance failed: {source}")]
    TokenIssuance {
        operation: &'static str,
        source: TokenError,
    },

    #[error("{operation}: {source}")]
    Repository {
        operation: &'static str,
        source: RepositoryError,
    },

    #[error("{0}")]
    Internal(String),
}

impl AuthError {
    /// Which unique field collided, for conflict errors.
    pub fn conflict_field(&self) -> Option<&'static str> {
        match self {
            AuthError::EmailAlreadyExists(_) => Some("email"),
            AuthError::UsernameAlreadyExists(_) => Some("username"),
            _ => None,
        }
    }

    /// Errors that surface to clients as a uniform "unauthorized".
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::InvalidToken(_)
                | AuthError::WrongTokenClass(_)
                | AuthError::IdentityNotFound(_)
        )
    }

    /// Short diagnostic label, safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "validation",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InvalidToken(e) => e.kind(),
            AuthError::WrongTokenClass(_) => "wrong_token_class",
            AuthError::IdentityNotFound(_) => "identity_not_found",
            AuthError::EmailAlreadyExists(_) | AuthError::UsernameAlreadyExists(_) => "conflict",
            AuthError::Cancelled(_) => "cancelled",
            AuthError::PasswordHashing { .. } => "password_hashing",
            AuthError::TokenIssuance { .. } => "token_issuance",
            AuthError::Repository { .. } => "repository",
            AuthError::Internal(_) => "internal",
        }
    }
}

impl From<ValidationErrorSet> for AuthError {
    fn from(errors: ValidationErrorSet) -> Self {
        AuthError::Validation(errors)
    }
}
