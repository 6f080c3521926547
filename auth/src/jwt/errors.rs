use thiserror::Error;

/// Error type for token operations.
///
/// Verification failures are kept distinct so callers can tell an expired
/// token (prompt for refresh) from a forged or garbled one (full re-login).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token lifetime out of range: {0} seconds")]
    InvalidLifetime(i64),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    BadSignature,

    #[error("Token signing algorithm is not accepted: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token is not valid yet")]
    NotYetValid,
}

impl TokenError {
    /// Short, stable label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::EncodingFailed(_) => "encoding_failed",
            TokenError::InvalidLifetime(_) => "invalid_lifetime",
            TokenError::Malformed(_) => "malformed",
            TokenError::BadSignature => "bad_signature",
            TokenError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            TokenError::Expired => "expired",
            TokenError::NotYetValid => "not_yet_valid",
        }
    }
}
