use crate::jwt::TokenClaims;
use crate::jwt::TokenClass;
use crate::jwt::TokenError;
use crate::jwt::TokenLifetimes;
use crate::jwt::TokenService;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password hashing and token handling.
///
/// One instance owns the process-wide signing secret; it is immutable for the
/// lifetime of the process.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_service: TokenService,
}

/// Access/refresh pair issued after a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl Authenticator {
    /// Create a new authenticator with default token lifetimes.
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self::with_lifetimes(jwt_secret, TokenLifetimes::default())
    }

    pub fn with_lifetimes(jwt_secret: &[u8], lifetimes: TokenLifetimes) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_service: TokenService::with_lifetimes(jwt_secret, lifetimes),
        }
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Issue an access token and a refresh token for `subject`.
    ///
    /// # Errors
    /// * `TokenError` - Signing failed or a lifetime is misconfigured
    pub fn issue_tokens(&self, subject: &str) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.token_service.issue_access(subject)?,
            refresh_token: self.token_service.issue_refresh(subject)?,
            expires_in: self.token_service.lifetimes().access.num_seconds(),
        })
    }

    /// Validate a token of either class.
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.token_service.validate(token)
    }

    /// Validate a token and check it is an access token.
    ///
    /// A genuine refresh token yields `WrongClass`, kept apart from forged or
    /// expired tokens so callers can report it separately.
    pub fn validate_access_token(&self, token: &str) -> Result<TokenClaims, ClassMismatch> {
        let claims = self.token_service.validate(token)?;
        match claims.class() {
            TokenClass::Access => Ok(claims),
            other => Err(ClassMismatch::WrongClass(other)),
        }
    }
}

/// Failure of [`Authenticator::validate_access_token`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassMismatch {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Expected an access token, got a {0} token")]
    WrongClass(TokenClass),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_hash_and_verify_password() {
        let authenticator = Authenticator::new(SECRET);

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        assert!(authenticator.verify_password("my_password", &hash));
        assert!(!authenticator.verify_password("wrong_password", &hash));
    }

    #[test]
    fn test_issue_tokens() {
        let authenticator = Authenticator::new(SECRET);

        let pair = authenticator.issue_tokens("user123").expect("Failed to issue tokens");
        assert_eq!(pair.expires_in, 15 * 60);

        let access = authenticator.validate_token(&pair.access_token).unwrap();
        assert_eq!(access.subject(), "user123");
        assert_eq!(access.class(), TokenClass::Access);

        let refresh = authenticator.validate_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh.subject(), "user123");
        assert_eq!(refresh.class(), TokenClass::Refresh);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let authenticator = Authenticator::new(SECRET);
        let pair = authenticator.issue_tokens("user123").unwrap();

        assert!(authenticator.validate_access_token(&pair.access_token).is_ok());
        assert_eq!(
            authenticator.validate_access_token(&pair.refresh_token),
            Err(ClassMismatch::WrongClass(TokenClass::Refresh))
        );
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = Authenticator::new(SECRET);

        let result = authenticator.validate_access_token("invalid.token.here");
        assert!(matches!(
            result,
            Err(ClassMismatch::Token(TokenError::Malformed(_)))
        ));
    }
}
