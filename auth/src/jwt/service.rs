use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::TokenClaims;
use super::claims::TokenClass;
use super::errors::TokenError;

/// Minimum signing secret length for HS256 (256 bits).
pub const MIN_SECRET_LENGTH: usize = 32;

/// Token lifetimes per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
        }
    }
}

/// Issues and verifies signed tokens under a single shared secret.
///
/// Tokens are compact JWS strings (`header.payload.signature`, URL-safe
/// base64) signed with HS256. Only HS256 is accepted on verification; any
/// other `alg` in the header is refused before the signature is looked at.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetimes: TokenLifetimes,
}

impl TokenService {
    const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Create a token service with a secret key and default lifetimes.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self::with_lifetimes(secret, TokenLifetimes::default())
    }

    pub fn with_lifetimes(secret: &[u8], lifetimes: TokenLifetimes) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetimes,
        }
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    /// Issue a short-lived access token for `subject`.
    pub fn issue_access(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, TokenClass::Access, Utc::now())
    }

    /// Issue a long-lived refresh token for `subject`.
    pub fn issue_refresh(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, TokenClass::Refresh, Utc::now())
    }

    /// Issue a token of `class` as if minted at `issued_at`.
    ///
    /// # Errors
    /// * `InvalidLifetime` - The configured lifetime for `class` is not positive
    /// * `EncodingFailed` - Signing failed
    pub fn issue_at(
        &self,
        subject: &str,
        class: TokenClass,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let lifetime = match class {
            TokenClass::Access => self.lifetimes.access,
            TokenClass::Refresh => self.lifetimes.refresh,
        };
        let claims = TokenClaims::new(subject, class, issued_at, lifetime)?;

        encode(&Header::new(Self::ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Validate a token against the current time.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as of `now`: structure, algorithm, signature, then the
    /// `nbf`/`exp` window.
    ///
    /// # Errors
    /// * `Malformed` - Not a three-segment token, or undecodable header/claims
    /// * `UnsupportedAlgorithm` - Header names an algorithm other than HS256
    /// * `BadSignature` - Signature does not match the payload under our secret
    /// * `NotYetValid` - `now` is before `nbf`
    /// * `Expired` - `now` is at or after `exp`
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let claims = self.parse(token)?;
        let timestamp = now.timestamp();

        if claims.is_premature(timestamp) {
            return Err(TokenError::NotYetValid);
        }
        if claims.is_expired(timestamp) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Verify structure and signature without checking freshness.
    ///
    /// Claims returned here may be expired; never authorize on them alone.
    pub fn parse(&self, token: &str) -> Result<TokenClaims, TokenError> {
        check_structure(token)?;

        let header = decode_header(token).map_err(|e| TokenError::Malformed(e.to_string()))?;
        if header.alg != Self::ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
        }

        let mut validation = Validation::new(Self::ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let token_data =
            decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature => TokenError::BadSignature,
                    ErrorKind::InvalidAlgorithm => {
                        TokenError::UnsupportedAlgorithm(format!("{:?}", header.alg))
                    }
                    _ => TokenError::Malformed(e.to_string()),
                }
            })?;

        token_data.claims.check_consistency()?;
        Ok(token_data.claims)
    }
}

/// A token must be exactly three non-empty URL-safe base64 segments.
fn check_structure(token: &str) -> Result<(), TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Malformed(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let url_safe = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    for segment in segments {
        if segment.is_empty() || !segment.chars().all(url_safe) {
            return Err(TokenError::Malformed(
                "segment is not URL-safe base64".to_string(),
            ));
        }
    }

    Ok(())
}
