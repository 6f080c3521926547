use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::TokenError;

/// Class of a token.
///
/// Both classes are signed with the same secret; the class travels inside the
/// claims so a refresh token can be refused where an access token is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    Access,
    Refresh,
}

impl TokenClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenClass::Access => "access",
            TokenClass::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims carried by every token.
///
/// Fields are private: a claims value is immutable once minted, and `exp` is
/// always strictly after `iat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user identifier)
    sub: String,

    /// Token class
    #[serde(rename = "token_type")]
    class: TokenClass,

    /// Issued at (Unix timestamp)
    iat: i64,

    /// Not before (Unix timestamp)
    nbf: i64,

    /// Expiration time (Unix timestamp)
    exp: i64,
}

/// Longest accepted token lifetime: ten years.
pub const MAX_LIFETIME_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

impl TokenClaims {
    /// Mint claims for `subject` valid from `issued_at` for `lifetime`.
    ///
    /// # Errors
    /// * `InvalidLifetime` - `lifetime` is not positive or exceeds
    ///   [`MAX_LIFETIME_SECONDS`]
    pub fn new(
        subject: impl Into<String>,
        class: TokenClass,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, TokenError> {
        let seconds = lifetime.num_seconds();
        if seconds <= 0 || seconds > MAX_LIFETIME_SECONDS {
            return Err(TokenError::InvalidLifetime(seconds));
        }

        let iat = issued_at.timestamp();
        let exp = iat
            .checked_add(seconds)
            .ok_or(TokenError::InvalidLifetime(seconds))?;

        Ok(Self {
            sub: subject.into(),
            class,
            iat,
            nbf: iat,
            exp,
        })
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn class(&self) -> TokenClass {
        self.class
    }

    pub fn issued_at(&self) -> i64 {
        self.iat
    }

    pub fn not_before(&self) -> i64 {
        self.nbf
    }

    pub fn expires_at(&self) -> i64 {
        self.exp
    }

    /// Check if the token is expired at `current_timestamp`.
    ///
    /// Expiry is inclusive: a token is no longer valid at its `exp` second.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    /// Check if `current_timestamp` falls before the `nbf` claim.
    pub fn is_premature(&self, current_timestamp: i64) -> bool {
        current_timestamp < self.nbf
    }

    /// Structural invariants a decoded payload must satisfy before it is trusted.
    pub(crate) fn check_consistency(&self) -> Result<(), TokenError> {
        if self.sub.is_empty() {
            return Err(TokenError::Malformed("empty subject".to_string()));
        }
        if self.exp <= self.iat {
            return Err(TokenError::Malformed(
                "expiry is not after issued-at".to_string(),
            ));
        }
        Ok(())
    }
}
