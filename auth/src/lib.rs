//! Authentication utilities library
//!
//! Provides the credential and token primitives of the identity service:
//! - Password hashing (Argon2id)
//! - Signed access/refresh tokens (JWT, HS256)
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{TokenClass, TokenService};
//!
//! let service = TokenService::new(b"secret_key_at_least_32_bytes_long!");
//! let token = service.issue_access("user123").unwrap();
//! let claims = service.validate(&token).unwrap();
//! assert_eq!(claims.subject(), "user123");
//! assert_eq!(claims.class(), TokenClass::Access);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue tokens
//! assert!(auth.verify_password("password123", &hash));
//! let pair = auth.issue_tokens("user123").unwrap();
//!
//! // Validate token on later requests
//! let claims = auth.validate_access_token(&pair.access_token).unwrap();
//! assert_eq!(claims.subject(), "user123");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::Authenticator;
pub use authenticator::ClassMismatch;
pub use authenticator::TokenPair;
pub use jwt::TokenClaims;
pub use jwt::TokenClass;
pub use jwt::TokenError;
pub use jwt::TokenLifetimes;
pub use jwt::TokenService;
pub use jwt::MAX_LIFETIME_SECONDS;
pub use jwt::MIN_SECRET_LENGTH;
pub use password::PasswordError;
pub use password::PasswordHasher;
