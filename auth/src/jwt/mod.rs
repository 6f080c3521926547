pub mod claims;
pub mod errors;
pub mod service;

pub use claims::TokenClaims;
pub use claims::MAX_LIFETIME_SECONDS;
pub use claims::TokenClass;
pub use errors::TokenError;
pub use service::TokenLifetimes;
pub use service::TokenService;
pub use service::MIN_SECRET_LENGTH;
