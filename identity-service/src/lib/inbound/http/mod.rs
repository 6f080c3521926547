pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod router;

pub use identity::AuthenticatedIdentity;
pub use identity::IdentityMissing;
pub use middleware::RequestCancellation;
