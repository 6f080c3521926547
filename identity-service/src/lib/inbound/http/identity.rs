use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::Extensions;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use thiserror::Error;

use super::handlers::ApiErrorData;
use super::handlers::ApiResponseBody;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;

/// Identity the auth middleware attaches to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub user_id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub name: String,
}

impl From<&User> for AuthenticatedIdentity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// Identity was requested on a route the auth middleware does not guard.
///
/// This is a wiring bug, so it surfaces as a 500 rather than a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No authenticated identity on this request")]
pub struct IdentityMissing;

impl AuthenticatedIdentity {
    pub fn from_extensions(extensions: &Extensions) -> Result<&Self, IdentityMissing> {
        extensions.get::<Self>().ok_or(IdentityMissing)
    }
}

impl IntoResponse for IdentityMissing {
    fn into_response(self) -> Response {
        tracing::error!("Handler requires an identity but the route is not authenticated");

        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = ApiResponseBody::new(
            status,
            ApiErrorData {
                message: "Internal server error".to_string(),
                field: None,
            },
        );
        (status, Json(body)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedIdentity
where
    S: Send + Sync,
{
    type Rejection = IdentityMissing;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_extensions(&parts.extensions).cloned()
    }
}
