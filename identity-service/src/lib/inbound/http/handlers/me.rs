use axum::http::StatusCode;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::identity::AuthenticatedIdentity;

pub async fn me(identity: AuthenticatedIdentity) -> ApiSuccess<IdentityData> {
    ApiSuccess::new(StatusCode::OK, (&identity).into())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
}

impl From<&AuthenticatedIdentity> for IdentityData {
    fn from(identity: &AuthenticatedIdentity) -> Self {
        Self {
            id: identity.user_id.to_string(),
            username: identity.username.as_str().to_string(),
            email: identity.email.as_str().to_string(),
            name: identity.name.clone(),
        }
    }
}
