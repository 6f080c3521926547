use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use super::ApiError;
use super::ApiSuccess;
use super::AuthResponseData;
use crate::domain::user::models::LoginInput;
use crate::inbound::http::middleware::RequestCancellation;
use crate::inbound::http::router::AppState;

/// Raw JSON, like registration: missing or mistyped fields come back as
/// validation errors from the login pipeline.
pub async fn login(
    State(state): State<AppState>,
    RequestCancellation(cancel): RequestCancellation,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let Json(payload) = body?;

    state
        .auth_service
        .login(LoginInput::new(payload), &cancel)
        .await
        .map_err(ApiError::from)
        .map(|ref result| ApiSuccess::new(StatusCode::OK, result.into()))
}
