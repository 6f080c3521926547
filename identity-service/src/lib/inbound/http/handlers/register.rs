use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use super::ApiError;
use super::ApiSuccess;
use super::AuthResponseData;
use crate::domain::user::models::RegisterInput;
use crate::inbound::http::middleware::RequestCancellation;
use crate::inbound::http::router::AppState;

/// The body is taken as raw JSON; the registration pipeline decides what
/// is missing or mistyped and reports all of it at once.
pub async fn register(
    State(state): State<AppState>,
    RequestCancellation(cancel): RequestCancellation,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let Json(payload) = body?;

    state
        .auth_service
        .register(RegisterInput::new(payload), &cancel)
        .await
        .map_err(ApiError::from)
        .map(|ref result| ApiSuccess::new(StatusCode::CREATED, result.into()))
}
