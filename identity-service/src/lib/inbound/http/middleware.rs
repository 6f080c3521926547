use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::Response;
use tokio_util::sync::CancellationToken;

use super::handlers::ApiError;
use super::identity::AuthenticatedIdentity;
use crate::inbound::http::router::AppState;

/// Cancellation signal scoped to the current request.
///
/// Fires when the request deadline passes or the client goes away.
#[derive(Debug, Clone, Default)]
pub struct RequestCancellation(pub CancellationToken);

#[async_trait]
impl<S> FromRequestParts<S> for RequestCancellation
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Routes outside `request_deadline` get a token nobody cancels
        Ok(parts
            .extensions
            .get::<RequestCancellation>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Middleware that gives every request a cancellation token and fires it once
/// the configured timeout elapses.
pub async fn request_deadline(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let cancel = CancellationToken::new();
    req.extensions_mut()
        .insert(RequestCancellation(cancel.clone()));

    // Dropping this future (client disconnect) cancels in-flight work too
    let _guard = cancel.clone().drop_guard();

    let response = next.run(req);
    tokio::pin!(response);

    tokio::select! {
        response = &mut response => return response,
        _ = tokio::time::sleep(state.request_timeout) => {
            tracing::warn!(
                timeout_ms = state.request_timeout.as_millis(),
                "Request deadline exceeded, cancelling"
            );
            cancel.cancel();
        }
    }

    response.await
}

/// Why a request carried no usable bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderRejection {
    Missing,
    Malformed,
}

impl HeaderRejection {
    fn reason(&self) -> &'static str {
        match self {
            HeaderRejection::Missing => "missing_header",
            HeaderRejection::Malformed => "malformed_header",
        }
    }
}

/// Middleware that resolves the bearer token into an identity and adds it to
/// request extensions.
///
/// Every rejection is the same 401 to the client; the log line carries the
/// specific reason.
pub async fn authenticate(
    State(state): State<AppState>,
    RequestCancellation(cancel): RequestCancellation,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).map_err(|rejection| {
        tracing::warn!(reason = rejection.reason(), "Authentication rejected");
        ApiError::Unauthorized
    })?;

    let user = state
        .auth_service
        .identity_from_token(token, &cancel)
        .await
        .map_err(|e| {
            if e.is_authentication_failure() {
                tracing::warn!(reason = e.kind(), "Authentication rejected");
            }
            ApiError::from(e)
        })?;

    tracing::debug!(user_id = %user.id, "Request authenticated");
    req.extensions_mut()
        .insert(AuthenticatedIdentity::from(&user));

    Ok(next.run(req).await)
}

/// Extract the token from an exact `Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, HeaderRejection> {
    let header = headers
        .get(http::header::AUTHORIZATION)
        .ok_or(HeaderRejection::Missing)?;

    let value = header.to_str().map_err(|_| HeaderRejection::Malformed)?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(*token),
        _ => Err(HeaderRejection::Malformed),
    }
}
