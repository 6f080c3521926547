use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::health::health;
use super::handlers::login::login;
use super::handlers::me::me;
use super::handlers::register::register;
use super::middleware::authenticate;
use super::middleware::request_deadline;
use crate::domain::user::ports::AuthServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub request_timeout: Duration,
}

pub fn create_router(auth_service: Arc<dyn AuthServicePort>, request_timeout: Duration) -> Router {
    let state = AppState {
        auth_service,
        request_timeout,
    };

    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(me))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    // Headers are left out of the span: they carry bearer tokens
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            request_deadline,
        ))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use auth::Authenticator;
    use axum::http::header;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::json;
    use serde_json::Value;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::user::errors::AuthError;
    use crate::domain::user::models::AuthResult;
    use crate::domain::user::models::LoginInput;
    use crate::domain::user::models::RegisterInput;
    use crate::domain::user::models::User;
    use crate::domain::user::service::AuthService;
    use crate::domain::validation::ValidationConfig;
    use crate::outbound::repositories::InMemoryUserRepository;

    const SECRET: &[u8] = b"router-test-secret-at-least-32-bytes!";

    fn app() -> Router {
        let service = AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Authenticator::new(SECRET)),
            Arc::new(ValidationConfig::default()),
        );
        create_router(Arc::new(service), Duration::from_secs(30))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str, authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn alice() -> Value {
        json!({
            "email": "alice@example.com",
            "username": "alice",
            "password": "Sup3r-Secret",
            "name": "Alice Liddell",
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = app().oneshot(get_request("/health", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_register_then_me() {
        let app = app();

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/auth/register", alice()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["data"]["token_type"], "Bearer");
        assert_eq!(body["data"]["expires_in"], 900);
        assert!(body["data"]["user"].get("password_hash").is_none());
        let access_token = body["data"]["access_token"].as_str().unwrap().to_string();
        let refresh_token = body["data"]["refresh_token"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(get_request(
                "/api/auth/me",
                Some(&format!("Bearer {access_token}")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["username"], "alice");
        assert_eq!(body["data"]["email"], "alice@example.com");

        // Refresh tokens cannot reach protected routes
        let response = app
            .oneshot(get_request(
                "/api/auth/me",
                Some(&format!("Bearer {refresh_token}")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_rejections_are_uniform() {
        let app = app();

        for authorization in [None, Some("Token abc"), Some("Bearer not-a-jwt")] {
            let response = app
                .clone()
                .oneshot(get_request("/api/auth/me", authorization))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body = body_json(response).await;
            assert_eq!(body["data"]["message"], "Unauthorized");
        }
    }

    #[tokio::test]
    async fn test_register_reports_every_violation() {
        let response = app()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                json!({ "password": "abc" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        let fields: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["email", "username", "password", "name"]);
    }

    #[tokio::test]
    async fn test_register_rejects_non_json_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_identity_accessor_outside_auth_layer() {
        let app = Router::new().route("/me", get(me));

        let response = app.oneshot(get_request("/me", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    /// Waits until the request is cancelled.
    struct StalledService;

    #[async_trait]
    impl AuthServicePort for StalledService {
        async fn register(
            &self,
            _input: RegisterInput,
            cancel: &CancellationToken,
        ) -> Result<AuthResult, AuthError> {
            cancel.cancelled().await;
            Err(AuthError::Cancelled("register"))
        }

        async fn login(
            &self,
            _input: LoginInput,
            cancel: &CancellationToken,
        ) -> Result<AuthResult, AuthError> {
            cancel.cancelled().await;
            Err(AuthError::Cancelled("login"))
        }

        async fn identity_from_token(
            &self,
            _token: &str,
            cancel: &CancellationToken,
        ) -> Result<User, AuthError> {
            cancel.cancelled().await;
            Err(AuthError::Cancelled("identity_from_token"))
        }
    }

    #[tokio::test]
    async fn test_request_deadline_cancels_work() {
        let app = create_router(Arc::new(StalledService), Duration::from_millis(50));

        let response = app
            .oneshot(json_request("POST", "/api/auth/register", alice()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
