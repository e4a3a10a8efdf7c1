//! # V1 API Key Authentication Middleware
//!
//! Guards the search routes with Bearer token authentication when
//! `KIDSEARCH_API_KEYS` is set. With no keys configured the demo is public
//! and requests pass straight through.
//!
//! Rejections use the v1 `ApiResponse` JSON envelope so auth errors conform
//! to the same contract as every other endpoint.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;

use super::response::{ApiResponse, ErrorCode};

/// Axum middleware that enforces Bearer token authentication for v1 API routes.
///
/// # Behavior
///
/// - If `KIDSEARCH_API_KEYS` is empty/unset → the request passes through.
/// - If the `Authorization: Bearer <token>` header is missing or malformed → 401.
/// - If the token is not in the configured key list → 401.
/// - If the token is valid → passes the request through to the next handler.
///
/// # Error format
///
/// ```json
/// { "error": { "code": "unauthorized", "message": "..." } }
/// ```
pub async fn v1_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let keys = &state.config.server.api_keys;
    if keys.is_empty() {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(token) => token.trim(),
            None => {
                return ApiResponse::<()>::error(
                    ErrorCode::Unauthorized,
                    "Invalid authorization header format. Expected: Bearer <token>",
                )
                .into_response();
            }
        },
        None => {
            return ApiResponse::<()>::error(
                ErrorCode::Unauthorized,
                "Missing authorization header",
            )
            .into_response();
        }
    };

    if keys.iter().any(|key| key == token) {
        next.run(request).await
    } else {
        tracing::debug!("Rejected request with unknown API key");
        ApiResponse::<()>::error(ErrorCode::Unauthorized, "Invalid API key").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::test_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    fn build_test_app(api_keys: Vec<String>) -> Router {
        let state = test_state(api_keys);

        async fn protected_handler() -> &'static str {
            "protected"
        }

        async fn health_handler() -> &'static str {
            "healthy"
        }

        let public_routes = Router::new().route("/health", get(health_handler));

        let protected_routes = Router::new()
            .route("/protected", get(protected_handler))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                v1_auth_middleware,
            ));

        Router::new()
            .merge(public_routes)
            .merge(protected_routes)
            .with_state(state)
    }

    async fn parse_error_body(response: Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, json)
    }

    fn get_protected(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn open_when_no_keys_configured() {
        let app = build_test_app(vec![]);

        let response = app.oneshot(get_protected(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn allows_valid_key() {
        let app = build_test_app(vec!["test-key-v1".to_string()]);

        let response = app
            .oneshot(get_protected(Some("Bearer test-key-v1")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn accepts_any_configured_key() {
        let app = build_test_app(vec!["first".to_string(), "second".to_string()]);

        let response = app
            .oneshot(get_protected(Some("Bearer second")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn rejects_invalid_key() {
        let app = build_test_app(vec!["test-key-v1".to_string()]);

        let response = app
            .oneshot(get_protected(Some("Bearer wrong-key")))
            .await
            .unwrap();

        let (status, json) = parse_error_body(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "unauthorized");
        assert_eq!(json["error"]["message"], "Invalid API key");
    }

    #[tokio::test]
    async fn rejects_missing_header() {
        let app = build_test_app(vec!["test-key-v1".to_string()]);

        let response = app.oneshot(get_protected(None)).await.unwrap();

        let (status, json) = parse_error_body(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["message"], "Missing authorization header");
    }

    #[tokio::test]
    async fn rejects_non_bearer_scheme() {
        let app = build_test_app(vec!["test-key-v1".to_string()]);

        let response = app
            .oneshot(get_protected(Some("Basic dXNlcjpwYXNz")))
            .await
            .unwrap();

        let (status, json) = parse_error_body(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Expected: Bearer"));
    }

    #[tokio::test]
    async fn public_route_bypasses_auth() {
        let app = build_test_app(vec!["secret-key".to_string()]);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn auth_error_is_json_envelope() {
        let app = build_test_app(vec!["key".to_string()]);

        let response = app.oneshot(get_protected(Some("Bearer bad"))).await.unwrap();

        let content_type = response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.contains("application/json"));

        let (status, json) = parse_error_body(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(json.get("data").is_none());
        assert!(json.get("meta").is_none());
        assert!(json["error"]["message"].is_string());
    }
}
