pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod response;
pub mod router;

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::routes::create_router;
    use crate::api::testing::test_state;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn protected_route_requires_auth() {
        let app = create_router(test_state(vec!["test-key".to_string()]));

        let response = app
            .oneshot(post_json("/api/v1/search", r#"{"q":"lego"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "unauthorized");
    }

    #[tokio::test]
    async fn compare_route_requires_auth() {
        let app = create_router(test_state(vec!["test-key".to_string()]));

        let response = app
            .oneshot(post_json("/api/v1/search:compare", r#"{"q":"lego"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_is_public_and_reports_degraded_cluster() {
        let app = create_router(test_state(vec!["secret".to_string()]));

        let response = app.oneshot(get("/api/v1/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json.get("error").is_none());
        assert_eq!(json["data"]["status"], "degraded");
        assert_eq!(json["data"]["elasticsearch"]["status"], "error");
        assert_eq!(json["data"]["elasticsearch"]["index"], "amazon_2020_bbq");
        assert_eq!(json["data"]["embeddings"]["backend"], "api");
        assert_eq!(json["data"]["embeddings"]["dimensions"], 3);
        assert_eq!(json["data"]["reranker"]["inferenceId"], "jina_reranker_v3");
    }

    #[tokio::test]
    async fn openapi_json_is_public_and_valid() {
        let app = create_router(test_state(vec!["secret".to_string()]));

        let response = app.oneshot(get("/api/v1/openapi.json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let version = json["openapi"]
            .as_str()
            .expect("openapi field should be a string");
        assert!(
            version.starts_with('3'),
            "OpenAPI version should start with 3, got: {version}"
        );
        assert!(json["paths"]["/api/v1/search:compare"].is_object());
    }

    #[tokio::test]
    async fn suggestions_list_examples_and_methods() {
        let app = create_router(test_state(vec!["secret".to_string()]));

        let response = app.oneshot(get("/api/v1/suggestions")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["queries"].as_array().unwrap().len(), 8);
        let slugs: Vec<_> = json["data"]["methods"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, ["full-pipeline", "hybrid-rrf", "vector", "bm25"]);
        assert_eq!(json["data"]["defaultMethod"], "fullPipeline");
        assert_eq!(json["data"]["defaultResults"], 5);
    }

    #[tokio::test]
    async fn empty_query_is_invalid_request() {
        let app = create_router(test_state(vec![]));

        let response = app
            .oneshot(post_json("/api/v1/search", r#"{"q":"   "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "invalid_request");
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn missing_query_field_is_reported() {
        let app = create_router(test_state(vec![]));

        let response = app
            .oneshot(post_json("/api/v1/search", r#"{"method":"bm25"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "Missing required field: q");
    }

    #[tokio::test]
    async fn unknown_method_in_query_string_is_invalid_request() {
        let app = create_router(test_state(vec![]));

        let response = app
            .oneshot(get("/api/v1/search?q=lego&method=telepathy"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "invalid_request");
    }

    #[tokio::test]
    async fn root_serves_frontend() {
        let app = create_router(test_state(vec!["secret".to_string()]));

        let response = app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
