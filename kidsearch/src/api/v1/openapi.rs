use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kidsearch API",
        version = "1.0.0",
        description = "Kids product search over Elasticsearch. Compares BM25, vector, hybrid RRF and reranked retrieval.",
    ),
    paths(
        handlers::health::health_check,
        handlers::search::search,
        handlers::search::search_get,
        handlers::search::compare,
        handlers::search::suggestions,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        response::ResponseMeta,
        // Search
        crate::models::SearchMethod,
        dto::search::SearchRequest,
        dto::search::CompareRequest,
        dto::search::ProductResult,
        dto::search::SearchResponse,
        dto::search::ComparisonResponse,
        dto::search::MethodInfo,
        dto::search::SuggestionsResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::ElasticsearchStatus,
        handlers::health::EmbeddingsStatus,
        handlers::health::RerankerStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "search", description = "Product search and method comparison"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
