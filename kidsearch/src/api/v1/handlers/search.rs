//! v1 Search handlers.
//!
//! Implements single-method search (`POST`/`GET /api/v1/search`), the
//! side-by-side comparison (`POST /api/v1/search:compare`) and the example
//! query list (`GET /api/v1/suggestions`).

use axum::extract::State;
use axum_extra::extract::{Query, QueryRejection};
use std::time::Instant;

use crate::api::extractors::AppJson;
use crate::api::v1::dto::{
    CompareRequest, ComparisonResponse, MethodInfo, SearchQuery, SearchRequest, SearchResponse,
    SuggestionsResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode, ResponseMeta};
use crate::api::AppState;
use crate::models::{SearchMethod, DEFAULT_RESULTS, MAX_RESULTS, MIN_RESULTS};

/// `POST /api/v1/search`
///
/// Runs one retrieval method. `method` defaults to the full pipeline
/// (hybrid RRF reranked by the hosted cross-encoder).
#[utoipa::path(
    post,
    path = "/api/v1/search",
    tag = "search",
    operation_id = "search.search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Ranked products", body = SearchResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Missing or invalid API key", body = ApiError),
        (status = 502, description = "Search backend failed", body = ApiError),
    )
)]
pub async fn search(
    State(state): State<AppState>,
    AppJson(req): AppJson<SearchRequest>,
) -> ApiResponse<SearchResponse> {
    run_search(&state, req).await
}

/// `GET /api/v1/search?q=...&method=...&limit=...`
///
/// Query-string form of [`search`], convenient for links and curl.
#[utoipa::path(
    get,
    path = "/api/v1/search",
    tag = "search",
    operation_id = "search.searchGet",
    params(SearchQuery),
    responses(
        (status = 200, description = "Ranked products", body = SearchResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Missing or invalid API key", body = ApiError),
    )
)]
pub async fn search_get(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResponse<SearchResponse> {
    match query {
        Ok(Query(query)) => run_search(&state, query.into()).await,
        Err(rejection) => ApiResponse::error(ErrorCode::InvalidRequest, rejection.body_text()),
    }
}

async fn run_search(state: &AppState, req: SearchRequest) -> ApiResponse<SearchResponse> {
    match state.search.search(req.method, &req.q, req.limit).await {
        Ok(outcome) => {
            let meta = ResponseMeta {
                total: Some(outcome.results.len() as u64),
                took_ms: Some(outcome.latency_ms),
            };
            ApiResponse::success_with_meta(outcome.into(), meta)
        }
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/search:compare`
///
/// Runs every method against the same query. Columns are returned in fixed
/// order (BM25, vector, hybrid RRF, full pipeline), each with its own latency.
#[utoipa::path(
    post,
    path = "/api/v1/search:compare",
    tag = "search",
    operation_id = "search.compare",
    request_body = CompareRequest,
    responses(
        (status = 200, description = "One column per method", body = ComparisonResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Missing or invalid API key", body = ApiError),
        (status = 502, description = "Search backend failed", body = ApiError),
    )
)]
pub async fn compare(
    State(state): State<AppState>,
    AppJson(req): AppJson<CompareRequest>,
) -> ApiResponse<ComparisonResponse> {
    let start = Instant::now();

    match state.search.compare(&req.q, req.limit).await {
        Ok(comparison) => {
            let meta = ResponseMeta {
                total: Some(comparison.outcomes.len() as u64),
                took_ms: Some(start.elapsed().as_millis() as u64),
            };
            ApiResponse::success_with_meta(comparison.into(), meta)
        }
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/suggestions`
#[utoipa::path(
    get,
    path = "/api/v1/suggestions",
    tag = "search",
    operation_id = "search.suggestions",
    responses(
        (status = 200, description = "Example queries and available methods", body = SuggestionsResponse),
    )
)]
pub async fn suggestions(State(state): State<AppState>) -> ApiResponse<SuggestionsResponse> {
    ApiResponse::success(SuggestionsResponse {
        queries: state
            .search
            .suggestions()
            .iter()
            .map(|q| q.to_string())
            .collect(),
        methods: SearchMethod::MENU.into_iter().map(MethodInfo::from).collect(),
        default_method: SearchMethod::default(),
        min_results: MIN_RESULTS,
        max_results: MAX_RESULTS,
        default_results: DEFAULT_RESULTS,
    })
}
