use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::v1::response::ApiResponse;

/// Health data returned inside the v1 envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    /// `ok` when the cluster answered, `degraded` otherwise.
    pub status: String,
    pub version: String,
    pub elasticsearch: ElasticsearchStatus,
    pub embeddings: EmbeddingsStatus,
    pub reranker: RerankerStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElasticsearchStatus {
    pub status: String,
    pub index: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingsStatus {
    pub status: String,
    pub model: String,
    pub dimensions: usize,
    /// `local` or `api`.
    pub backend: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RerankerStatus {
    pub inference_id: String,
    pub field: String,
    pub rank_window_size: u32,
}

/// `GET /api/v1/health`
///
/// Always 200; a failed cluster ping is reported as `degraded`.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let index = state.search.index().to_string();

    let elasticsearch = match state.elastic.ping().await {
        Ok(info) => ElasticsearchStatus {
            status: "ok".to_string(),
            index,
            cluster_name: Some(info.cluster_name),
            version: Some(info.version.number),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Elasticsearch health check failed");
            ElasticsearchStatus {
                status: "error".to_string(),
                index,
                cluster_name: None,
                version: None,
            }
        }
    };

    let embeddings = EmbeddingsStatus {
        status: "ok".to_string(),
        model: state.embeddings.model_name().to_string(),
        dimensions: state.embeddings.dimensions(),
        backend: if state.embeddings.is_local() {
            "local".to_string()
        } else {
            "api".to_string()
        },
    };

    let retrieval = &state.config.retrieval;
    let reranker = RerankerStatus {
        inference_id: retrieval.rerank_inference_id.clone(),
        field: retrieval.rerank_field.clone(),
        rank_window_size: retrieval.rerank_window,
    };

    let status = if elasticsearch.status == "ok" {
        "ok"
    } else {
        "degraded"
    };

    ApiResponse::success(HealthData {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        elasticsearch,
        embeddings,
        reranker,
    })
}
