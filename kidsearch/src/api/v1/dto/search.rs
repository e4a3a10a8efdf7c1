//! Search request/response DTOs for the v1 API.

use serde::{Deserialize, Serialize};

use crate::models::{self, SearchMethod, STORAGE_LABEL};

/// Request body for `POST /v1/search`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// The search query string.
    pub q: String,
    /// Retrieval method. Defaults to the full reranked pipeline.
    #[serde(default)]
    pub method: SearchMethod,
    /// Number of products to return, clamped to 3..=12 (default 5).
    pub limit: Option<u32>,
}

/// Query string for `GET /v1/search`.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// The search query string.
    pub q: String,
    /// `full-pipeline`, `hybrid-rrf`, `vector` or `bm25`.
    #[param(value_type = Option<String>)]
    pub method: Option<SearchMethod>,
    /// Number of products to return, clamped to 3..=12.
    pub limit: Option<u32>,
}

impl From<SearchQuery> for SearchRequest {
    fn from(query: SearchQuery) -> Self {
        Self {
            q: query.q,
            method: query.method.unwrap_or_default(),
            limit: query.limit,
        }
    }
}

/// Request body for `POST /v1/search:compare`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub q: String,
    pub limit: Option<u32>,
}

/// One product card.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResult {
    /// 1-based position.
    pub rank: usize,
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Engine score. Scales differ between methods.
    pub score: f64,
    /// Display-ready brand, `N/A` when missing.
    pub brand_label: String,
    /// Price formatted as `$12.34`.
    pub price_label: String,
    /// Category truncated for cards, `N/A` when missing.
    pub category_label: String,
}

impl From<models::RankedProduct> for ProductResult {
    fn from(ranked: models::RankedProduct) -> Self {
        let brand_label = ranked.product.brand_label().to_string();
        let price_label = ranked.product.price_label();
        let category_label = ranked.product.category_label().to_string();
        let product = ranked.product;

        Self {
            rank: ranked.rank,
            id: ranked.id,
            name: product.name,
            brand: product.brand,
            price: product.price,
            category: product.category,
            image_url: product.image_url,
            score: ranked.score,
            brand_label,
            price_label,
            category_label,
        }
    }
}

/// Results of one retrieval method.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub method: SearchMethod,
    /// Human-readable method name, e.g. `Hybrid RRF`.
    pub method_label: String,
    pub query: String,
    /// Wall-clock time of embedding plus engine round trip.
    pub latency_ms: u64,
    /// Number of products returned.
    pub total: usize,
    /// Vector storage format of the index.
    pub storage: String,
    pub results: Vec<ProductResult>,
}

impl From<models::SearchOutcome> for SearchResponse {
    fn from(outcome: models::SearchOutcome) -> Self {
        Self {
            method: outcome.method,
            method_label: outcome.method.label().to_string(),
            query: outcome.query,
            latency_ms: outcome.latency_ms,
            total: outcome.results.len(),
            storage: STORAGE_LABEL.to_string(),
            results: outcome.results.into_iter().map(Into::into).collect(),
        }
    }
}

/// Side-by-side results, one column per method.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResponse {
    pub query: String,
    /// Columns in fixed order: BM25, vector, hybrid RRF, full pipeline.
    pub columns: Vec<SearchResponse>,
}

impl From<models::Comparison> for ComparisonResponse {
    fn from(comparison: models::Comparison) -> Self {
        Self {
            query: comparison.query,
            columns: comparison.outcomes.into_iter().map(Into::into).collect(),
        }
    }
}

/// A selectable retrieval method.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    pub method: SearchMethod,
    pub label: String,
    pub short_label: String,
    pub slug: String,
}

impl From<SearchMethod> for MethodInfo {
    fn from(method: SearchMethod) -> Self {
        Self {
            method,
            label: method.label().to_string(),
            short_label: method.short_label().to_string(),
            slug: method.slug().to_string(),
        }
    }
}

/// Example queries and the options a client can offer.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsResponse {
    pub queries: Vec<String>,
    pub methods: Vec<MethodInfo>,
    pub default_method: SearchMethod,
    pub min_results: u32,
    pub max_results: u32,
    pub default_results: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Product, RankedProduct, SearchOutcome};

    fn ranked(rank: usize, brand: Option<&str>) -> RankedProduct {
        RankedProduct {
            rank,
            id: format!("doc-{rank}"),
            score: 1.5,
            product: Product {
                name: "LEGO Star Wars X-Wing".to_string(),
                brand: brand.map(str::to_string),
                price: 49.99,
                category: Some("Toys & Games".to_string()),
                image_url: None,
            },
        }
    }

    #[test]
    fn search_request_defaults_method() {
        let req: SearchRequest = serde_json::from_str(r#"{"q":"lego"}"#).unwrap();
        assert_eq!(req.method, SearchMethod::FullPipeline);
        assert_eq!(req.limit, None);
    }

    #[test]
    fn search_request_accepts_slug() {
        let req: SearchRequest =
            serde_json::from_str(r#"{"q":"lego","method":"hybrid-rrf","limit":8}"#).unwrap();
        assert_eq!(req.method, SearchMethod::HybridRrf);
        assert_eq!(req.limit, Some(8));
    }

    #[test]
    fn search_request_rejects_unknown_method() {
        let err = serde_json::from_str::<SearchRequest>(r#"{"q":"lego","method":"magic"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("Valid methods"));
    }

    #[test]
    fn product_result_serializes_labels() {
        let json = serde_json::to_value(ProductResult::from(ranked(1, None))).unwrap();
        assert_eq!(json["rank"], 1);
        assert_eq!(json["brandLabel"], "N/A");
        assert_eq!(json["priceLabel"], "$49.99");
        assert_eq!(json["categoryLabel"], "Toys & Games");
        assert!(json.get("brand").is_none());
        assert!(json.get("imageUrl").is_none());
    }

    #[test]
    fn search_response_counts_results() {
        let outcome = SearchOutcome {
            method: SearchMethod::Bm25Keyword,
            query: "lego".to_string(),
            results: vec![ranked(1, Some("LEGO")), ranked(2, Some("LEGO"))],
            latency_ms: 17,
        };

        let json = serde_json::to_value(SearchResponse::from(outcome)).unwrap();
        assert_eq!(json["method"], "bm25Keyword");
        assert_eq!(json["methodLabel"], "BM25 Keyword");
        assert_eq!(json["total"], 2);
        assert_eq!(json["latencyMs"], 17);
        assert_eq!(json["storage"], "BBQ int8");
        assert_eq!(json["results"][1]["brand"], "LEGO");
    }

    #[test]
    fn query_string_converts_to_request() {
        let query = SearchQuery {
            q: "dolls".to_string(),
            method: None,
            limit: Some(4),
        };
        let req = SearchRequest::from(query);
        assert_eq!(req.method, SearchMethod::FullPipeline);
        assert_eq!(req.limit, Some(4));
    }
}
