use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Product;

pub const MIN_RESULTS: u32 = 3;
pub const MAX_RESULTS: u32 = 12;
pub const DEFAULT_RESULTS: u32 = 5;

/// Index storage format reported alongside every result set.
pub const STORAGE_LABEL: &str = "BBQ int8";

/// Retrieval strategy executed by the search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SearchMethod {
    /// Hybrid RRF candidates reranked by the hosted reranker (default).
    #[default]
    FullPipeline,
    /// Reciprocal rank fusion of BM25 and kNN.
    HybridRrf,
    /// kNN over product embeddings.
    VectorSemantic,
    /// Boosted multi-field BM25.
    Bm25Keyword,
}

impl SearchMethod {
    /// Comparison order, simplest method first.
    pub const ALL: [SearchMethod; 4] = [
        SearchMethod::Bm25Keyword,
        SearchMethod::VectorSemantic,
        SearchMethod::HybridRrf,
        SearchMethod::FullPipeline,
    ];

    /// Selection order, default method first.
    pub const MENU: [SearchMethod; 4] = [
        SearchMethod::FullPipeline,
        SearchMethod::HybridRrf,
        SearchMethod::VectorSemantic,
        SearchMethod::Bm25Keyword,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SearchMethod::FullPipeline => "Full Pipeline",
            SearchMethod::HybridRrf => "Hybrid RRF",
            SearchMethod::VectorSemantic => "Vector Semantic",
            SearchMethod::Bm25Keyword => "BM25 Keyword",
        }
    }

    /// Column heading used in comparison views.
    pub fn short_label(&self) -> &'static str {
        match self {
            SearchMethod::FullPipeline => "Pipeline",
            SearchMethod::HybridRrf => "Hybrid",
            SearchMethod::VectorSemantic => "Vector",
            SearchMethod::Bm25Keyword => "BM25",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            SearchMethod::FullPipeline => "full-pipeline",
            SearchMethod::HybridRrf => "hybrid-rrf",
            SearchMethod::VectorSemantic => "vector",
            SearchMethod::Bm25Keyword => "bm25",
        }
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SearchMethod {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match normalized.as_str() {
            "fullpipeline" | "pipeline" | "rerank" | "reranked" => Ok(SearchMethod::FullPipeline),
            "hybridrrf" | "hybrid" | "rrf" => Ok(SearchMethod::HybridRrf),
            "vectorsemantic" | "vector" | "semantic" | "knn" => Ok(SearchMethod::VectorSemantic),
            "bm25keyword" | "bm25" | "keyword" | "lexical" => Ok(SearchMethod::Bm25Keyword),
            _ => Err(format!(
                "Invalid search method '{raw}'. Valid methods: full-pipeline, hybrid-rrf, vector, bm25"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for SearchMethod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Clamps a requested result count into the supported window.
pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit
        .unwrap_or(DEFAULT_RESULTS)
        .clamp(MIN_RESULTS, MAX_RESULTS)
}

/// One ranked hit.
#[derive(Debug, Clone, Serialize)]
pub struct RankedProduct {
    /// 1-based position in the result list.
    pub rank: usize,
    pub id: String,
    pub score: f64,
    pub product: Product,
}

/// Results of a single method run, with its wall-clock latency.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub method: SearchMethod,
    pub query: String,
    pub results: Vec<RankedProduct>,
    pub latency_ms: u64,
}

/// All methods run against the same query.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub query: String,
    pub outcomes: Vec<SearchOutcome>,
}
