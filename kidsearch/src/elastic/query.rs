//! Typed `_search` request bodies.
//!
//! Every body carries the same `_source` filter and lexical field boosts, so
//! the four retrieval methods only differ in how the query or retriever tree
//! is assembled.

use serde::Serialize;

use crate::config::RetrievalConfig;

/// Product fields returned with each hit.
pub const SOURCE_FIELDS: &[&str] = &["product_name", "brand", "price", "category", "image_url"];

/// Lexical fields with their boosts, in Elasticsearch `field^boost` notation.
pub const LEXICAL_FIELDS: &[&str] = &["product_name^3", "brand^2", "category^1.5", "document_text"];

/// Dense vector field holding the product embedding.
pub const VECTOR_FIELD: &str = "embedding";

#[derive(Debug, Clone, Serialize)]
pub struct SearchBody {
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knn: Option<KnnQuery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retriever: Option<Retriever>,
    #[serde(rename = "_source")]
    pub source: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    MultiMatch(MultiMatch),
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiMatch {
    pub query: String,
    pub fields: Vec<&'static str>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MultiMatchType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiMatchType {
    BestFields,
}

#[derive(Debug, Clone, Serialize)]
pub struct KnnQuery {
    pub field: &'static str,
    pub query_vector: Vec<f32>,
    pub k: u32,
    pub num_candidates: u32,
}

/// Retriever tree, serialized with the retriever kind as the single key.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Retriever {
    Standard {
        query: Query,
    },
    Knn(KnnQuery),
    Rrf {
        retrievers: Vec<Retriever>,
        rank_window_size: u32,
    },
    TextSimilarityReranker {
        retriever: Box<Retriever>,
        field: String,
        inference_id: String,
        inference_text: String,
        rank_window_size: u32,
    },
}

/// Builds request bodies from the configured retrieval knobs.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    config: RetrievalConfig,
}

impl QueryBuilder {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    fn multi_match(query: &str, match_type: Option<MultiMatchType>) -> Query {
        Query::MultiMatch(MultiMatch {
            query: query.to_string(),
            fields: LEXICAL_FIELDS.to_vec(),
            match_type,
        })
    }

    fn knn_clause(&self, vector: Vec<f32>, k: u32) -> KnnQuery {
        KnnQuery {
            field: VECTOR_FIELD,
            query_vector: vector,
            k,
            num_candidates: self.config.knn_num_candidates.max(k),
        }
    }

    fn body(size: u32) -> SearchBody {
        SearchBody {
            size,
            query: None,
            knn: None,
            retriever: None,
            source: SOURCE_FIELDS.to_vec(),
        }
    }

    fn rrf_retriever(&self, query: &str, vector: Vec<f32>) -> Retriever {
        Retriever::Rrf {
            retrievers: vec![
                Retriever::Standard {
                    query: Self::multi_match(query, None),
                },
                Retriever::Knn(self.knn_clause(vector, self.config.hybrid_knn_k)),
            ],
            rank_window_size: self.config.rrf_rank_window,
        }
    }

    /// Keyword search with `best_fields` scoring.
    pub fn bm25(&self, query: &str, size: u32) -> SearchBody {
        SearchBody {
            query: Some(Self::multi_match(query, Some(MultiMatchType::BestFields))),
            ..Self::body(size)
        }
    }

    /// Approximate nearest-neighbour search over the product embeddings.
    pub fn knn(&self, vector: Vec<f32>, size: u32) -> SearchBody {
        SearchBody {
            knn: Some(self.knn_clause(vector, size)),
            ..Self::body(size)
        }
    }

    /// Reciprocal rank fusion of the keyword and vector retrievers.
    pub fn hybrid_rrf(&self, query: &str, vector: Vec<f32>, size: u32) -> SearchBody {
        SearchBody {
            retriever: Some(self.rrf_retriever(query, vector)),
            ..Self::body(size)
        }
    }

    /// RRF candidates reordered by the hosted reranker inference endpoint.
    pub fn full_pipeline(&self, query: &str, vector: Vec<f32>, size: u32) -> SearchBody {
        SearchBody {
            retriever: Some(Retriever::TextSimilarityReranker {
                retriever: Box::new(self.rrf_retriever(query, vector)),
                field: self.config.rerank_field.clone(),
                inference_id: self.config.rerank_inference_id.clone(),
                inference_text: query.to_string(),
                rank_window_size: self.config.rerank_window,
            }),
            ..Self::body(size)
        }
    }
}
