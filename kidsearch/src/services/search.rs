use futures::future::join_all;
use std::time::Instant;

use crate::config::Config;
use crate::elastic::{ElasticClient, Hit, QueryBuilder, SearchBody};
use crate::embeddings::EmbeddingProvider;
use crate::error::{KidsearchError, Result};
use crate::models::{clamp_limit, Comparison, Product, RankedProduct, SearchMethod, SearchOutcome};

/// Longest accepted query, in characters.
pub const MAX_QUERY_CHARS: usize = 512;

/// Example queries offered to users who do not know what to type.
pub const SUGGESTED_QUERIES: &[&str] = &[
    "Hot Wheels race track",
    "Barbie dolls",
    "LEGO Star Wars",
    "educational STEM toys",
    "coloring books",
    "Pokemon plush",
    "board games family",
    "outdoor sports toys",
];

#[derive(Clone)]
pub struct SearchService {
    client: ElasticClient,
    embeddings: EmbeddingProvider,
    queries: QueryBuilder,
    index: String,
}

impl SearchService {
    pub fn new(client: ElasticClient, embeddings: EmbeddingProvider, config: &Config) -> Self {
        Self {
            client,
            embeddings,
            queries: QueryBuilder::new(config.retrieval.clone()),
            index: config.elasticsearch.index.clone(),
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn suggestions(&self) -> &'static [&'static str] {
        SUGGESTED_QUERIES
    }

    async fn execute(&self, body: &SearchBody) -> Result<Vec<RankedProduct>> {
        let response = self.client.search(&self.index, body).await?;
        if response.timed_out {
            tracing::warn!(
                took = response.took,
                "Elasticsearch search timed out; results may be partial"
            );
        }
        Ok(rank_hits(response.hits.hits))
    }

    pub async fn bm25_search(&self, query: &str, k: u32) -> Result<Vec<RankedProduct>> {
        self.execute(&self.queries.bm25(query, k)).await
    }

    pub async fn vector_search(&self, query: &str, k: u32) -> Result<Vec<RankedProduct>> {
        let vector = self.embeddings.embed_query(query).await?;
        self.vector_search_with(vector, k).await
    }

    pub async fn hybrid_rrf_search(&self, query: &str, k: u32) -> Result<Vec<RankedProduct>> {
        let vector = self.embeddings.embed_query(query).await?;
        self.hybrid_rrf_search_with(query, vector, k).await
    }

    pub async fn full_pipeline_search(&self, query: &str, k: u32) -> Result<Vec<RankedProduct>> {
        let vector = self.embeddings.embed_query(query).await?;
        self.full_pipeline_search_with(query, vector, k).await
    }

    async fn vector_search_with(&self, vector: Vec<f32>, k: u32) -> Result<Vec<RankedProduct>> {
        self.execute(&self.queries.knn(vector, k)).await
    }

    async fn hybrid_rrf_search_with(
        &self,
        query: &str,
        vector: Vec<f32>,
        k: u32,
    ) -> Result<Vec<RankedProduct>> {
        self.execute(&self.queries.hybrid_rrf(query, vector, k)).await
    }

    async fn full_pipeline_search_with(
        &self,
        query: &str,
        vector: Vec<f32>,
        k: u32,
    ) -> Result<Vec<RankedProduct>> {
        self.execute(&self.queries.full_pipeline(query, vector, k)).await
    }

    /// Runs `method`, reusing `embedded` when given. Reported latency is the
    /// method's own run time plus `embed_ms` for methods that use the vector.
    async fn run(
        &self,
        method: SearchMethod,
        query: &str,
        k: u32,
        embedded: Option<(&[f32], u64)>,
    ) -> Result<SearchOutcome> {
        let start = Instant::now();
        let (results, embed_ms) = match (method, embedded) {
            (SearchMethod::Bm25Keyword, _) => (self.bm25_search(query, k).await, 0),
            (SearchMethod::VectorSemantic, Some((vector, ms))) => {
                (self.vector_search_with(vector.to_vec(), k).await, ms)
            }
            (SearchMethod::HybridRrf, Some((vector, ms))) => (
                self.hybrid_rrf_search_with(query, vector.to_vec(), k).await,
                ms,
            ),
            (SearchMethod::FullPipeline, Some((vector, ms))) => (
                self.full_pipeline_search_with(query, vector.to_vec(), k).await,
                ms,
            ),
            (SearchMethod::VectorSemantic, None) => (self.vector_search(query, k).await, 0),
            (SearchMethod::HybridRrf, None) => (self.hybrid_rrf_search(query, k).await, 0),
            (SearchMethod::FullPipeline, None) => (self.full_pipeline_search(query, k).await, 0),
        };
        let results = results.map_err(|e| {
            tracing::error!(method = %method, error = %e, "Search failed");
            e
        })?;
        let latency_ms = start.elapsed().as_millis() as u64 + embed_ms;

        tracing::info!(
            method = %method,
            results = results.len(),
            latency_ms,
            "Search completed"
        );

        Ok(SearchOutcome {
            method,
            query: query.to_string(),
            results,
            latency_ms,
        })
    }

    /// Runs one method. Latency covers query embedding and the engine round trip.
    pub async fn search(
        &self,
        method: SearchMethod,
        query: &str,
        limit: Option<u32>,
    ) -> Result<SearchOutcome> {
        let query = validate_query(query)?;
        self.run(method, query, clamp_limit(limit), None).await
    }

    /// Runs every method concurrently against the same query.
    ///
    /// The query is embedded once and its embedding time is charged to each
    /// vector-based method, so every latency covers the same work as
    /// [`SearchService::search`]. Outcomes follow [`SearchMethod::ALL`] order
    /// regardless of completion order.
    pub async fn compare(&self, query: &str, limit: Option<u32>) -> Result<Comparison> {
        let query = validate_query(query)?;
        let k = clamp_limit(limit);

        let embed_start = Instant::now();
        let vector = self.embeddings.embed_query(query).await?;
        let embed_ms = embed_start.elapsed().as_millis() as u64;

        let runs = SearchMethod::ALL
            .map(|method| self.run(method, query, k, Some((vector.as_slice(), embed_ms))));
        let outcomes = join_all(runs)
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        Ok(Comparison {
            query: query.to_string(),
            outcomes,
        })
    }
}

fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(KidsearchError::Validation("Query cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_QUERY_CHARS {
        return Err(KidsearchError::Validation(format!(
            "Query exceeds {MAX_QUERY_CHARS} characters"
        )));
    }
    Ok(trimmed)
}

fn rank_hits(hits: Vec<Hit>) -> Vec<RankedProduct> {
    hits.into_iter()
        .enumerate()
        .map(|(idx, hit)| RankedProduct {
            rank: idx + 1,
            id: hit.id,
            score: hit.score.unwrap_or(0.0),
            product: Product::from(hit.source),
        })
        .collect()
}
