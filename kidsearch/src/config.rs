use serde::Deserialize;
use std::env;

use crate::error::{KidsearchError, Result};

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Reads a variable, treating an empty or whitespace-only value as unset.
fn env_non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub elasticsearch: ElasticsearchConfig,
    pub embeddings: EmbeddingsConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means the search API is public.
    pub api_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElasticsearchConfig {
    pub cloud_id: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub index: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub dimensions: usize,
    pub batch_size: usize,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub cache_size: usize,
}

/// Knobs of the retriever trees sent to Elasticsearch.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    pub knn_num_candidates: u32,
    pub hybrid_knn_k: u32,
    pub rrf_rank_window: u32,
    pub rerank_inference_id: String,
    pub rerank_field: String,
    pub rerank_window: u32,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            cloud_id: None,
            url: None,
            username: None,
            password: None,
            index: "amazon_2020_bbq".to_string(),
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            batch_size: 32,
            api_key: None,
            base_url: None,
            timeout_secs: 30,
            max_retries: 3,
            cache_size: 1000,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            knn_num_candidates: 100,
            hybrid_knn_k: 50,
            rrf_rank_window: 100,
            rerank_inference_id: "jina_reranker_v3".to_string(),
            rerank_field: "document_text".to_string(),
            rerank_window: 50,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let es_defaults = ElasticsearchConfig::default();
        let emb_defaults = EmbeddingsConfig::default();
        let ret_defaults = RetrievalConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("KIDSEARCH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("KIDSEARCH_PORT", 8501),
                api_keys: env::var("KIDSEARCH_API_KEYS")
                    .map(|keys| {
                        keys.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            elasticsearch: ElasticsearchConfig {
                cloud_id: env_non_empty("CLOUD_ID"),
                url: env_non_empty("ELASTICSEARCH_URL"),
                username: env_non_empty("USERNAME"),
                password: env_non_empty("PASSWORD"),
                index: env::var("ELASTICSEARCH_INDEX").unwrap_or(es_defaults.index),
                timeout_secs: parse_env_or("ELASTICSEARCH_TIMEOUT", es_defaults.timeout_secs),
                max_retries: parse_env_or("ELASTICSEARCH_MAX_RETRIES", es_defaults.max_retries),
            },
            embeddings: EmbeddingsConfig {
                model: env::var("EMBEDDING_MODEL").unwrap_or(emb_defaults.model),
                dimensions: parse_env_or("EMBEDDING_DIMENSIONS", emb_defaults.dimensions),
                batch_size: parse_env_or("EMBEDDING_BATCH_SIZE", emb_defaults.batch_size),
                api_key: env_non_empty("EMBEDDING_API_KEY"),
                base_url: env_non_empty("EMBEDDING_BASE_URL"),
                timeout_secs: parse_env_or("EMBEDDING_TIMEOUT", emb_defaults.timeout_secs),
                max_retries: parse_env_or("EMBEDDING_MAX_RETRIES", emb_defaults.max_retries),
                cache_size: parse_env_or("EMBEDDING_CACHE_SIZE", emb_defaults.cache_size),
            },
            retrieval: RetrievalConfig {
                knn_num_candidates: parse_env_or(
                    "KNN_NUM_CANDIDATES",
                    ret_defaults.knn_num_candidates,
                ),
                hybrid_knn_k: parse_env_or("HYBRID_KNN_K", ret_defaults.hybrid_knn_k),
                rrf_rank_window: parse_env_or("RRF_RANK_WINDOW", ret_defaults.rrf_rank_window),
                rerank_inference_id: env::var("RERANK_INFERENCE_ID")
                    .unwrap_or(ret_defaults.rerank_inference_id),
                rerank_field: env::var("RERANK_FIELD").unwrap_or(ret_defaults.rerank_field),
                rerank_window: parse_env_or("RERANK_WINDOW", ret_defaults.rerank_window),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Checks that the deployment secrets needed to reach the cluster are present.
    pub fn validate(&self) -> Result<()> {
        let es = &self.elasticsearch;
        if es.cloud_id.is_none() && es.url.is_none() {
            return Err(KidsearchError::Config(
                "Elasticsearch endpoint not configured. Set CLOUD_ID or ELASTICSEARCH_URL."
                    .to_string(),
            ));
        }
        if es.username.is_none() || es.password.is_none() {
            return Err(KidsearchError::Config(
                "Elasticsearch credentials not configured. Set USERNAME and PASSWORD.".to_string(),
            ));
        }
        if self.embeddings.dimensions == 0 {
            return Err(KidsearchError::Config(
                "EMBEDDING_DIMENSIONS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Known embedding providers that use OpenAI-compatible APIs
const KNOWN_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio", "local"];

/// Parse a model name into (provider, model) tuple.
///
/// Hub namespaces such as `sentence-transformers/` are not providers; the
/// whole string is then treated as a local model name.
pub fn parse_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("local", model)
}
