use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};

use super::api::{default_base_url, ApiConfig, EmbeddingApiClient};
use super::cache::QueryVectorCache;
use crate::config::{parse_provider_model, EmbeddingsConfig};
use crate::error::{KidsearchError, Result};

#[derive(Clone)]
enum EmbeddingBackend {
    Local {
        model: Arc<Mutex<TextEmbedding>>,
        batch_size: usize,
    },
    Api(EmbeddingApiClient),
}

/// Turns search queries into vectors comparable with the indexed product embeddings.
#[derive(Clone)]
pub struct EmbeddingProvider {
    backend: EmbeddingBackend,
    model_name: String,
    dimensions: usize,
    cache: Option<QueryVectorCache>,
}

impl EmbeddingProvider {
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let (provider, model_name) = parse_provider_model(&config.model);

        let backend = if provider.eq_ignore_ascii_case("local") {
            let embedding_model = resolve_embedding_model(model_name)?;
            EmbeddingBackend::Local {
                model: Arc::new(Mutex::new(build_model(embedding_model)?)),
                batch_size: config.batch_size.max(1),
            }
        } else {
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| default_base_url(provider).to_string());
            EmbeddingBackend::Api(EmbeddingApiClient::new(ApiConfig {
                base_url,
                api_key: config.api_key.clone(),
                model: model_name.to_string(),
                timeout_secs: config.timeout_secs,
                max_retries: config.max_retries,
            })?)
        };

        // The supported local models use uncased tokenizers; API models may not.
        let fold_case = matches!(backend, EmbeddingBackend::Local { .. });

        Ok(Self {
            backend,
            model_name: model_name.to_string(),
            dimensions: config.dimensions,
            cache: QueryVectorCache::new(config.cache_size, fold_case),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn is_local(&self) -> bool {
        matches!(self.backend, EmbeddingBackend::Local { .. })
    }

    pub async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        match &self.backend {
            EmbeddingBackend::Local { model, batch_size } => {
                let model = Arc::clone(model);
                let batch_size = *batch_size;
                tokio::task::spawn_blocking(move || {
                    let mut model = model.lock().map_err(|e| {
                        KidsearchError::Embedding(format!("Embedding model lock poisoned: {e}"))
                    })?;
                    model
                        .embed(texts, Some(batch_size))
                        .map_err(|e| KidsearchError::Embedding(e.to_string()))
                })
                .await
                .map_err(|e| KidsearchError::Embedding(format!("Embedding worker failed: {e}")))?
            }
            EmbeddingBackend::Api(client) => {
                let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
                client.embed(&refs).await
            }
        }
    }

    /// Embeds a search query. The catalogue vectors were produced from raw
    /// text, so no instruction prefix is added.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(query) {
                tracing::debug!("Query embedding cache hit");
                return Ok(hit.as_ref().clone());
            }
        }

        let vector = self
            .embed(vec![query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| KidsearchError::Embedding("No embedding generated".to_string()))?;

        if vector.len() != self.dimensions {
            return Err(KidsearchError::Embedding(format!(
                "Model '{}' produced {} dimensions, index expects {}",
                self.model_name,
                vector.len(),
                self.dimensions
            )));
        }

        if let Some(cache) = &self.cache {
            cache.put(query, Arc::new(vector.clone()));
        }

        Ok(vector)
    }
}

fn resolve_embedding_model(model_name: &str) -> Result<EmbeddingModel> {
    match model_name {
        "all-MiniLM-L6-v2" | "sentence-transformers/all-MiniLM-L6-v2" => {
            Ok(EmbeddingModel::AllMiniLML6V2)
        }
        "all-MiniLM-L12-v2" | "sentence-transformers/all-MiniLM-L12-v2" => {
            Ok(EmbeddingModel::AllMiniLML12V2)
        }
        "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "BAAI/bge-base-en-v1.5" | "bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
        "nomic-embed-text-v1.5" | "nomic-ai/nomic-embed-text-v1.5" => {
            Ok(EmbeddingModel::NomicEmbedTextV15)
        }
        other => Err(KidsearchError::Config(format!(
            "Unsupported local embedding model: {other}"
        ))),
    }
}

fn build_model(embedding_model: EmbeddingModel) -> Result<TextEmbedding> {
    TextEmbedding::try_new(InitOptions::new(embedding_model).with_show_download_progress(true))
        .map_err(|e| KidsearchError::Embedding(e.to_string()))
}
