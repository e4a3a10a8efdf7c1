use std::sync::Arc;

use crate::config::Config;
use crate::elastic::ElasticClient;
use crate::embeddings::EmbeddingProvider;
use crate::services::SearchService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub elastic: ElasticClient,
    pub embeddings: EmbeddingProvider,
    pub search: SearchService,
}

impl AppState {
    pub fn new(config: Config, elastic: ElasticClient, embeddings: EmbeddingProvider) -> Self {
        let config = Arc::new(config);
        let search = SearchService::new(elastic.clone(), embeddings.clone(), &config);

        Self {
            config,
            elastic,
            embeddings,
            search,
        }
    }
}
