// Common test utilities for integration tests
#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Once;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kidsearch::api::AppState;
use kidsearch::config::{
    Config, ElasticsearchConfig, EmbeddingsConfig, RetrievalConfig, ServerConfig,
};
use kidsearch::elastic::ElasticClient;
use kidsearch::embeddings::EmbeddingProvider;

pub const INDEX: &str = "amazon_2020_bbq";
pub const SEARCH_PATH: &str = "/amazon_2020_bbq/_search";
/// `elastic:changeme`
pub const BASIC_AUTH: &str = "Basic ZWxhc3RpYzpjaGFuZ2VtZQ==";

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// One mock server standing in for Elasticsearch, one for the embedding API.
pub struct Backends {
    pub elastic: MockServer,
    pub embeddings: MockServer,
}

impl Backends {
    pub async fn start() -> Self {
        init_test_logger();
        Self {
            elastic: MockServer::start().await,
            embeddings: MockServer::start().await,
        }
    }

    pub fn config(&self, api_keys: Vec<String>) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                api_keys,
            },
            elasticsearch: ElasticsearchConfig {
                url: Some(self.elastic.uri()),
                username: Some("elastic".to_string()),
                password: Some("changeme".to_string()),
                timeout_secs: 5,
                max_retries: 1,
                ..ElasticsearchConfig::default()
            },
            embeddings: EmbeddingsConfig {
                model: "openai/text-embedding-3-small".to_string(),
                dimensions: 3,
                api_key: Some("embed-key".to_string()),
                base_url: Some(format!("{}/v1", self.embeddings.uri())),
                timeout_secs: 5,
                max_retries: 0,
                ..EmbeddingsConfig::default()
            },
            retrieval: RetrievalConfig::default(),
        }
    }

    pub fn state(&self, api_keys: Vec<String>) -> AppState {
        state_from(self.config(api_keys))
    }

    /// Answers every embedding request with the same 3-d vector.
    pub async fn mount_embeddings(&self, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [{"embedding": [0.1, 0.2, 0.3]}]})),
            )
            .expect(expected_calls)
            .mount(&self.embeddings)
            .await;
    }
}

pub fn state_from(config: Config) -> AppState {
    let elastic = ElasticClient::new(&config.elasticsearch).unwrap();
    let embeddings = EmbeddingProvider::new(&config.embeddings).unwrap();
    AppState::new(config, elastic, embeddings)
}

/// A catalogue hit shaped like the CSV-loaded index: string prices and
/// `"nan"` for missing cells.
pub fn product_hit(id: &str, name: &str, score: f64) -> Value {
    json!({
        "_index": INDEX,
        "_id": id,
        "_score": score,
        "_source": {
            "product_name": name,
            "brand": "nan",
            "price": "19.99",
            "category": "Toys & Games | Building Toys",
            "image_url": "https://images.example.com/p.jpg"
        }
    })
}

pub fn search_response(hits: Vec<Value>) -> Value {
    json!({
        "took": 4,
        "timed_out": false,
        "hits": {
            "total": {"value": hits.len(), "relation": "eq"},
            "max_score": hits.first().map(|h| h["_score"].clone()),
            "hits": hits
        }
    })
}
