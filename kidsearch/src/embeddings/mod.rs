mod api;
mod cache;
mod provider;

pub use api::{ApiConfig, EmbeddingApiClient};
pub use cache::QueryVectorCache;
pub use provider::EmbeddingProvider;
