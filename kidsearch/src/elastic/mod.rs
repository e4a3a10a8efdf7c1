mod client;
mod cloud_id;
pub mod query;
mod response;

pub use client::ElasticClient;
pub use cloud_id::decode_cloud_id;
pub use query::{QueryBuilder, SearchBody};
pub use response::{ClusterInfo, Hit, ProductSource, SearchResponse};
