use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

use super::cloud_id::decode_cloud_id;
use super::query::SearchBody;
use super::response::{ClusterInfo, ErrorBody, SearchResponse};
use crate::config::ElasticsearchConfig;
use crate::error::{KidsearchError, Result};

/// Thin HTTP client for the Elasticsearch REST API.
#[derive(Clone)]
pub struct ElasticClient {
    client: Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
    max_retries: u32,
}

impl ElasticClient {
    pub fn new(config: &ElasticsearchConfig) -> Result<Self> {
        let mut base_url = match (&config.cloud_id, &config.url) {
            (Some(cloud_id), _) => decode_cloud_id(cloud_id)?,
            (None, Some(url)) => Url::parse(url)?,
            (None, None) => {
                return Err(KidsearchError::Config(
                    "Set CLOUD_ID or ELASTICSEARCH_URL".to_string(),
                ))
            }
        };

        // Relative joins below drop the last path segment unless it ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KidsearchError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
            max_retries: config.max_retries,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.username {
            Some(username) => builder.basic_auth(username, self.password.as_ref()),
            None => builder,
        }
    }

    /// Runs `POST /{index}/_search`.
    pub async fn search(&self, index: &str, body: &SearchBody) -> Result<SearchResponse> {
        let url = self.endpoint(&format!("{index}/_search"))?;

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(100 * 2_u64.pow(attempt - 1));
                tracing::debug!(attempt, ?delay, "Retrying Elasticsearch search");
                tokio::time::sleep(delay).await;
            }

            let response = self
                .request(reqwest::Method::POST, url.clone())
                .json(body)
                .send()
                .await;

            let resp = match response {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::warn!(error = %e, "Elasticsearch request failed");
                    last_error = Some(KidsearchError::Http(e));
                    continue;
                }
            };

            let status = resp.status();
            if status.is_success() {
                return Ok(resp.json::<SearchResponse>().await?);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok());
                last_error = Some(KidsearchError::ApiRateLimit { retry_after });
                continue;
            }

            let text = resp.text().await.unwrap_or_default();

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(KidsearchError::ApiAuth(error_message(&text)));
            }

            let err = KidsearchError::Elasticsearch {
                status: status.as_u16(),
                message: error_message(&text),
            };
            if status.is_server_error() {
                last_error = Some(err);
                continue;
            }
            return Err(err);
        }

        Err(last_error
            .unwrap_or_else(|| KidsearchError::Internal("Elasticsearch search failed".to_string())))
    }

    /// Fetches cluster name and version via `GET /`.
    pub async fn ping(&self) -> Result<ClusterInfo> {
        let url = self.base_url.clone();
        let resp = self.request(reqwest::Method::GET, url).send().await?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.json::<ClusterInfo>().await?);
        }

        let text = resp.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(KidsearchError::ApiAuth(error_message(&text)));
        }
        Err(KidsearchError::Elasticsearch {
            status: status.as_u16(),
            message: error_message(&text),
        })
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.message(),
        Err(_) if body.is_empty() => "empty response body".to_string(),
        Err(_) => body.chars().take(500).collect(),
    }
}
