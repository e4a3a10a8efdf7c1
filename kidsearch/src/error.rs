use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KidsearchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Elasticsearch error ({status}): {message}")]
    Elasticsearch { status: u16, message: String },

    #[error("Invalid cloud id: {0}")]
    CloudId(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("API rate limit exceeded, retry after {retry_after:?} seconds")]
    ApiRateLimit { retry_after: Option<u64> },

    #[error("API authentication error: {0}")]
    ApiAuth(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for KidsearchError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            KidsearchError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            KidsearchError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            KidsearchError::Embedding(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            KidsearchError::Elasticsearch { message, .. } => {
                (StatusCode::BAD_GATEWAY, message.clone())
            }
            KidsearchError::CloudId(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            KidsearchError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            KidsearchError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            KidsearchError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            KidsearchError::UrlParse(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            KidsearchError::ApiRateLimit { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, self.to_string())
            }
            KidsearchError::ApiAuth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            KidsearchError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, KidsearchError>;
