use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};

use super::v1::response::ApiResponse;
use crate::error::KidsearchError;

/// JSON body extractor whose rejections use the v1 error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonBodyRejection))]
pub struct AppJson<T>(pub T);

pub struct JsonBodyRejection(KidsearchError);

impl From<JsonRejection> for JsonBodyRejection {
    fn from(rejection: JsonRejection) -> Self {
        Self(map_json_rejection(rejection))
    }
}

impl IntoResponse for JsonBodyRejection {
    fn into_response(self) -> Response {
        ApiResponse::<()>::from(self.0).into_response()
    }
}

fn map_json_rejection(rejection: JsonRejection) -> KidsearchError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let message = err.body_text();
            if let Some(field) = extract_missing_field(&message) {
                KidsearchError::Validation(format!("Missing required field: {field}"))
            } else {
                KidsearchError::Validation(format!("Invalid JSON: {message}"))
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            KidsearchError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => KidsearchError::Validation(
            "Missing `Content-Type: application/json` header".to_string(),
        ),
        JsonRejection::BytesRejection(_) => {
            KidsearchError::Internal("Failed to read request body".to_string())
        }
        _ => KidsearchError::Validation(rejection.body_text()),
    }
}

fn extract_missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let remaining = message.get(start..)?;
    let end = remaining.find('`')?;
    remaining.get(..end)
}
