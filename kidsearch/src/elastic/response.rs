use serde::de::Deserializer;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
    pub hits: Hits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TotalHits {
    pub value: u64,
    pub relation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: ProductSource,
}

/// Raw `_source` document as stored in the catalogue index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductSource {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Accepts a number, a numeric string, or null. The catalogue was loaded
/// from CSV, so prices occasionally arrive as strings.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().trim_start_matches('$').parse().ok(),
        _ => None,
    }
    .filter(|p: &f64| p.is_finite()))
}

/// Subset of `GET /` used for health reporting.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterInfo {
    #[serde(default)]
    pub cluster_name: String,
    pub version: ClusterVersion,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClusterVersion {
    pub number: String,
}

/// Error body returned by Elasticsearch on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorDetail {
    Structured {
        #[serde(rename = "type", default)]
        kind: String,
        #[serde(default)]
        reason: String,
    },
    Plain(String),
}

impl ErrorDetail {
    pub fn message(&self) -> String {
        match self {
            ErrorDetail::Structured { kind, reason } if kind.is_empty() => reason.clone(),
            ErrorDetail::Structured { kind, reason } => format!("{kind}: {reason}"),
            ErrorDetail::Plain(message) => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_search_response() {
        let raw = json!({
            "took": 7,
            "timed_out": false,
            "hits": {
                "total": {"value": 2, "relation": "eq"},
                "max_score": 4.2,
                "hits": [
                    {
                        "_index": "amazon_2020_bbq",
                        "_id": "a1",
                        "_score": 4.2,
                        "_source": {
                            "product_name": "LEGO Star Wars X-Wing",
                            "brand": "LEGO",
                            "price": 49.99,
                            "category": "Toys & Games | Building Toys",
                            "image_url": "https://img.example/x.jpg"
                        }
                    },
                    {
                        "_id": "a2",
                        "_score": null,
                        "_source": {"product_name": "Mystery box", "price": "12.50"}
                    }
                ]
            }
        });

        let resp: SearchResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.took, 7);
        assert_eq!(resp.hits.total.as_ref().map(|t| t.value), Some(2));
        assert_eq!(resp.hits.hits.len(), 2);
        assert_eq!(resp.hits.hits[0].source.price, Some(49.99));
        assert_eq!(resp.hits.hits[1].score, None);
        assert_eq!(resp.hits.hits[1].source.price, Some(12.5));
        assert!(resp.hits.hits[1].source.brand.is_none());
    }

    #[test]
    fn unparseable_price_becomes_none() {
        let source: ProductSource =
            serde_json::from_value(json!({"product_name": "x", "price": "nan"})).unwrap();
        assert_eq!(source.price, None);
    }

    #[test]
    fn error_detail_message() {
        let body: ErrorBody = serde_json::from_value(json!({
            "error": {"type": "index_not_found_exception", "reason": "no such index [x]"},
            "status": 404
        }))
        .unwrap();
        assert_eq!(
            body.error.message(),
            "index_not_found_exception: no such index [x]"
        );

        let body: ErrorBody =
            serde_json::from_value(json!({"error": "plain failure"})).unwrap();
        assert_eq!(body.error.message(), "plain failure");
    }
}
