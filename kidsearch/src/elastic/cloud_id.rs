use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use url::Url;

use crate::error::{KidsearchError, Result};

/// Resolves an Elastic Cloud id to the HTTPS endpoint of its Elasticsearch node.
///
/// A cloud id looks like `<label>:<base64>` where the payload decodes to
/// `host[:port]$es_uuid[$kibana_uuid]`. The cluster is reachable at
/// `https://<es_uuid>.<host>:<port>`, port 443 unless the host carries one.
pub fn decode_cloud_id(cloud_id: &str) -> Result<Url> {
    let (_, encoded) = cloud_id
        .trim()
        .split_once(':')
        .ok_or_else(|| KidsearchError::CloudId("missing ':' separator".to_string()))?;

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| KidsearchError::CloudId(format!("payload is not base64: {e}")))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| KidsearchError::CloudId("payload is not UTF-8".to_string()))?;

    let mut parts = decoded.split('$');
    let host_part = parts.next().filter(|s| !s.is_empty());
    let es_uuid = parts.next().filter(|s| !s.is_empty());
    let (Some(host_part), Some(es_uuid)) = (host_part, es_uuid) else {
        return Err(KidsearchError::CloudId(
            "payload must contain host and Elasticsearch id".to_string(),
        ));
    };

    let (host, port) = match host_part.rsplit_once(':') {
        Some((host, port)) => {
            let port: u16 = port
                .parse()
                .map_err(|_| KidsearchError::CloudId(format!("invalid port '{port}'")))?;
            (host, port)
        }
        None => (host_part, 443),
    };

    let url = Url::parse(&format!("https://{es_uuid}.{host}:{port}"))?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(payload: &str) -> String {
        STANDARD.encode(payload)
    }

    #[test]
    fn decodes_standard_cloud_id() {
        let id = format!("my-deploy:{}", encode("us-central1.gcp.cloud.es.io$abc123$kib456"));
        let url = decode_cloud_id(&id).unwrap();
        assert_eq!(url.host_str(), Some("abc123.us-central1.gcp.cloud.es.io"));
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.port_or_known_default(), Some(443));
    }

    #[test]
    fn keeps_explicit_port() {
        let id = format!("x:{}", encode("eu-west-1.aws.found.io:9243$esid$kbid"));
        let url = decode_cloud_id(&id).unwrap();
        assert_eq!(url.host_str(), Some("esid.eu-west-1.aws.found.io"));
        assert_eq!(url.port(), Some(9243));
    }

    #[test]
    fn empty_label_is_allowed() {
        let id = format!(":{}", encode("host.example$es"));
        let url = decode_cloud_id(&id).unwrap();
        assert_eq!(url.host_str(), Some("es.host.example"));
    }

    #[test]
    fn rejects_missing_separator() {
        let err = decode_cloud_id("no-separator").unwrap_err();
        assert!(matches!(err, KidsearchError::CloudId(_)));
    }

    #[test]
    fn rejects_bad_base64() {
        assert!(decode_cloud_id("label:!!!not-base64!!!").is_err());
    }

    #[test]
    fn rejects_missing_es_uuid() {
        let id = format!("label:{}", encode("host.example"));
        assert!(decode_cloud_id(&id).is_err());

        let id = format!("label:{}", encode("host.example$"));
        assert!(decode_cloud_id(&id).is_err());
    }
}
