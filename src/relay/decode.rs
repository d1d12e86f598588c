//! Upstream response body decoding.
//!
//! The content type decides how a body is re-serialized toward the caller:
//! anything containing `application/json` is parsed into a JSON value,
//! everything else is passed through as text.

use axum::http::{header::CONTENT_TYPE, HeaderMap};
use thiserror::Error;

use crate::relay::types::RelayBody;

/// Body declared as JSON but not parseable as JSON.
#[derive(Debug, Error)]
#[error("Malformed JSON body: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// True when the `content-type` header mentions `application/json`.
pub fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false)
}

/// Decode a buffered upstream body.
///
/// A body declared as JSON must parse, even when empty. Other empty bodies
/// decode to [`RelayBody::Empty`].
pub fn decode_body(headers: &HeaderMap, body: &[u8]) -> Result<RelayBody, DecodeError> {
    if is_json(headers) {
        Ok(RelayBody::Json(serde_json::from_slice(body)?))
    } else if body.is_empty() {
        Ok(RelayBody::Empty)
    } else {
        Ok(RelayBody::Text(String::from_utf8_lossy(body).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn test_json_content_type() {
        let body = decode_body(&headers("application/json"), br#"{"a":1}"#).unwrap();
        assert_eq!(body, RelayBody::Json(json!({"a": 1})));
    }

    #[test]
    fn test_json_with_charset() {
        let body = decode_body(&headers("application/json; charset=utf-8"), b"[1,2]").unwrap();
        assert_eq!(body, RelayBody::Json(json!([1, 2])));
    }

    #[test]
    fn test_text_is_untouched() {
        let body = decode_body(&headers("text/plain"), b"hello").unwrap();
        assert_eq!(body, RelayBody::Text("hello".to_string()));

        // JSON-looking text stays text without a JSON content type
        let body = decode_body(&HeaderMap::new(), br#"{"a":1}"#).unwrap();
        assert_eq!(body, RelayBody::Text(r#"{"a":1}"#.to_string()));
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(decode_body(&headers("application/json"), b"{not json").is_err());
    }

    #[test]
    fn test_empty_body() {
        assert!(decode_body(&headers("application/json"), b"").is_err());

        let body = decode_body(&headers("text/plain"), b"").unwrap();
        assert_eq!(body, RelayBody::Empty);
        let body = decode_body(&HeaderMap::new(), b"").unwrap();
        assert_eq!(body, RelayBody::Empty);
    }
}
