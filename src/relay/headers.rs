//! Header filtering between the inbound side and upstreams.
//!
//! Hop-by-hop headers never cross the relay. Framing headers are dropped
//! because bodies are buffered and may be re-serialized.

use axum::http::{HeaderMap, HeaderName};

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Headers to send upstream, taken from the inbound request.
pub fn upstream_request_headers(inbound: &HeaderMap) -> HeaderMap {
    filter(inbound, &["host", "content-length", "accept-encoding"])
}

/// Headers to send back to the caller, taken from an upstream response.
pub fn client_response_headers(upstream: &HeaderMap) -> HeaderMap {
    filter(upstream, &["content-length", "content-encoding"])
}

fn filter(headers: &HeaderMap, extra: &[&str]) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name) || extra.contains(&name.as_str()) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_upstream_request_headers() {
        let mut inbound = HeaderMap::new();
        inbound.insert("host", HeaderValue::from_static("relay.local:26000"));
        inbound.insert("connection", HeaderValue::from_static("keep-alive"));
        inbound.insert("accept-encoding", HeaderValue::from_static("gzip"));
        inbound.insert("user-agent", HeaderValue::from_static("Java/21"));
        inbound.append("x-multi", HeaderValue::from_static("a"));
        inbound.append("x-multi", HeaderValue::from_static("b"));

        let out = upstream_request_headers(&inbound);
        assert!(out.get("host").is_none());
        assert!(out.get("connection").is_none());
        assert!(out.get("accept-encoding").is_none());
        assert_eq!(out.get("user-agent").unwrap(), "Java/21");
        assert_eq!(out.get_all("x-multi").iter().count(), 2);
    }

    #[test]
    fn test_client_response_headers() {
        let mut upstream = HeaderMap::new();
        upstream.insert("content-type", HeaderValue::from_static("application/json"));
        upstream.insert("content-length", HeaderValue::from_static("12"));
        upstream.insert("transfer-encoding", HeaderValue::from_static("chunked"));

        let out = client_response_headers(&upstream);
        assert_eq!(out.len(), 1);
        assert_eq!(out.get("content-type").unwrap(), "application/json");
    }
}
