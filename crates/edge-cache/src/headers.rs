//! Cache debugging headers.

use edge_core::{Request, Response};
use http::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::key::RequestKey;
use crate::policy::RouteDecision;
use crate::snapshot::CacheStatus;

/// Header names for cache debugging.
pub mod header_names {
    /// How the response was produced (HIT, MISS, NETWORK, BYPASS, FALLBACK, SHELL).
    pub const X_CACHE_STATUS: &str = "x-cache-status";
    /// Request key used for lookup.
    pub const X_CACHE_KEY: &str = "x-cache-key";
    /// Snapshot store version that handled the request.
    pub const X_CACHE_VERSION: &str = "x-cache-version";
    /// Routing strategy applied.
    pub const X_CACHE_STRATEGY: &str = "x-cache-strategy";
    /// Request header asking for explain headers.
    pub const X_DEBUG_CACHE: &str = "x-debug-cache";
}

/// Cache explain headers for debugging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheExplainHeaders {
    /// How the response was produced.
    pub status: Option<CacheStatus>,
    /// Request key used.
    pub cache_key: Option<String>,
    /// Snapshot store version.
    pub version: Option<String>,
    /// Routing strategy.
    pub strategy: Option<String>,
}

impl CacheExplainHeaders {
    /// Create new explain headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cache status.
    pub fn with_status(mut self, status: CacheStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set request key.
    pub fn with_key(mut self, key: &RequestKey) -> Self {
        self.cache_key = Some(key.to_string());
        self
    }

    /// Set version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set routing strategy.
    pub fn with_decision(mut self, decision: &RouteDecision) -> Self {
        let strategy = match decision {
            RouteDecision::Bypass { .. } => "bypass",
            RouteDecision::NetworkFirst => "network-first",
            RouteDecision::CacheFirst => "cache-first",
        };
        self.strategy = Some(strategy.to_string());
        self
    }

    /// Convert to header pairs.
    pub fn to_headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::new();

        if let Some(status) = &self.status {
            headers.push((header_names::X_CACHE_STATUS, status.to_string()));
        }

        if let Some(key) = &self.cache_key {
            headers.push((header_names::X_CACHE_KEY, key.clone()));
        }

        if let Some(version) = &self.version {
            headers.push((header_names::X_CACHE_VERSION, version.clone()));
        }

        if let Some(strategy) = &self.strategy {
            headers.push((header_names::X_CACHE_STRATEGY, strategy.clone()));
        }

        headers
    }

    /// Attach the headers to a response. The body is left untouched; values
    /// that are not valid header text are skipped.
    pub fn apply(&self, response: &mut Response) {
        for (name, value) in self.to_headers() {
            if let Ok(value) = HeaderValue::from_str(&value) {
                response
                    .headers
                    .insert(HeaderName::from_static(name), value);
            }
        }
    }
}

/// Whether the request asked for explain headers with `X-Debug-Cache: 1`.
pub fn should_include_debug_headers(request: &Request) -> bool {
    request
        .headers
        .get(header_names::X_DEBUG_CACHE)
        .is_some_and(|v| v.as_bytes() == b"1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_to_headers_order_and_values() {
        let key = RequestKey::get(&Url::parse("https://app.example.com/").unwrap());
        let headers = CacheExplainHeaders::new()
            .with_status(CacheStatus::Shell)
            .with_key(&key)
            .with_version("v3")
            .with_decision(&RouteDecision::CacheFirst)
            .to_headers();

        assert_eq!(
            headers,
            vec![
                ("x-cache-status", "SHELL".to_string()),
                ("x-cache-key", "GET https://app.example.com/".to_string()),
                ("x-cache-version", "v3".to_string()),
                ("x-cache-strategy", "cache-first".to_string()),
            ]
        );
    }

    #[test]
    fn test_apply_keeps_body() {
        let mut response = Response::ok("body{}");
        CacheExplainHeaders::new()
            .with_status(CacheStatus::Hit)
            .apply(&mut response);

        assert_eq!(response.body, b"body{}");
        assert_eq!(response.headers.get("x-cache-status").unwrap(), "HIT");
    }

    #[test]
    fn test_debug_request_header() {
        let plain = Request::get("https://app.example.com/").unwrap();
        assert!(!should_include_debug_headers(&plain));

        let debug = plain.with_header(
            HeaderName::from_static(header_names::X_DEBUG_CACHE),
            HeaderValue::from_static("1"),
        );
        assert!(should_include_debug_headers(&debug));
    }
}
