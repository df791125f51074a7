//! Per-request routing policy.

use edge_core::{Request, RoutingConfig};
use http::Method;
use serde::{Deserialize, Serialize};

/// Why a request is passed through without touching the snapshot store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BypassReason {
    /// Only GET requests are snapshotted.
    NonGet(String),
    /// Path contains an API segment.
    ApiPath(String),
    /// Host is a known backend-data host.
    BackendHost(String),
}

impl std::fmt::Display for BypassReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonGet(method) => write!(f, "method {} is not cacheable", method),
            Self::ApiPath(segment) => write!(f, "API path segment '{}'", segment),
            Self::BackendHost(host) => write!(f, "backend host {}", host),
        }
    }
}

/// Strategy chosen for one intercepted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum RouteDecision {
    /// Network only; the store is neither read nor written.
    Bypass { reason: BypassReason },
    /// Third-party resource: network, then a stored copy on failure. Never written.
    NetworkFirst,
    /// Same-origin asset: store, then network with write-back of 2xx responses.
    CacheFirst,
}

impl RouteDecision {
    /// Whether the snapshot store may answer this request.
    pub fn reads_snapshot(&self) -> bool {
        !matches!(self, Self::Bypass { .. })
    }

    /// Whether network responses may be written to the snapshot store.
    pub fn writes_snapshot(&self) -> bool {
        matches!(self, Self::CacheFirst)
    }
}

/// Classifies intercepted requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutePolicy {
    /// Path segments marking dynamic API requests.
    api_segments: Vec<String>,
    /// Backend-data hosts (exact or `*.suffix`).
    backend_hosts: Vec<String>,
}

impl RoutePolicy {
    /// Create a policy that bypasses nothing but non-GET requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from worker configuration.
    pub fn from_config(config: &RoutingConfig) -> Self {
        let mut policy = Self::new();
        for segment in &config.api_segments {
            policy = policy.with_api_segment(segment.as_str());
        }
        for host in &config.backend_hosts {
            policy = policy.with_backend_host(host.as_str());
        }
        policy
    }

    /// Add an API path segment (`api` matches `/api/sleep` and `/v1/api`).
    pub fn with_api_segment(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into().trim_matches('/').to_string();
        if !segment.is_empty() {
            self.api_segments.push(segment);
        }
        self
    }

    /// Add a backend host. Supports a leading `*.` wildcard.
    ///
    /// Examples:
    /// - `api.example.com` - matches only `api.example.com`
    /// - `*.supabase.co` - matches `abc.supabase.co`, not `supabase.co`
    pub fn with_backend_host(mut self, host: impl Into<String>) -> Self {
        self.backend_hosts.push(host.into().to_lowercase());
        self
    }

    /// Decide how a request is served, relative to the worker's origin.
    pub fn classify(&self, request: &Request, origin: &url::Origin) -> RouteDecision {
        if request.method != Method::GET {
            return RouteDecision::Bypass {
                reason: BypassReason::NonGet(request.method.to_string()),
            };
        }

        if let Some(segment) = self.api_segment(request) {
            return RouteDecision::Bypass {
                reason: BypassReason::ApiPath(segment.to_string()),
            };
        }

        if let Some(host) = request.url.host_str() {
            let host = host.to_lowercase();
            if self.backend_hosts.iter().any(|p| matches_host(&host, p)) {
                return RouteDecision::Bypass {
                    reason: BypassReason::BackendHost(host),
                };
            }
        }

        if request.is_same_origin(origin) {
            RouteDecision::CacheFirst
        } else {
            RouteDecision::NetworkFirst
        }
    }

    fn api_segment(&self, request: &Request) -> Option<&str> {
        let segments = request.url.path_segments()?;
        for segment in segments {
            if let Some(api) = self.api_segments.iter().find(|s| s.as_str() == segment) {
                return Some(api.as_str());
            }
        }
        None
    }
}

fn matches_host(host: &str, pattern: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(suffix) => host
            .strip_suffix(suffix)
            .is_some_and(|rest| rest.ends_with('.') && rest.len() > 1),
        None => host == pattern,
    }
}
