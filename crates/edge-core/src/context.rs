//! Intercepted requests and the responses served for them.

use std::sync::atomic::{AtomicU64, Ordering};

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method, StatusCode};
use url::Url;

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        let seq = NEXT_REQUEST.fetch_add(1, Ordering::Relaxed);
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        Self(format!("{:x}-{:x}", nanos, seq))
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request mode as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Top-level page navigation.
    Navigate,
    /// Same-origin subresource.
    SameOrigin,
    /// Opaque cross-origin request.
    NoCors,
    /// CORS request.
    #[default]
    Cors,
}

impl std::fmt::Display for RequestMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Navigate => write!(f, "navigate"),
            Self::SameOrigin => write!(f, "same-origin"),
            Self::NoCors => write!(f, "no-cors"),
            Self::Cors => write!(f, "cors"),
        }
    }
}

/// A request intercepted from the page.
#[derive(Debug, Clone)]
pub struct Request {
    /// Unique request identifier.
    pub id: RequestId,
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL.
    pub url: Url,
    /// Request mode.
    pub mode: RequestMode,
    /// Request headers.
    pub headers: HeaderMap,
}

impl Request {
    /// Create a request with an explicit method.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            id: RequestId::generate(),
            method,
            url,
            mode: RequestMode::default(),
            headers: HeaderMap::new(),
        }
    }

    /// Parse a URL into a GET request.
    pub fn get(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Method::GET, Url::parse(url)?))
    }

    /// Parse a URL into a top-level navigation request.
    pub fn navigate(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::get(url)?.with_mode(RequestMode::Navigate))
    }

    /// Set the request mode.
    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the HTTP method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Whether this is a top-level page navigation.
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Whether the request targets `origin`.
    pub fn is_same_origin(&self, origin: &url::Origin) -> bool {
        &self.url.origin() == origin
    }
}

/// A response captured from the network or replayed from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a response with a status and body.
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Create a `200 OK` response.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Set the content type.
    pub fn with_content_type(self, content_type: &'static str) -> Self {
        self.with_header(CONTENT_TYPE, HeaderValue::from_static(content_type))
    }

    /// Add a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_navigation_request() {
        let req = Request::navigate("https://app.example.com/dashboard").unwrap();
        assert!(req.is_navigation());
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.mode.to_string(), "navigate");
    }

    #[test]
    fn test_same_origin() {
        let origin = Url::parse("https://app.example.com/").unwrap().origin();
        let local = Request::get("https://app.example.com/css/mobile.css").unwrap();
        let cdn = Request::get("https://cdn.jsdelivr.net/npm/chart.js").unwrap();
        let other_port = Request::get("https://app.example.com:8443/").unwrap();

        assert!(local.is_same_origin(&origin));
        assert!(!cdn.is_same_origin(&origin));
        assert!(!other_port.is_same_origin(&origin));
    }

    #[test]
    fn test_response_success_range() {
        assert!(Response::ok("x").is_success());
        assert!(Response::new(StatusCode::NO_CONTENT, "").is_success());
        assert!(!Response::new(StatusCode::NOT_FOUND, "").is_success());
        assert!(!Response::new(StatusCode::MOVED_PERMANENTLY, "").is_success());
    }

    #[test]
    fn test_response_text_lossy() {
        let resp = Response::ok(vec![b'h', b'i', 0xff]);
        assert_eq!(resp.text(), "hi\u{fffd}");
    }
}
