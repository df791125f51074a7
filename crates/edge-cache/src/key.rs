//! Request key composition.

use edge_core::Request;
use http::Method;
use serde::{Deserialize, Serialize};
use url::Url;

/// Normalized identity of a fetch: method plus URL without fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestKey {
    method: String,
    url: String,
}

impl RequestKey {
    /// Key for a GET of `url`.
    pub fn get(url: &Url) -> Self {
        Self::new(&Method::GET, url)
    }

    /// Key for an arbitrary method.
    pub fn new(method: &Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self {
            method: method.as_str().to_string(),
            url: url.into(),
        }
    }

    /// Key for an intercepted request.
    pub fn from_request(request: &Request) -> Self {
        Self::new(&request.method, &request.url)
    }

    /// HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Normalized URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_is_ignored() {
        let a = RequestKey::get(&Url::parse("https://app.example.com/#/sleep").unwrap());
        let b = RequestKey::get(&Url::parse("https://app.example.com/").unwrap());
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "GET https://app.example.com/");
    }

    #[test]
    fn test_query_is_significant() {
        let a = RequestKey::get(&Url::parse("https://app.example.com/js/app.js?v=1").unwrap());
        let b = RequestKey::get(&Url::parse("https://app.example.com/js/app.js?v=2").unwrap());
        assert_ne!(a, b);
    }

    #[test]
    fn test_method_is_significant() {
        let url = Url::parse("https://app.example.com/form").unwrap();
        assert_ne!(RequestKey::get(&url), RequestKey::new(&Method::POST, &url));
    }

    #[test]
    fn test_from_request() {
        let req = Request::get("https://app.example.com/css/mobile.css").unwrap();
        let key = RequestKey::from_request(&req);
        assert_eq!(key.method(), "GET");
        assert_eq!(key.url(), "https://app.example.com/css/mobile.css");
    }
}
