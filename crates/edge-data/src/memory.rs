//! Scriptable in-memory network (for development/testing).

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use edge_core::{Request, Response};
use http::StatusCode;

use crate::client::{FetchError, Network};

/// In-memory network serving canned responses by URL.
///
/// Unknown URLs answer `404 Not Found`. While offline, or for URLs marked as
/// failing, every fetch fails with [`FetchError::Network`]. URLs given a
/// latency answer only after sleeping that long.
#[derive(Debug)]
pub struct InMemoryNetwork {
    routes: Mutex<HashMap<String, Response>>,
    failing: Mutex<HashSet<String>>,
    latency: Mutex<HashMap<String, Duration>>,
    online: AtomicBool,
    log: Mutex<Vec<String>>,
}

impl Default for InMemoryNetwork {
    fn default() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            latency: Mutex::new(HashMap::new()),
            online: AtomicBool::new(true),
            log: Mutex::new(Vec::new()),
        }
    }
}

impl InMemoryNetwork {
    /// Create an online network with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route (builder form).
    pub fn with_response(self, url: &str, response: Response) -> Self {
        self.insert(url, response);
        self
    }

    /// Add or replace a route.
    pub fn insert(&self, url: &str, response: Response) {
        lock(&self.routes).insert(url.to_string(), response);
    }

    /// Make every fetch of `url` fail at the transport level.
    pub fn fail(&self, url: &str) {
        lock(&self.failing).insert(url.to_string());
    }

    /// Delay every answer for `url`.
    pub fn slow(&self, url: &str, latency: Duration) {
        lock(&self.latency).insert(url.to_string(), latency);
    }

    /// Toggle connectivity.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Whether the network is reachable.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// URLs fetched so far, in order, including failed attempts.
    pub fn requests(&self) -> Vec<String> {
        lock(&self.log).clone()
    }

    /// How many times `url` was fetched.
    pub fn request_count(&self, url: &str) -> usize {
        lock(&self.log).iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait]
impl Network for InMemoryNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let url = request.url.as_str().to_string();
        lock(&self.log).push(url.clone());

        let latency = lock(&self.latency).get(&url).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if !self.is_online() {
            return Err(FetchError::Network("offline".to_string()));
        }
        if lock(&self.failing).contains(&url) {
            return Err(FetchError::Network(format!("connection reset: {}", url)));
        }

        Ok(lock(&self.routes)
            .get(&url)
            .cloned()
            .unwrap_or_else(|| Response::new(StatusCode::NOT_FOUND, "Not Found")))
    }
}

// Poisoning is ignored: entries are independent.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_routes_and_404s() {
        let network = InMemoryNetwork::new()
            .with_response("https://app.example.com/", Response::ok("<html>"));

        let hit = network
            .fetch(&Request::get("https://app.example.com/").unwrap())
            .await
            .unwrap();
        assert_eq!(hit.body, b"<html>");

        let miss = network
            .fetch(&Request::get("https://app.example.com/nope").unwrap())
            .await
            .unwrap();
        assert_eq!(miss.status, StatusCode::NOT_FOUND);
        assert_eq!(network.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_offline_and_failing_urls() {
        let network = InMemoryNetwork::new()
            .with_response("https://app.example.com/a.js", Response::ok("a"));
        network.fail("https://app.example.com/a.js");

        let req = Request::get("https://app.example.com/a.js").unwrap();
        assert!(network.fetch(&req).await.unwrap_err().is_network_unavailable());

        network.set_online(false);
        let other = Request::get("https://app.example.com/b.js").unwrap();
        assert_eq!(
            network.fetch(&other).await.unwrap_err(),
            FetchError::Network("offline".to_string())
        );
        assert_eq!(network.request_count("https://app.example.com/a.js"), 1);
    }
}
