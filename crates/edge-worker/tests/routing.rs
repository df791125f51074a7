//! Per-request routing between the snapshot store and the network.

mod common;

use std::time::Duration;

use common::*;
use edge_cache::{CacheStatus, SnapshotBackend};
use edge_core::{Request, Response};
use edge_data::FetchError;
use edge_worker::{InMemoryClients, Registration, WorkerError};
use http::{Method, StatusCode};

const CDN_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/chart.js";

async fn stored_urls(host: &edge_worker::InMemoryPlatform, version: &str) -> Vec<String> {
    host.snapshots
        .keys(version)
        .await
        .unwrap()
        .iter()
        .map(|k| k.url().to_string())
        .collect()
}

#[tokio::test]
async fn api_requests_always_hit_the_network() {
    let host = host(InMemoryClients::new());
    let registration = registered(&host, "v1").await;

    let online = registration
        .fetch(Request::get(&url("/api/sleep")).unwrap())
        .await
        .unwrap();
    assert_eq!(online.status, CacheStatus::Bypass);
    assert_eq!(online.response.text(), r#"{"hours":7.5}"#);
    assert!(!stored_urls(&host, "v1").await.contains(&url("/api/sleep")));

    // Even a planted snapshot entry is never served for API paths.
    host.snapshots
        .put(
            "v1",
            edge_cache::RequestKey::get(&url::Url::parse(&url("/api/sleep")).unwrap()),
            Response::ok("stale"),
        )
        .await
        .unwrap();
    host.network.set_online(false);

    let err = registration
        .fetch(Request::navigate(&url("/api/sleep")).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::Unresolved(FetchError::Network(_))));
}

#[tokio::test]
async fn slow_api_requests_are_not_cut_off() {
    let host = host(InMemoryClients::new());
    host.network
        .slow(&url("/api/sleep"), Duration::from_millis(300));
    host.network.slow(CDN_SCRIPT, Duration::from_millis(300));
    host.network.insert(CDN_SCRIPT, Response::ok("chart"));

    let mut config = config("v1");
    config.network.timeout_ms = 50;
    let registration = Registration::new(host.platform());
    registration.update(config).await.unwrap();

    let api = registration
        .fetch(Request::get(&url("/api/sleep")).unwrap())
        .await
        .unwrap();
    assert_eq!(api.status, CacheStatus::Bypass);
    assert_eq!(api.response.text(), r#"{"hours":7.5}"#);

    // Intercepted traffic still gives up once the network is too slow.
    let err = registration
        .fetch(Request::get(CDN_SCRIPT).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::Unresolved(FetchError::Timeout(_))));
}

#[tokio::test]
async fn slow_requests_pass_through_before_registration() {
    let host = host(InMemoryClients::new());
    host.network
        .slow(&url("/api/sleep"), Duration::from_millis(100));
    let registration = Registration::new(host.platform());

    let served = registration
        .fetch(Request::get(&url("/api/sleep")).unwrap())
        .await
        .unwrap();
    assert_eq!(served.status, CacheStatus::Bypass);
    assert_eq!(served.response.text(), r#"{"hours":7.5}"#);
}

#[tokio::test]
async fn backend_hosts_are_bypassed() {
    let host = host(InMemoryClients::new());
    let registration = registered(&host, "v1").await;
    host.network
        .insert("https://abc.supabase.co/rest/v1/nights", Response::ok("[]"));

    let served = registration
        .fetch(Request::get("https://abc.supabase.co/rest/v1/nights").unwrap())
        .await
        .unwrap();
    assert_eq!(served.status, CacheStatus::Bypass);
    assert!(!stored_urls(&host, "v1")
        .await
        .iter()
        .any(|u| u.contains("supabase")));
}

#[tokio::test]
async fn snapshotted_asset_is_served_offline_unchanged() {
    let host = host(InMemoryClients::new());
    let registration = registered(&host, "v1").await;
    host.network.set_online(false);
    let before = host.network.requests().len();

    let served = registration
        .fetch(Request::get(&url("/css/mobile.css")).unwrap())
        .await
        .unwrap();

    assert_eq!(served.status, CacheStatus::Hit);
    assert_eq!(served.response.body, b"r1 /css/mobile.css");
    assert_eq!(host.network.requests().len(), before);
}

#[tokio::test]
async fn cache_hit_does_not_touch_the_network() {
    let host = host(InMemoryClients::new());
    let registration = registered(&host, "v1").await;
    let before = host.network.request_count(&url("/js/app.js"));

    registration
        .fetch(Request::get(&url("/js/app.js")).unwrap())
        .await
        .unwrap();
    assert_eq!(host.network.request_count(&url("/js/app.js")), before);
}

#[tokio::test]
async fn same_origin_miss_is_written_back() {
    let host = host(InMemoryClients::new());
    let registration = registered(&host, "v1").await;
    host.network
        .insert(&url("/img/moon.svg"), Response::ok("<svg/>"));

    let first = registration
        .fetch(Request::get(&url("/img/moon.svg")).unwrap())
        .await
        .unwrap();
    assert_eq!(first.status, CacheStatus::Miss);

    host.network.set_online(false);
    let second = registration
        .fetch(Request::get(&url("/img/moon.svg")).unwrap())
        .await
        .unwrap();
    assert_eq!(second.status, CacheStatus::Hit);
    assert_eq!(second.response.body, b"<svg/>");
    assert_eq!(host.platform().metrics.snapshot().write_backs, 1);
}

#[tokio::test]
async fn error_responses_are_not_written_back() {
    let host = host(InMemoryClients::new());
    let registration = registered(&host, "v1").await;

    let served = registration
        .fetch(Request::get(&url("/missing.png")).unwrap())
        .await
        .unwrap();
    assert_eq!(served.response.status, StatusCode::NOT_FOUND);
    assert!(!stored_urls(&host, "v1").await.contains(&url("/missing.png")));
}

#[tokio::test]
async fn third_party_responses_are_never_stored() {
    let host = host(InMemoryClients::new());
    let registration = registered(&host, "v1").await;
    host.network.insert(CDN_SCRIPT, Response::ok("chart"));

    let online = registration
        .fetch(Request::get(CDN_SCRIPT).unwrap())
        .await
        .unwrap();
    assert_eq!(online.status, CacheStatus::Network);
    assert_eq!(online.response.text(), "chart");
    assert!(!stored_urls(&host, "v1").await.contains(&CDN_SCRIPT.to_string()));

    host.network.set_online(false);
    let err = registration
        .fetch(Request::get(CDN_SCRIPT).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::Unresolved(_)));
}

#[tokio::test]
async fn third_party_falls_back_to_an_existing_entry() {
    let host = host(InMemoryClients::new());
    let registration = registered(&host, "v1").await;
    host.snapshots
        .put(
            "v1",
            edge_cache::RequestKey::get(&url::Url::parse(CDN_SCRIPT).unwrap()),
            Response::ok("bundled chart"),
        )
        .await
        .unwrap();
    host.network.set_online(false);

    let served = registration
        .fetch(Request::get(CDN_SCRIPT).unwrap())
        .await
        .unwrap();
    assert_eq!(served.status, CacheStatus::Fallback);
    assert_eq!(served.response.text(), "bundled chart");
}

#[tokio::test]
async fn offline_navigation_gets_the_root_document() {
    let host = host(InMemoryClients::new());
    let registration = registered(&host, "v1").await;
    host.network.set_online(false);

    let served = registration
        .fetch(Request::navigate(&url("/stats/weekly")).unwrap())
        .await
        .unwrap();
    assert_eq!(served.status, CacheStatus::Shell);
    assert_eq!(served.response.text(), "r1 /");
}

#[tokio::test]
async fn offline_subresource_without_entry_fails() {
    let host = host(InMemoryClients::new());
    let registration = registered(&host, "v1").await;
    host.network.set_online(false);

    let err = registration
        .fetch(Request::get(&url("/img/unknown.png")).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::Unresolved(FetchError::Network(_))));
    assert_eq!(host.platform().metrics.snapshot().failures, 1);
}

#[tokio::test]
async fn non_get_requests_pass_through() {
    let host = host(InMemoryClients::new());
    let registration = registered(&host, "v1").await;

    let post = Request::get(&url("/css/mobile.css"))
        .unwrap()
        .with_method(Method::POST);
    let before = host.network.request_count(&url("/css/mobile.css"));
    let served = registration.fetch(post).await.unwrap();

    assert_eq!(served.status, CacheStatus::Bypass);
    assert_eq!(host.network.request_count(&url("/css/mobile.css")), before + 1);
}

#[tokio::test]
async fn explain_headers_from_config() {
    let host = host(InMemoryClients::new());
    let registration = edge_worker::Registration::new(host.platform());
    registration
        .update(config("v1").with_explain_headers(true))
        .await
        .unwrap();
    host.network.set_online(false);

    let served = registration
        .fetch(Request::navigate(&url("/settings")).unwrap())
        .await
        .unwrap();
    let headers = &served.response.headers;
    assert_eq!(headers.get("x-cache-status").unwrap(), "SHELL");
    assert_eq!(headers.get("x-cache-version").unwrap(), "v1");
    assert_eq!(headers.get("x-cache-strategy").unwrap(), "cache-first");
}
