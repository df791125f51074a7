//! Install and activate behavior across versions.

mod common;

use std::sync::Arc;

use common::*;
use edge_cache::{CacheStatus, SnapshotBackend};
use edge_core::{Request, Response, WorkerState};
use edge_worker::{InMemoryClients, WorkerError};
use http::StatusCode;

#[tokio::test]
async fn install_snapshots_every_manifest_asset() {
    let host = host(InMemoryClients::new());
    let _registration = registered(&host, "v1").await;

    let keys = host.snapshots.keys("v1").await.unwrap();
    let mut urls: Vec<_> = keys.iter().map(|k| k.url().to_string()).collect();
    urls.sort();
    let mut expected: Vec<_> = MANIFEST.iter().map(|p| url(p)).collect();
    expected.sort();
    assert_eq!(urls, expected);
}

#[tokio::test]
async fn failed_asset_keeps_previous_version_serving() {
    let host = host(InMemoryClients::new());
    let registration = registered(&host, "v1").await;

    // v2 ships new bytes, but one asset is unreachable.
    for path in MANIFEST {
        host.network
            .insert(&url(path), Response::ok(format!("r2 {}", path)));
    }
    host.network.fail(&url("/js/app.js"));

    let err = registration.update(config("v2")).await.unwrap_err();
    assert!(matches!(
        err,
        WorkerError::InstallAssetFailure { ref path, .. } if path == "/js/app.js"
    ));

    assert_eq!(registration.active_version().await.as_deref(), Some("v1"));
    assert_eq!(host.snapshots.names().await.unwrap(), vec!["v1".to_string()]);

    host.network.set_online(false);
    let served = registration
        .fetch(Request::get(&url("/css/mobile.css")).unwrap())
        .await
        .unwrap();
    assert_eq!(served.status, CacheStatus::Hit);
    assert_eq!(served.response.text(), "r1 /css/mobile.css");
}

#[tokio::test]
async fn error_status_fails_install() {
    let host = host(InMemoryClients::new());
    host.network.insert(
        &url("/manifest.json"),
        Response::new(StatusCode::INTERNAL_SERVER_ERROR, "oops"),
    );

    let registration = edge_worker::Registration::new(host.platform());
    let err = registration.update(config("v1")).await.unwrap_err();

    assert!(err.is_install_failure());
    assert!(registration.active().await.is_none());
    assert!(host.snapshots.names().await.unwrap().is_empty());
    assert_eq!(host.platform().metrics.snapshot().install_failures, 1);
}

#[tokio::test]
async fn activation_removes_every_other_store() {
    let host = host(InMemoryClients::new());
    for stale in ["app-shell-v0", "legacy", "v1"] {
        host.snapshots.open(stale).await.unwrap();
    }

    let registration = registered(&host, "v1").await;
    let v2 = registration.update(config("v2")).await.unwrap();

    assert_eq!(host.snapshots.names().await.unwrap(), vec!["v2".to_string()]);
    assert_eq!(v2.state(), WorkerState::Activated);
    assert_eq!(host.platform().metrics.snapshot().stores_pruned, 3);
}

#[tokio::test]
async fn activation_claims_open_windows() {
    let host = host(InMemoryClients::new().with_window(&url("/"), false));
    let _registration = registered(&host, "v1").await;

    assert!(host.clients.windows().iter().all(|w| w.controlled));
}

#[tokio::test]
async fn keep_alive_settles_after_lifecycle() {
    let host = host(InMemoryClients::new());
    let _registration = registered(&host, "v1").await;

    let keep_alive = host.platform().keep_alive;
    tokio::time::timeout(std::time::Duration::from_secs(1), keep_alive.idle())
        .await
        .unwrap();
}

#[tokio::test]
async fn concurrent_fetches_during_update_see_a_whole_version() {
    let host = host(InMemoryClients::new());
    let registration = Arc::new(registered(&host, "v1").await);

    for path in MANIFEST {
        host.network
            .insert(&url(path), Response::ok(format!("r2 {}", path)));
    }

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let registration = Arc::clone(&registration);
        tasks.push(tokio::spawn(async move {
            registration
                .fetch(Request::get(&url("/js/app.js")).unwrap())
                .await
                .unwrap()
        }));
    }
    registration.update(config("v2")).await.unwrap();

    for task in tasks {
        let served = task.await.unwrap();
        let body = served.response.text();
        assert!(body == "r1 /js/app.js" || body == "r2 /js/app.js", "{}", body);
    }

    let after = registration
        .fetch(Request::get(&url("/js/app.js")).unwrap())
        .await
        .unwrap();
    assert_eq!(after.status, CacheStatus::Hit);
    assert_eq!(after.response.text(), "r2 /js/app.js");
}
