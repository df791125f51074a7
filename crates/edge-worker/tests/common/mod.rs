//! Shared fixtures for the worker integration tests.

#![allow(dead_code)]

use edge_core::{Response, WorkerConfig};
use edge_data::InMemoryNetwork;
use edge_worker::{InMemoryClients, InMemoryPlatform, Registration};
use url::Url;

pub const ORIGIN: &str = "https://sleep.example.com";

pub const MANIFEST: &[&str] = &[
    "/",
    "/index.html",
    "/css/mobile.css",
    "/js/app.js",
    "/manifest.json",
];

pub fn url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}

pub fn config(version: &str) -> WorkerConfig {
    let mut config = WorkerConfig::new(version, Url::parse(&url("/")).unwrap())
        .with_manifest(MANIFEST);
    config.routing.backend_hosts = vec!["*.supabase.co".to_string()];
    config
}

/// A network serving every manifest asset, with bodies tagged by `release`.
pub fn network(release: &str) -> InMemoryNetwork {
    let network = InMemoryNetwork::new();
    for path in MANIFEST {
        network.insert(&url(path), Response::ok(format!("{} {}", release, path)));
    }
    network.insert(&url("/api/sleep"), Response::ok(r#"{"hours":7.5}"#));
    network
}

pub fn host(clients: InMemoryClients) -> InMemoryPlatform {
    InMemoryPlatform::new(network("r1"), clients)
}

/// A registration with `version` installed and active.
pub async fn registered(host: &InMemoryPlatform, version: &str) -> Registration {
    let registration = Registration::new(host.platform());
    registration.update(config(version)).await.unwrap();
    registration
}
