//! In-memory install, activate and fetch simulation.

use anyhow::{Context as _, Result};
use edge_cache::CacheStatus;
use edge_core::{Request, RequestMode, Response};
use edge_data::InMemoryNetwork;
use edge_observability::MetricsSnapshot;
use edge_worker::{InMemoryClients, InMemoryPlatform, Registration};
use serde::Serialize;

use super::SimulateArgs;
use crate::context::Context;
use crate::output::{format_bytes, status_badge};

#[derive(Serialize)]
struct SimulatedRequest {
    url: String,
    status: Option<CacheStatus>,
    http_status: Option<u16>,
    bytes: usize,
    error: Option<String>,
}

#[derive(Serialize)]
struct SimulationReport {
    version: String,
    offline: bool,
    requests: Vec<SimulatedRequest>,
    metrics: MetricsSnapshot,
}

/// Run the simulate command.
pub async fn run(args: SimulateArgs, ctx: &Context) -> Result<()> {
    let config = ctx.config.clone();

    let network = InMemoryNetwork::new();
    for path in &config.manifest {
        let url = config
            .resolve(path)
            .with_context(|| format!("Cannot resolve manifest path {}", path))?;
        network.insert(url.as_str(), Response::ok(format!("{} {}", config.version, path)));
    }

    let host = InMemoryPlatform::new(network, InMemoryClients::new());
    let registration = Registration::new(host.platform());
    registration
        .update(config.clone())
        .await
        .context("Install failed")?;
    ctx.output.debug(&format!(
        "Installed and activated {} ({} assets)",
        config.version,
        config.manifest.len()
    ));

    if args.offline {
        host.network.set_online(false);
        ctx.output.info("Network is offline");
    }

    let mut requests = Vec::new();
    for raw in &args.urls {
        let url = config
            .resolve(raw)
            .with_context(|| format!("Invalid URL {}", raw))?;
        let mut request = Request::new(http::Method::GET, url);
        if args.navigate {
            request = request.with_mode(RequestMode::Navigate);
        }
        let url = request.url.to_string();

        let result = match registration.fetch(request).await {
            Ok(served) => SimulatedRequest {
                url,
                status: Some(served.status),
                http_status: Some(served.response.status.as_u16()),
                bytes: served.response.body.len(),
                error: None,
            },
            Err(e) => SimulatedRequest {
                url,
                status: None,
                http_status: None,
                bytes: 0,
                error: Some(e.to_string()),
            },
        };
        if !ctx.output.is_json() {
            print_row(ctx, &result);
        }
        requests.push(result);
    }

    let metrics = host.platform().metrics.snapshot();
    if ctx.output.is_json() {
        ctx.output.json(&SimulationReport {
            version: config.version,
            offline: args.offline,
            requests,
            metrics,
        });
        return Ok(());
    }

    for line in metrics.to_summary().lines() {
        ctx.output.debug(line);
    }
    println!();
    ctx.output.success(&format!(
        "{} of {} requests answered ({} from the snapshot store)",
        requests.iter().filter(|r| r.error.is_none()).count(),
        requests.len(),
        metrics.served_from_snapshot()
    ));
    Ok(())
}

fn print_row(ctx: &Context, result: &SimulatedRequest) {
    const WIDTHS: [usize; 4] = [48, 10, 5, 10];

    match (result.status, &result.error) {
        (Some(status), _) => {
            let http_status = result.http_status.map(|s| s.to_string()).unwrap_or_default();
            ctx.output.table_row(
                &[
                    &result.url,
                    &status_badge(status),
                    &http_status,
                    &format_bytes(result.bytes),
                ],
                &WIDTHS,
            );
        }
        (None, Some(error)) => {
            ctx.output
                .table_row(&[&result.url, "FAILED", "-", error], &WIDTHS);
        }
        (None, None) => {}
    }
}
