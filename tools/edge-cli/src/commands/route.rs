//! Routing decision preview.

use anyhow::{Context as _, Result};
use edge_cache::{RequestKey, RouteDecision, RoutePolicy};
use edge_core::{Request, RequestMode};
use edge_worker::FallbackChain;
use http::Method;
use serde::Serialize;

use super::RouteArgs;
use crate::context::Context;

#[derive(Serialize)]
struct RouteReport {
    url: String,
    key: String,
    decision: RouteDecision,
    fallbacks: Vec<String>,
}

/// Run the route command.
pub async fn run(args: RouteArgs, ctx: &Context) -> Result<()> {
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method {}", args.method))?;
    let url = ctx
        .config
        .resolve(&args.url)
        .with_context(|| format!("Invalid URL {}", args.url))?;

    let mut request = Request::new(method, url);
    if args.navigate {
        request = request.with_mode(RequestMode::Navigate);
    }

    let policy = RoutePolicy::from_config(&ctx.config.routing);
    let decision = policy.classify(&request, &ctx.config.scope.origin());
    let chain = FallbackChain::for_request(&decision, &request);

    let report = RouteReport {
        url: request.url.to_string(),
        key: RequestKey::from_request(&request).to_string(),
        fallbacks: chain.steps().iter().map(|s| s.to_string()).collect(),
        decision,
    };

    if ctx.output.is_json() {
        ctx.output.json(&report);
        return Ok(());
    }

    ctx.output.header("Route");
    ctx.output.kv("URL", &report.url);
    ctx.output.kv("Key", &report.key);
    ctx.output.kv("Mode", &request.mode.to_string());
    match &report.decision {
        RouteDecision::Bypass { reason } => {
            ctx.output.kv("Strategy", "bypass");
            ctx.output.kv("Reason", &reason.to_string());
        }
        RouteDecision::NetworkFirst => ctx.output.kv("Strategy", "network-first"),
        RouteDecision::CacheFirst => ctx.output.kv("Strategy", "cache-first"),
    }

    if report.fallbacks.is_empty() {
        ctx.output.kv("Offline fallback", "none");
    } else {
        ctx.output.kv("Offline fallback", &report.fallbacks.join(" -> "));
    }
    Ok(())
}
