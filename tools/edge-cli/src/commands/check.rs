//! Configuration validation.

use anyhow::{Context as _, Result};

use super::CheckArgs;
use crate::context::Context;

/// Run the check command.
pub async fn run(args: CheckArgs, ctx: &Context) -> Result<()> {
    let config = &ctx.config;
    config.validate().context("Configuration is invalid")?;

    if ctx.output.is_json() {
        ctx.output.json(config);
        return Ok(());
    }

    ctx.output.header("Worker configuration");
    ctx.output.kv("Source", &ctx.config_source());
    ctx.output.kv("Version", &config.version);
    ctx.output.kv("Scope", config.scope.as_str());
    ctx.output.kv("Fallback document", &config.fallback_document);
    ctx.output
        .kv("Network timeout", &format!("{}ms", config.network.timeout_ms));
    ctx.output
        .kv("Explain headers", if config.explain_headers { "on" } else { "off" });

    ctx.output.header(&format!("Manifest ({} assets)", config.manifest.len()));
    for path in &config.manifest {
        if args.resolve {
            let url = config
                .resolve(path)
                .with_context(|| format!("Cannot resolve manifest path {}", path))?;
            ctx.output.list_item(url.as_str());
        } else {
            ctx.output.list_item(path);
        }
    }

    ctx.output.header("Bypass rules");
    for segment in &config.routing.api_segments {
        ctx.output.list_item(&format!("path segment /{}/", segment));
    }
    for host in &config.routing.backend_hosts {
        ctx.output.list_item(&format!("host {}", host));
    }

    println!();
    ctx.output.success("Configuration is valid");
    Ok(())
}
