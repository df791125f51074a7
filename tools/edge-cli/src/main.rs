//! Edge CLI - Command line tool for the offline edge cache.
//!
//! Commands:
//! - `edge check` - Validate the worker configuration
//! - `edge route` - Show how a request would be routed
//! - `edge push` - Preview the notification a push payload produces
//! - `edge simulate` - Install, activate and serve requests against an in-memory host

mod commands;
mod context;
mod output;

use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{CheckArgs, PushArgs, RouteArgs, SimulateArgs};

/// Edge CLI - Inspect and simulate the offline edge cache
#[derive(Parser)]
#[command(name = "edge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the worker configuration
    Check(CheckArgs),

    /// Show the routing decision for a request
    Route(RouteArgs),

    /// Preview the notification for a push payload
    Push(PushArgs),

    /// Serve requests through an in-memory worker
    Simulate(SimulateArgs),
}

/// Log to stderr, filtered by `RUST_LOG`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "edge=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = context::Context::load(cli.config.as_deref(), output)?;

    let result = match cli.command {
        Commands::Check(args) => commands::check::run(args, &ctx).await,
        Commands::Route(args) => commands::route::run(args, &ctx).await,
        Commands::Push(args) => commands::push::run(args, &ctx).await,
        Commands::Simulate(args) => commands::simulate::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
