//! CLI command implementations.

pub mod check;
pub mod push;
pub mod route;
pub mod simulate;

use clap::Args;

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Print manifest entries as absolute URLs.
    #[arg(long)]
    pub resolve: bool,
}

/// Arguments for the route command.
#[derive(Args)]
pub struct RouteArgs {
    /// Request URL, absolute or relative to the scope.
    pub url: String,

    /// Treat the request as a top-level navigation.
    #[arg(long)]
    pub navigate: bool,

    /// HTTP method.
    #[arg(short, long, default_value = "GET")]
    pub method: String,
}

/// Arguments for the push command.
#[derive(Args)]
pub struct PushArgs {
    /// Raw push payload (JSON object or plain text). Omit for an empty push.
    pub payload: Option<String>,
}

/// Arguments for the simulate command.
#[derive(Args)]
pub struct SimulateArgs {
    /// URLs to request after activation, absolute or relative to the scope.
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Take the network offline after install.
    #[arg(long)]
    pub offline: bool,

    /// Send the requests as navigations.
    #[arg(long)]
    pub navigate: bool,
}
