//! CLI argument definitions for the Entrust binary.

use clap::{Parser, Subcommand};
use url::Url;

/// Entrust delegation query tool
#[derive(Parser, Debug)]
#[command(name = "entrust")]
#[command(about = "Entrust: transitive delegation resolution for persistent identifier namespaces")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the delegation closure of one or more identities
    Closure(ClosureArgs),
    /// Check whether a delegator transitively authorizes a delegate
    Check(CheckArgs),
    /// Run the delegation query service
    Serve(ServeArgs),
}

/// Connection to the delegation lookup service
#[derive(clap::Args, Debug)]
pub struct LookupArgs {
    /// Base URL of the delegation lookup service
    #[arg(short, long, env = "ENTRUST_ENDPOINT")]
    pub endpoint: Url,

    /// Treat every identity as managing its own delegation authority
    #[arg(long, env = "ENTRUST_OWN_AUTHORITY")]
    pub own_authority: bool,

    /// Repository hint forwarded to the lookup service
    #[arg(short, long, env = "ENTRUST_REPOSITORY")]
    pub repository: Option<String>,
}

/// Arguments for the closure command
#[derive(clap::Args, Debug)]
pub struct ClosureArgs {
    #[command(flatten)]
    pub lookup: LookupArgs,

    /// Identities to expand, each treated as a delegator of itself
    #[arg(required = true)]
    pub identities: Vec<String>,

    /// Emit the closure as JSON instead of one chain per line
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the check command
#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub lookup: LookupArgs,

    /// The identity whose authorization is being checked
    pub delegate: String,

    /// The identity claimed to authorize the delegate
    pub delegator: String,

    /// Emit the verdict as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "ENTRUST_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "ENTRUST_HOST")]
    pub host: String,

    /// Base URL of the upstream delegation lookup service
    #[arg(short, long, env = "ENTRUST_UPSTREAM")]
    pub upstream: Url,

    /// Treat every identity as managing its own delegation authority
    #[arg(long, env = "ENTRUST_OWN_AUTHORITY")]
    pub own_authority: bool,

    /// Repository hint forwarded to the lookup service
    #[arg(short, long, env = "ENTRUST_REPOSITORY")]
    pub repository: Option<String>,

    /// Seconds authority resolutions stay cached
    #[arg(long, default_value_t = 300, env = "ENTRUST_AUTHORITY_TTL")]
    pub authority_ttl: u64,

    /// Seconds between background sweeps of the lookup cache
    #[arg(long, default_value_t = 60, env = "ENTRUST_SWEEP_INTERVAL")]
    pub sweep_interval: u64,
}
