//! Entrust CLI entry point.

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("entrust=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let outcome = match &cli.command {
        Commands::Closure(args) => commands::closure::run(args).await,
        Commands::Check(args) => match commands::check::run(args).await {
            Ok(true) => Ok(()),
            Ok(false) => std::process::exit(1),
            Err(err) => Err(err),
        },
        Commands::Serve(args) => commands::serve::run(args).await,
    };

    if let Err(err) = outcome {
        tracing::error!("{err}");
        std::process::exit(2);
    }
}
