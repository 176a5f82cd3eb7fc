//! Memograph CLI and REST API entry point.
//!
//! Binary name: `mgraph`
//!
//! Parses CLI arguments, initializes the database and services, then
//! dispatches to the appropriate command handler or starts the REST API
//! server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "mgraph", &mut std::io::stdout());
        return Ok(());
    }

    // The server installs the observe stack; one-shot commands use a plain
    // fmt subscriber driven by the verbosity flags.
    if let Commands::Serve { otel, .. } = &cli.command {
        memograph_observe::tracing_setup::init_tracing(*otel)
            .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
    } else {
        let filter = match cli.verbose {
            0 if cli.quiet => "error",
            0 => "warn",
            1 => "info,memograph=debug",
            _ => "trace",
        };
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_target(false)
            .init();
    }

    // Initialize application state (DB, services)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { bind, .. } => {
            cli::serve::serve(state, &bind).await?;
        }

        Commands::Add { content, metadata } => {
            cli::memory::add(&state, &content, metadata.as_deref(), cli.json).await?;
        }

        Commands::Show { id } => {
            cli::memory::show(&state, &id, cli.json).await?;
        }

        Commands::Search {
            query,
            limit,
            threshold,
        } => {
            cli::memory::search(&state, &query, limit, threshold, cli.json).await?;
        }

        Commands::Delete { id, force } => {
            cli::memory::delete(&state, &id, force, cli.json).await?;
        }

        Commands::Link {
            from,
            to,
            relationship_type,
            strength,
            metadata,
        } => {
            cli::relationship::link(
                &state,
                from,
                to,
                &relationship_type,
                strength,
                metadata.as_deref(),
                cli.json,
            )
            .await?;
        }

        Commands::Connected { id, max_depth } => {
            cli::relationship::connected(&state, &id, max_depth, cli.json).await?;
        }

        Commands::Completions { .. } => {}
    }

    memograph_observe::tracing_setup::shutdown_tracing();
    Ok(())
}
