//! Strictly Ladders server binary.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use strictly_ladders_server::{AppState, ServerConfig, SessionRegistry, play_out, router};
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    match cli.command {
        Command::Serve { config, host, port } => run_http_server(config, host, port).await,
        Command::Simulate {
            grid,
            players,
            seed,
            max_turns,
        } => run_simulation(grid, players, seed, max_turns),
    }
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,strictly_ladders=debug,strictly_ladders_server=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[instrument]
async fn run_http_server(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = ServerConfig::load(config_path.as_deref())?;
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }

    let registry = Arc::new(SessionRegistry::new(
        *config.max_grid_size(),
        config.queue_capacity()?,
    ));
    let app = router(AppState::new(registry, *config.default_grid_size()));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(%address, "Server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[instrument]
fn run_simulation(
    grid: usize,
    players: Vec<String>,
    seed: Option<u64>,
    max_turns: usize,
) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let registry = SessionRegistry::new(grid, NonZeroUsize::MIN);
    let session = registry.create_with(grid, &mut rng)?;
    for name in &players {
        session.add_player(name)?;
    }

    let played = play_out(&session, &mut rng, max_turns)?;
    match &played.winner {
        Some(winner) => info!(%winner, turns = played.turns.len(), "Simulation finished"),
        None => warn!(turns = played.turns.len(), "Simulation hit the turn limit"),
    }

    println!("{}", serde_json::to_string_pretty(&session.state())?);
    Ok(())
}
