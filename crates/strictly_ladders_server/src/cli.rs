//! Command-line interface for strictly_ladders.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Ladders - multiplayer snakes-and-ladders server
#[derive(Parser, Debug)]
#[command(name = "strictly_ladders")]
#[command(about = "Multiplayer snakes-and-ladders with live updates", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to (overrides config and LADDERS_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config and LADDERS_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Play a whole game in-process and print the final state as JSON
    Simulate {
        /// Board side length
        #[arg(long, default_value = "10")]
        grid: usize,

        /// Player names, in turn order
        #[arg(long, num_args = 2.., default_values = ["Arun", "Megha"])]
        players: Vec<String>,

        /// Seed for a reproducible board and dice sequence
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this many turns even without a winner
        #[arg(long, default_value = "10000")]
        max_turns: usize,
    },
}
