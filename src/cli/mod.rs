//! CLI module for the Pix key registry
//!
//! Provides subcommands:
//! - `serve`: HTTP API server (default mode)
//! - `migrate`: create the PostgreSQL schema and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Pix key registry - registers and manages Pix payment keys
#[derive(Parser)]
#[command(name = "pix-keys")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server (default mode)
    Serve,

    /// Create the PostgreSQL schema and exit
    Migrate,
}
