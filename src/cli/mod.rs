//! CLI for the User Directory API
//!
//! Subcommands:
//! - `serve`: run the HTTP server
//! - `seed`: insert test users through the regular validation path

pub mod seed;
pub mod serve;

use clap::{Parser, Subcommand};

/// User Directory API - minimal user record service
#[derive(Parser)]
#[command(name = "user-directory")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Insert test users into the configured database
    Seed(seed::SeedArgs),
}
