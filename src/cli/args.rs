//! CLI argument definitions using clap
//!
//! Commands:
//! - trailhead serve [--port <port>] [--import <path>]
//! - trailhead import <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trailhead - a tour-booking REST API
#[derive(Parser, Debug)]
#[command(name = "trailhead")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the API server
    Serve {
        /// Port to bind, overriding PORT from the environment
        #[arg(long)]
        port: Option<u16>,

        /// Seed the store from a JSON tour file before serving
        #[arg(long)]
        import: Option<PathBuf>,
    },

    /// Validate a JSON tour file without starting the server
    Import {
        /// Path to a JSON array of tour documents
        path: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
