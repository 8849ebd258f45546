//! CLI module
//!
//! Provides the command-line interface:
//! - serve: boot the API server, optionally seeding tour data
//! - import: validate a seed file and exit

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{run, run_command};
pub use errors::{CliError, CliResult};
