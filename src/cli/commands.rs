//! CLI command implementations

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::http::{AppConfig, AppState, HttpServer};
use crate::observability::{log_event, Event, Logger};
use crate::services::TourService;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Parse arguments and dispatch.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Serve { port, import } => serve(port, import.as_deref()),
        Command::Import { path } => import(&path),
    }
}

/// Boot the server, optionally seeding tours first.
fn serve(port: Option<u16>, seed: Option<&Path>) -> CliResult<()> {
    log_event(Event::BootStart, &[]);

    let mut config = AppConfig::from_env();
    if let Some(port) = port {
        config.server.port = port;
    }
    log_event(
        Event::ConfigLoaded,
        &[
            ("addr", &config.server.socket_addr()),
            ("base_url", &config.base_url),
        ],
    );

    let server = HttpServer::new(config);

    if let Some(path) = seed {
        let count = seed_tours(&server.state(), path)?;
        log_event(Event::ImportComplete, &[("tours", &count.to_string())]);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.start()).map_err(|e| {
        Logger::fatal(Event::BootFailed.as_str(), &[("message", &e.to_string())]);
        CliError::Server(e)
    })
}

/// Validate a seed file without serving: every document must pass the
/// same checks `serve --import` applies.
fn import(path: &Path) -> CliResult<()> {
    let state = AppState::new(AppConfig::default());
    let count = seed_tours(&state, path)?;

    log_event(Event::ImportComplete, &[("tours", &count.to_string())]);
    Ok(())
}

fn seed_tours(state: &AppState, path: &Path) -> CliResult<usize> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::SeedFileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let docs: Vec<Value> = serde_json::from_str(&raw)?;
    let count = docs.len();

    let tours = TourService::new(state.store.clone());
    for (index, doc) in docs.into_iter().enumerate() {
        tours
            .create(doc)
            .map_err(|e| CliError::SeedDocumentRejected {
                index,
                message: e.to_string(),
            })?;
    }

    Ok(count)
}
