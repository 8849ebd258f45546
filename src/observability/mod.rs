//! # Observability
//!
//! Structured logging for the HTTP server: JSON lines with
//! deterministic key ordering, written synchronously, one event per
//! line. Logging is read-only and never affects request handling.

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event with fields.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
