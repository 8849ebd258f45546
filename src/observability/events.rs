//! Lifecycle events
//!
//! Named events for the server lifecycle and the flows worth tracing
//! in production: request completion, auth outcomes, email delivery,
//! data import.

/// A named lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Process started, configuration being loaded
    BootStart,
    /// Configuration resolved from the environment
    ConfigLoaded,
    /// Listener bound, accepting requests
    ServerReady,
    /// A request finished (any status)
    RequestComplete,
    /// Request hit no registered route
    RouteNotFound,
    /// A user logged in or signed up
    AuthSuccess,
    /// Authentication or authorization rejected a request
    AuthRejected,
    /// Password reset email handed to the mail transport
    ResetEmailSent,
    /// Mail transport failed to deliver
    ResetEmailFailed,
    /// Seed data import finished
    ImportComplete,
    /// Server shutting down
    Shutdown,
    /// Unrecoverable startup failure
    BootFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_START",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ServerReady => "SERVER_READY",
            Event::RequestComplete => "REQUEST_COMPLETE",
            Event::RouteNotFound => "ROUTE_NOT_FOUND",
            Event::AuthSuccess => "AUTH_SUCCESS",
            Event::AuthRejected => "AUTH_REJECTED",
            Event::ResetEmailSent => "RESET_EMAIL_SENT",
            Event::ResetEmailFailed => "RESET_EMAIL_FAILED",
            Event::ImportComplete => "IMPORT_COMPLETE",
            Event::Shutdown => "SHUTDOWN",
            Event::BootFailed => "BOOT_FAILED",
        }
    }

    /// Fatal events terminate the process after logging.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::BootFailed)
    }
}
