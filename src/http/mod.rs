//! # HTTP API
//!
//! REST endpoints under `/api/v1`:
//!
//! - `/api/v1/tours` - Tour CRUD, aliases, aggregations, nested reviews
//! - `/api/v1/reviews` - Review CRUD
//! - `/api/v1/users` - Signup, login, password reset, profile, admin CRUD

pub mod config;
pub mod error;
pub mod extract;
pub mod response;
pub mod review_routes;
pub mod server;
pub mod tour_routes;
pub mod user_routes;

pub use config::{AppConfig, ServerConfig};
pub use error::ApiError;
pub use server::{AppState, HttpServer};
