//! trailhead - a tour-booking REST API backed by an embedded document store

pub mod auth;
pub mod cli;
pub mod http;
pub mod models;
pub mod observability;
pub mod query;
pub mod services;
pub mod store;
pub mod uploads;
