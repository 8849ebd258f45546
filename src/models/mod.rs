//! # Resource Models
//!
//! Validation and defaulting for the tour and review collections.
//! Documents stay JSON-native; each model validates a loose document
//! the way a schema layer would and stamps derived fields before the
//! store persists it.

pub mod errors;
pub mod review;
pub mod tour;

pub use errors::{ValidationError, ValidationResult};
