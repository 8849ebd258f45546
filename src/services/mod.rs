//! # Application Services
//!
//! Resource-level operations over the document store: CRUD with
//! schema validation, the secret-tour list hook, and the aggregation
//! endpoints (tour stats, monthly plan, tours within radius).

pub mod errors;
pub mod reviews;
pub mod tours;

pub use errors::{ServiceError, ServiceResult};
pub use reviews::ReviewService;
pub use tours::TourService;
