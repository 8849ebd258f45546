//! # Document Store
//!
//! Embedded, thread-safe document store backing the resource
//! collections. Queries built by the query pipeline are executed here:
//! filter, then sort, then skip/limit, then projection.

pub mod collection;
pub mod errors;

pub use collection::DocumentStore;
pub use errors::{StoreError, StoreResult};
