//! # Query Pipeline
//!
//! Translates URL query-string parameters into composed, unexecuted
//! document queries. Four stages applied in a fixed order: filter,
//! sort, field projection, pagination. Each stage is pure and may be
//! skipped when its parameter is absent, falling back to a documented
//! default.

pub mod filter;
pub mod pipeline;
pub mod spec;

pub use filter::{FilterCondition, FilterOperator};
pub use pipeline::{QueryPipeline, DEFAULT_LIMIT, RESERVED_KEYS};
pub use spec::{Projection, Query, QuerySpec, SortKey};
