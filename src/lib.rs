// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregator;
pub mod api;
pub mod articles;
pub mod config;
pub mod fetch;
pub mod jobs;
pub mod metrics;
pub mod scheduler;
pub mod score;
pub mod sources;

// ---- Re-exports for stable public API ----
pub use crate::aggregator::Aggregator;
pub use crate::api::{create_router, AppState};
pub use crate::config::AggregatorConfig;
pub use crate::scheduler::spawn_scheduler;
