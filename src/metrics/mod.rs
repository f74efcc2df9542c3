//! Per-second aggregation of request events into deterministic summaries.
mod aggregate;
mod percentile;
mod types;

pub use aggregate::aggregate_per_second;
pub use percentile::percentile;
pub use types::PerSecondMetrics;
