//! Immutable, validated run configuration and its metadata projection.
mod metadata;
mod types;

pub use metadata::RunMetadata;
pub use types::{
    BurstyParams, CircuitBreakerConfig, DiurnalParams, DiurnalShape, LoadModel, PatternParams,
    RetryConfig, RunConfig, TargetConfig, ViralSpikeParams,
};
