//! Application layer - Use cases and orchestration.
//!
//! Services here wire the text helpers and domain ports into the contract
//! analysis pipeline: ingestion, per-chunk search aggregation, synthesis and
//! report rendering. They depend on domain ports (traits) rather than
//! concrete adapters.

pub mod retry;
pub mod services;

pub use retry::{RetryPolicy, Retrying, MAX_RETRY_DELAY};
pub use services::{
    AggregationOptions, AnalysisService, IngestService, Pacing, Ranking, SearchAggregator,
    SynthesisService, VectorSearch,
};
