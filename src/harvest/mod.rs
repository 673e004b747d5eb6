//! Harvest module - orchestration of a full collection run.
//!
//! This module ties the pieces of a run together:
//! - **Aggregation**: flattening per-source outcomes, business filtering and
//!   deduplication via [`filter::aggregate`]
//! - **Coordination**: the end-to-end run via [`pipeline::HarvestPipeline`]

pub mod filter;
pub mod pipeline;

// Re-export commonly used types
pub use filter::{aggregate, AggregateSummary};
pub use pipeline::{HarvestPipeline, HarvestReport, HarvestStats, RunState};
