//! Audit engine module.
//!
//! Provides finding collection, category routing, aggregation, entity pacing
//! and module orchestration.

pub mod aggregator;
pub mod collector;
pub mod orchestrator;
pub mod pacing;
pub mod router;
