//! Invoice factoring pipeline: buyer risk judgment, merchant credit scoring, and
//! deterministic offer pricing, sequenced by a gated workflow orchestrator.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
