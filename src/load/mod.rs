//! Load testing module
//!
//! Concurrent event submission with latency, throughput and error-rate
//! measurement against configurable targets.

mod metrics;
mod runner;
mod targets;

pub use metrics::LoadMetrics;
pub use runner::LoadDriver;
pub use targets::LoadTargets;
