//! Result aggregation

pub mod metrics;

pub use metrics::{Breakdown, EvaluationSummary, Metric};
