//! `hostwatch-core` -- pure domain logic for the host resource monitor.
//!
//! No I/O lives here: samples, thresholds, the evaluator and alert
//! formatting can all be tested in isolation.

pub mod alert;
pub mod metric_names;
pub mod sample;
pub mod thresholds;

pub use alert::{AlertEvent, ALERT_SUBJECT};
pub use sample::{CpuLoad, MetricSample};
pub use thresholds::{breaches, exceeds, Breach, Thresholds};
