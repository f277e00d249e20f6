//! Well-known host metric name constants.
//!
//! These are the canonical names used in structured log fields and in
//! [`Breach`](crate::thresholds::Breach) reports.

/// Per-core-normalized 1-minute load average.
pub const METRIC_CPU_LOAD: &str = "cpu_load";

/// Fraction of physical memory in use.
pub const METRIC_MEMORY_USAGE: &str = "memory_usage";

/// Highest utilization across all mounted filesystems.
pub const METRIC_DISK_USAGE: &str = "disk_usage";
