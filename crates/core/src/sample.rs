//! Per-cycle host metric snapshot.
//!
//! A [`MetricSample`] is created fresh on every monitoring cycle and
//! discarded once the cycle has evaluated (and possibly alerted on) it.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Per-core-normalized CPU load.
///
/// Some platforms cannot report a load average at all. That is modelled as
/// a separate state rather than a negative ratio so that it can never be
/// mistaken for a real reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuLoad {
    /// `load_average / logical_processors`; may exceed 1.0 on an overloaded host.
    Available(f64),
    /// The platform did not report a usable load average.
    Unavailable,
}

impl CpuLoad {
    /// Normalize a raw 1-minute load average by the logical processor count.
    ///
    /// Negative or non-finite load averages are the platform's way of saying
    /// "not supported" and map to [`CpuLoad::Unavailable`], as does a zero
    /// processor count.
    pub fn from_load_average(load_average: f64, processors: usize) -> Self {
        if !load_average.is_finite() || load_average < 0.0 || processors == 0 {
            return CpuLoad::Unavailable;
        }
        CpuLoad::Available(load_average / processors as f64)
    }

    /// The normalized load, or `None` if unavailable.
    pub fn value(&self) -> Option<f64> {
        match self {
            CpuLoad::Available(v) => Some(*v),
            CpuLoad::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, CpuLoad::Available(_))
    }

    /// Two-decimal percentage, or `n/a`.
    pub fn percent_label(&self) -> String {
        match self {
            CpuLoad::Available(v) => format!("{:.2}%", v * 100.0),
            CpuLoad::Unavailable => "n/a".to_string(),
        }
    }
}

/// One cycle's worth of host measurements.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSample {
    pub cpu_load: CpuLoad,
    /// Fraction of memory in use, `[0, 1]`.
    pub memory_usage: f64,
    /// Highest utilization across all visible filesystems, `[0, 1]`.
    pub disk_usage: f64,
    pub captured_at: DateTime<Utc>,
}

impl MetricSample {
    /// Build a sample stamped with the current time.
    pub fn new(cpu_load: CpuLoad, memory_usage: f64, disk_usage: f64) -> Self {
        Self {
            cpu_load,
            memory_usage,
            disk_usage,
            captured_at: Utc::now(),
        }
    }

    /// The per-cycle status line written to stdout, e.g.
    /// `CPU: 42.00%, Memory: 61.25%, Disk: 73.10%`.
    pub fn summary_line(&self) -> String {
        format!(
            "CPU: {}, Memory: {:.2}%, Disk: {:.2}%",
            self.cpu_load.percent_label(),
            self.memory_usage * 100.0,
            self.disk_usage * 100.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_average_is_divided_by_processor_count() {
        assert_eq!(CpuLoad::from_load_average(2.0, 4), CpuLoad::Available(0.5));
        assert_eq!(CpuLoad::from_load_average(0.0, 8), CpuLoad::Available(0.0));
    }

    #[test]
    fn overloaded_host_can_exceed_one() {
        assert_eq!(CpuLoad::from_load_average(6.0, 4), CpuLoad::Available(1.5));
    }

    #[test]
    fn negative_sentinel_is_unavailable() {
        assert_eq!(CpuLoad::from_load_average(-1.0, 4), CpuLoad::Unavailable);
    }

    #[test]
    fn nan_or_zero_processors_is_unavailable() {
        assert_eq!(CpuLoad::from_load_average(f64::NAN, 4), CpuLoad::Unavailable);
        assert_eq!(CpuLoad::from_load_average(1.0, 0), CpuLoad::Unavailable);
    }

    #[test]
    fn summary_line_uses_two_decimal_percentages() {
        let sample = MetricSample::new(CpuLoad::Available(0.95), 0.5, 0.123456);
        assert_eq!(
            sample.summary_line(),
            "CPU: 95.00%, Memory: 50.00%, Disk: 12.35%"
        );
    }

    #[test]
    fn summary_line_marks_unavailable_cpu() {
        let sample = MetricSample::new(CpuLoad::Unavailable, 0.25, 0.0);
        assert_eq!(sample.summary_line(), "CPU: n/a, Memory: 25.00%, Disk: 0.00%");
    }
}
