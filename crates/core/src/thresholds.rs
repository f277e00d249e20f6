//! Threshold evaluation engine for host metrics.
//!
//! Pure logic, no I/O. The caller collects a [`MetricSample`] and passes it
//! in together with the [`Thresholds`] to compare against.
//!
//! Every evaluation is independent: there is no cooldown or hysteresis, so
//! a host that stays over a threshold alerts on every cycle.

use serde::Serialize;

use crate::metric_names::{METRIC_CPU_LOAD, METRIC_DISK_USAGE, METRIC_MEMORY_USAGE};
use crate::sample::MetricSample;

/// Alert limits, each a fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
}

impl Thresholds {
    /// 80% CPU, 80% memory, 90% disk.
    pub const DEFAULT: Thresholds = Thresholds {
        cpu: 0.80,
        memory: 0.80,
        disk: 0.90,
    };
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A single metric that exceeded its threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breach {
    /// Canonical metric name (see [`crate::metric_names`]).
    pub metric_name: &'static str,
    pub value: f64,
    pub threshold: f64,
}

/// Returns `true` if any metric strictly exceeds its threshold.
///
/// A value exactly at the threshold does not count. An unavailable CPU load
/// never counts.
pub fn exceeds(sample: &MetricSample, thresholds: &Thresholds) -> bool {
    !breaches(sample, thresholds).is_empty()
}

/// List every metric in `sample` that strictly exceeds its threshold.
pub fn breaches(sample: &MetricSample, thresholds: &Thresholds) -> Vec<Breach> {
    let mut found = Vec::new();

    if let Some(cpu) = sample.cpu_load.value() {
        check_threshold(METRIC_CPU_LOAD, cpu, thresholds.cpu, &mut found);
    }
    check_threshold(
        METRIC_MEMORY_USAGE,
        sample.memory_usage,
        thresholds.memory,
        &mut found,
    );
    check_threshold(
        METRIC_DISK_USAGE,
        sample.disk_usage,
        thresholds.disk,
        &mut found,
    );

    found
}

fn check_threshold(
    metric_name: &'static str,
    value: f64,
    threshold: f64,
    found: &mut Vec<Breach>,
) {
    if value > threshold {
        found.push(Breach {
            metric_name,
            value,
            threshold,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
