//! Integration tests for [`MetricSample`] and alert formatting.
//!
//! Verifies the structured (JSON) form used in logs and the end-to-end
//! sample -> evaluate -> format path.

use hostwatch_core::{exceeds, AlertEvent, CpuLoad, MetricSample, Thresholds};

// ---------------------------------------------------------------------------
// Test: MetricSample serialization
// ---------------------------------------------------------------------------

#[test]
fn sample_serialization_includes_all_fields() {
    let sample = MetricSample::new(CpuLoad::Available(0.42), 0.61, 0.73);

    let json_str = serde_json::to_string(&sample).expect("serialization should succeed");
    let parsed: serde_json::Value =
        serde_json::from_str(&json_str).expect("deserialization should succeed");

    assert_eq!(parsed["cpu_load"]["available"], 0.42);
    assert_eq!(parsed["memory_usage"], 0.61);
    assert_eq!(parsed["disk_usage"], 0.73);
    assert!(parsed["captured_at"].is_string());
}

#[test]
fn unavailable_cpu_serializes_as_marker() {
    let sample = MetricSample::new(CpuLoad::Unavailable, 0.5, 0.5);

    let parsed = serde_json::to_value(&sample).expect("serialization should succeed");

    assert_eq!(parsed["cpu_load"], "unavailable");
}

// ---------------------------------------------------------------------------
// Test: end-to-end evaluation scenarios
// ---------------------------------------------------------------------------

#[test]
fn high_cpu_scenario_alerts_with_formatted_body() {
    let sample = MetricSample::new(CpuLoad::Available(0.95), 0.50, 0.50);
    let thresholds = Thresholds::default();

    assert!(exceeds(&sample, &thresholds));

    let alert = AlertEvent::from_sample(&sample, &thresholds);
    assert_eq!(alert.subject, "Server Alert: Resource Usage Exceeded");
    assert!(alert.body.contains("95.00%"));
    assert!(alert.body.contains("Memory: 50.00%"));
    assert!(alert.body.contains("Disk: 50.00%"));
}

#[test]
fn low_usage_scenario_does_not_alert() {
    let sample = MetricSample::new(CpuLoad::Available(0.10), 0.20, 0.30);
    assert!(!exceeds(&sample, &Thresholds::default()));
}

#[test]
fn negative_load_sentinel_never_alerts() {
    // A platform without load averages reports -1.0.
    let cpu = CpuLoad::from_load_average(-1.0, 8);
    let sample = MetricSample::new(cpu, 0.10, 0.10);

    assert_eq!(sample.cpu_load, CpuLoad::Unavailable);
    assert!(!exceeds(&sample, &Thresholds::default()));
}
