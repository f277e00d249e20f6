//! Integration tests for the host metric collector.
//!
//! These run against whatever machine executes the test suite, so they only
//! assert invariants that hold on every host.

use hostwatch_agent::collector::{disk_usage_from, HostCollector, MetricSource, VolumeSpace};
use hostwatch_core::CpuLoad;

// ---------------------------------------------------------------------------
// Test: sampling the real host never panics and yields fractions
// ---------------------------------------------------------------------------

/// On CI and developer machines alike, `sample()` either succeeds with
/// sensible values or reports a collection error. It must never panic.
#[test]
fn host_sample_is_well_formed() {
    let collector = HostCollector::new();

    if let Ok(sample) = collector.sample() {
        assert!((0.0..=1.0).contains(&sample.memory_usage));
        assert!((0.0..=1.0).contains(&sample.disk_usage));
        if let CpuLoad::Available(load) = sample.cpu_load {
            assert!(load >= 0.0 && load.is_finite());
        }
    }
}

#[cfg(target_os = "linux")]
#[test]
fn linux_reports_a_load_average() {
    let load = HostCollector::new().cpu_load().expect("cpu load readable");
    assert!(load.is_available(), "Linux always exposes /proc/loadavg");
}

#[test]
fn every_volume_listed_is_a_fraction() {
    if let Ok(volumes) = HostCollector::new().volumes() {
        for volume in &volumes {
            let usage = volume.usage();
            assert!(
                (0.0..=1.0).contains(&usage),
                "{} reported {usage}",
                volume.mount_point.display()
            );
        }
        assert!((0.0..=1.0).contains(&disk_usage_from(&volumes)));
    }
}

// ---------------------------------------------------------------------------
// Test: disk reduction edge cases
// ---------------------------------------------------------------------------

#[test]
fn single_full_volume_reports_one() {
    let volumes = [VolumeSpace {
        mount_point: "/data".into(),
        total_bytes: 1024,
        unallocated_bytes: 0,
    }];
    assert_eq!(disk_usage_from(&volumes), 1.0);
}
