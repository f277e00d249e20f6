//! Host metric collection.
//!
//! [`MetricSource`] is the seam between the monitor cycle and the platform:
//! [`HostCollector`] reads the real host through `sysinfo`, tests plug in
//! fakes. The three readers are independent so a failure in one is
//! reported on its own.
//!
//! All readers are blocking calls; the cycle runs them on a blocking
//! thread.

use std::path::PathBuf;

use hostwatch_core::{CpuLoad, MetricSample};
use sysinfo::{Disks, MemoryRefreshKind, RefreshKind, System};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for metric collection failures.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The platform does not expose the metric at all.
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    /// An I/O failure while reading system state (e.g. the mount table).
    #[error("I/O error while collecting metrics: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// MetricSource
// ---------------------------------------------------------------------------

/// Something that can measure the three host metrics.
pub trait MetricSource: Send + Sync {
    /// Per-core-normalized 1-minute load average.
    fn cpu_load(&self) -> Result<CpuLoad, CollectError>;

    /// Fraction of memory in use, `[0, 1]`.
    fn memory_usage(&self) -> Result<f64, CollectError>;

    /// Highest utilization across every visible filesystem, `[0, 1]`.
    fn disk_usage(&self) -> Result<f64, CollectError>;

    /// Read all three metrics in order, stopping at the first failure.
    fn sample(&self) -> Result<MetricSample, CollectError> {
        let cpu_load = self.cpu_load()?;
        let memory_usage = self.memory_usage()?;
        let disk_usage = self.disk_usage()?;
        Ok(MetricSample::new(cpu_load, memory_usage, disk_usage))
    }
}

impl<T: MetricSource + ?Sized> MetricSource for std::sync::Arc<T> {
    fn cpu_load(&self) -> Result<CpuLoad, CollectError> {
        (**self).cpu_load()
    }

    fn memory_usage(&self) -> Result<f64, CollectError> {
        (**self).memory_usage()
    }

    fn disk_usage(&self) -> Result<f64, CollectError> {
        (**self).disk_usage()
    }
}

// ---------------------------------------------------------------------------
// Disk usage reduction
// ---------------------------------------------------------------------------

/// Space figures for one mounted filesystem.
#[derive(Debug, Clone)]
pub struct VolumeSpace {
    pub mount_point: PathBuf,
    pub total_bytes: u64,
    pub unallocated_bytes: u64,
}

impl VolumeSpace {
    /// `(total - unallocated) / total`, or 0.0 for a zero-sized volume.
    pub fn usage(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        let used = self.total_bytes.saturating_sub(self.unallocated_bytes);
        used as f64 / self.total_bytes as f64
    }
}

/// Highest usage across `volumes`, or 0.0 if there are none.
pub fn disk_usage_from(volumes: &[VolumeSpace]) -> f64 {
    volumes.iter().map(VolumeSpace::usage).fold(0.0, f64::max)
}

// ---------------------------------------------------------------------------
// HostCollector
// ---------------------------------------------------------------------------

/// Reads the metrics of the machine the agent runs on.
///
/// Holds no state between calls: every read queries the OS afresh.
///
/// Memory is measured system-wide (`1 - available / total`), not for this
/// process alone.
///
/// This collector never returns [`CollectError::Io`]. `sysinfo` skips mounts
/// it cannot stat and yields an empty list when the mount table itself is
/// unreadable, so an enumeration failure on a real host shows up as a disk
/// usage of `0.0` rather than an aborted cycle. Only an unsupported platform
/// makes the disk read fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostCollector;

impl HostCollector {
    pub fn new() -> Self {
        Self
    }

    /// Logical processors visible to this process.
    fn processor_count() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(0)
    }

    /// Enumerate every mounted filesystem sysinfo can see.
    ///
    /// Unreadable mounts are silently left out of the list.
    pub fn volumes(&self) -> Result<Vec<VolumeSpace>, CollectError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(CollectError::Unsupported("disk enumeration"));
        }

        let disks = Disks::new_with_refreshed_list();
        let volumes = disks
            .list()
            .iter()
            .map(|disk| VolumeSpace {
                mount_point: disk.mount_point().to_path_buf(),
                total_bytes: disk.total_space(),
                unallocated_bytes: disk.available_space(),
            })
            .collect();
        Ok(volumes)
    }
}

impl MetricSource for HostCollector {
    fn cpu_load(&self) -> Result<CpuLoad, CollectError> {
        // sysinfo reports zeros rather than an error where load averages do
        // not exist, so only trust the value on unix.
        if !cfg!(unix) {
            return Ok(CpuLoad::Unavailable);
        }
        let load = System::load_average();
        Ok(CpuLoad::from_load_average(load.one, Self::processor_count()))
    }

    fn memory_usage(&self) -> Result<f64, CollectError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(CollectError::Unsupported("memory statistics"));
        }

        let system = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram()),
        );
        let total = system.total_memory();
        if total == 0 {
            return Ok(0.0);
        }
        let available = system.available_memory().min(total);
        Ok(1.0 - available as f64 / total as f64)
    }

    fn disk_usage(&self) -> Result<f64, CollectError> {
        let volumes = self.volumes()?;
        for volume in &volumes {
            tracing::trace!(
                mount_point = %volume.mount_point.display(),
                usage = volume.usage(),
                "Volume usage",
            );
        }
        Ok(disk_usage_from(&volumes))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
