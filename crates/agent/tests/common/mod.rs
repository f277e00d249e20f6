//! Fake metric sources and alert sinks shared by the integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use hostwatch_agent::collector::{CollectError, MetricSource};
use hostwatch_agent::notifier::{AlertSink, NotifyError};
use hostwatch_core::{AlertEvent, CpuLoad};

/// Returns fixed readings; the next `disk_failures` disk reads fail.
pub struct FakeSource {
    pub cpu: CpuLoad,
    pub memory: f64,
    pub disk: f64,
    disk_failures: AtomicUsize,
    pub samples: AtomicUsize,
}

impl FakeSource {
    pub fn new(cpu: f64, memory: f64, disk: f64) -> Self {
        Self {
            cpu: CpuLoad::Available(cpu),
            memory,
            disk,
            disk_failures: AtomicUsize::new(0),
            samples: AtomicUsize::new(0),
        }
    }

    pub fn with_cpu(mut self, cpu: CpuLoad) -> Self {
        self.cpu = cpu;
        self
    }

    pub fn failing_disk_reads(self, count: usize) -> Self {
        self.disk_failures.store(count, Ordering::SeqCst);
        self
    }
}

impl MetricSource for FakeSource {
    fn cpu_load(&self) -> Result<CpuLoad, CollectError> {
        self.samples.fetch_add(1, Ordering::SeqCst);
        Ok(self.cpu)
    }

    fn memory_usage(&self) -> Result<f64, CollectError> {
        Ok(self.memory)
    }

    fn disk_usage(&self) -> Result<f64, CollectError> {
        let failing = self
            .disk_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(CollectError::Io(io::Error::other("mount table unreadable")));
        }
        Ok(self.disk)
    }
}

/// Records every alert; the next `failures` sends fail.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<AlertEvent>>,
    failures: AtomicUsize,
    pub attempts: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_sends(self, count: usize) -> Self {
        self.failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn sent(&self) -> Vec<AlertEvent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn send(&self, alert: &AlertEvent) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(NotifyError::Other("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(alert.clone());
        Ok(())
    }
}
