//! One monitoring pass: collect, report, evaluate, alert.
//!
//! [`MonitorCycle::run`] never returns an error. Every failure is logged
//! here and folded into a [`CycleOutcome`], so the scheduler keeps firing
//! no matter what happened inside a cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hostwatch_core::{exceeds, AlertEvent, MetricSample, Thresholds};

use crate::collector::MetricSource;
use crate::notifier::AlertSink;
use crate::scheduler::CycleAction;

/// What a single cycle ended up doing.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// Everything within limits.
    Healthy(MetricSample),
    /// A threshold was exceeded and the alert was delivered.
    Alerted(MetricSample),
    /// A threshold was exceeded but the alert could not be delivered.
    AlertFailed(MetricSample),
    /// Metric collection failed; nothing was evaluated or sent.
    Aborted,
}

impl CycleOutcome {
    /// The sample this cycle measured, if collection succeeded.
    pub fn sample(&self) -> Option<&MetricSample> {
        match self {
            CycleOutcome::Healthy(s) | CycleOutcome::Alerted(s) | CycleOutcome::AlertFailed(s) => {
                Some(s)
            }
            CycleOutcome::Aborted => None,
        }
    }
}

/// The collect → evaluate → dispatch sequence, bound to a metric source and
/// an alert sink.
pub struct MonitorCycle<S, N> {
    source: Arc<S>,
    sink: N,
    thresholds: Thresholds,
    /// Set once the "CPU load unavailable" warning has been emitted.
    cpu_unavailable_reported: AtomicBool,
}

impl<S, N> MonitorCycle<S, N>
where
    S: MetricSource + 'static,
    N: AlertSink,
{
    /// Create a cycle using the default thresholds.
    pub fn new(source: S, sink: N) -> Self {
        Self {
            source: Arc::new(source),
            sink,
            thresholds: Thresholds::DEFAULT,
            cpu_unavailable_reported: AtomicBool::new(false),
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Run one full cycle.
    pub async fn run(&self) -> CycleOutcome {
        let Some(sample) = self.collect().await else {
            return CycleOutcome::Aborted;
        };

        if !sample.cpu_load.is_available()
            && !self.cpu_unavailable_reported.swap(true, Ordering::Relaxed)
        {
            tracing::warn!("CPU load average unavailable on this platform -- CPU alerting disabled");
        }

        println!("{}", sample.summary_line());
        tracing::debug!(
            cpu_load = ?sample.cpu_load.value(),
            memory_usage = sample.memory_usage,
            disk_usage = sample.disk_usage,
            "Metrics collected",
        );

        if !exceeds(&sample, &self.thresholds) {
            return CycleOutcome::Healthy(sample);
        }

        let alert = AlertEvent::from_sample(&sample, &self.thresholds);
        let breached: Vec<&str> = alert.breaches.iter().map(|b| b.metric_name).collect();
        tracing::warn!(breached = ?breached, "Resource threshold exceeded, sending alert");

        match self.sink.send(&alert).await {
            Ok(()) => CycleOutcome::Alerted(sample),
            Err(e) => {
                tracing::error!(error = %e, "Failed to send alert -- dropped until next cycle");
                CycleOutcome::AlertFailed(sample)
            }
        }
    }

    /// Read all metrics on a blocking thread.
    async fn collect(&self) -> Option<MetricSample> {
        let source = Arc::clone(&self.source);
        match tokio::task::spawn_blocking(move || source.sample()).await {
            Ok(Ok(sample)) => Some(sample),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Metric collection failed, skipping cycle");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Metric collection task failed, skipping cycle");
                None
            }
        }
    }
}

#[async_trait]
impl<S, N> CycleAction for MonitorCycle<S, N>
where
    S: MetricSource + 'static,
    N: AlertSink + 'static,
{
    async fn run_cycle(&self) {
        self.run().await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
