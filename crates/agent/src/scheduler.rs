//! Periodic cycle scheduler.
//!
//! [`Scheduler::start`] spawns a background task that waits on a
//! [`Trigger`] and runs a [`CycleAction`] each time it fires. The returned
//! [`SchedulerHandle`] owns the task's lifecycle.
//!
//! Guarantees:
//!
//! - Cycles never overlap. The trigger is not polled again until the
//!   running cycle has finished, and [`IntervalTrigger`] skips ticks that
//!   were missed in the meantime instead of replaying them.
//! - A cycle that panics is logged and the schedule carries on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Sampling period for the production agent.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

/// Shortest period an [`IntervalTrigger`] accepts; `tokio` rejects zero.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// The work performed on every trigger.
///
/// Implementations are expected to handle their own errors; anything that
/// escapes as a panic is caught and logged by the scheduler.
#[async_trait]
pub trait CycleAction: Send + Sync {
    async fn run_cycle(&self);
}

/// Decides when the next cycle starts.
#[async_trait]
pub trait Trigger: Send {
    /// Wait for the next firing. Returns `false` once the trigger is
    /// exhausted and no further cycles should run.
    async fn fire(&mut self) -> bool;
}

// ---------------------------------------------------------------------------
// IntervalTrigger
// ---------------------------------------------------------------------------

/// Fires immediately, then once every `period`.
pub struct IntervalTrigger {
    period: Duration,
    /// Created on first use so the trigger can be built outside a runtime.
    interval: Option<Interval>,
}

impl IntervalTrigger {
    /// A `period` shorter than [`MIN_PERIOD`] is raised to it.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[async_trait]
impl Trigger for IntervalTrigger {
    async fn fire(&mut self) -> bool {
        let period = self.period;
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        interval.tick().await;
        true
    }
}

// ---------------------------------------------------------------------------
// ChannelTrigger
// ---------------------------------------------------------------------------

/// Fires once per message received; exhausted when every sender is dropped.
///
/// Lets callers drive cycles by hand instead of waiting on a wall clock.
pub struct ChannelTrigger {
    rx: mpsc::UnboundedReceiver<()>,
}

impl ChannelTrigger {
    /// Create a trigger together with the sender that fires it.
    pub fn new() -> (mpsc::UnboundedSender<()>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

#[async_trait]
impl Trigger for ChannelTrigger {
    async fn fire(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

pub struct Scheduler;

impl Scheduler {
    /// Spawn the scheduling loop on the current tokio runtime.
    pub fn start<T, A>(trigger: T, action: Arc<A>) -> SchedulerHandle
    where
        T: Trigger + 'static,
        A: CycleAction + 'static,
    {
        let cancel = CancellationToken::new();
        let cycles = Arc::new(AtomicU64::new(0));

        let task = tokio::spawn(run_loop(
            trigger,
            action,
            cancel.clone(),
            Arc::clone(&cycles),
        ));

        tracing::info!("Scheduler started");

        SchedulerHandle {
            cancel,
            cycles,
            task,
        }
    }
}

async fn run_loop<T, A>(
    mut trigger: T,
    action: Arc<A>,
    cancel: CancellationToken,
    cycles: Arc<AtomicU64>,
) where
    T: Trigger,
    A: CycleAction + 'static,
{
    loop {
        let fired = tokio::select! {
            _ = cancel.cancelled() => break,
            fired = trigger.fire() => fired,
        };

        if !fired {
            tracing::info!("Trigger exhausted, scheduler exiting");
            break;
        }

        let cycle = cycles.fetch_add(1, Ordering::Relaxed) + 1;
        let action = Arc::clone(&action);
        let mut running = tokio::spawn(async move { action.run_cycle().await });

        tokio::select! {
            _ = cancel.cancelled() => {
                running.abort();
                tracing::warn!(cycle, "Scheduler stopped mid-cycle, cycle aborted");
                break;
            }
            result = &mut running => {
                if let Err(e) = result {
                    tracing::error!(cycle, error = %e, "Monitor cycle panicked");
                }
            }
        }
    }

    tracing::info!(cycles = cycles.load(Ordering::Relaxed), "Scheduler stopped");
}

// ---------------------------------------------------------------------------
// SchedulerHandle
// ---------------------------------------------------------------------------

/// Owns a running scheduler.
pub struct SchedulerHandle {
    cancel: CancellationToken,
    cycles: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Number of cycles started so far.
    pub fn cycles_run(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the scheduling loop to end on its own (trigger exhausted).
    ///
    /// Cancel-safe: dropping this future leaves the scheduler running.
    pub async fn wait(&mut self) -> Result<(), JoinError> {
        (&mut self.task).await
    }

    /// Cancel the loop, aborting an in-flight cycle, and wait for it to exit.
    pub async fn stop(self) -> Result<(), JoinError> {
        self.cancel.cancel();
        self.task.await
    }
}
