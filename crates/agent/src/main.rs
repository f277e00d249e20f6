//! `hostwatch-agent` -- host resource monitor.
//!
//! Samples CPU load, memory usage and disk usage once a minute, prints a
//! status line for each sample, and emails an alert whenever a metric is
//! over its threshold (CPU 80%, memory 80%, disk 90%).
//!
//! Runs until interrupted. SMTP settings come from the environment (see
//! [`hostwatch_agent::config`]); a `.env` file in the working directory is
//! honoured.

use std::sync::Arc;

use hostwatch_agent::collector::HostCollector;
use hostwatch_agent::config::AgentConfig;
use hostwatch_agent::cycle::MonitorCycle;
use hostwatch_agent::notifier::EmailNotifier;
use hostwatch_agent::scheduler::{IntervalTrigger, Scheduler, DEFAULT_PERIOD};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostwatch_agent=info,hostwatch_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AgentConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    let notifier = EmailNotifier::new(&config.smtp).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to set up SMTP transport");
        std::process::exit(1);
    });

    let cycle = MonitorCycle::new(HostCollector::new(), notifier);
    let thresholds = *cycle.thresholds();

    tracing::info!(
        smtp_host = %config.smtp.host,
        smtp_port = config.smtp.port,
        to = %config.smtp.to_address,
        period_secs = DEFAULT_PERIOD.as_secs(),
        cpu_threshold = thresholds.cpu,
        memory_threshold = thresholds.memory,
        disk_threshold = thresholds.disk,
        "Starting hostwatch-agent",
    );

    let mut handle = Scheduler::start(IntervalTrigger::new(DEFAULT_PERIOD), Arc::new(cycle));

    tokio::select! {
        result = handle.wait() => {
            // The interval trigger never runs dry, so the loop ending here
            // means the scheduler task itself died.
            tracing::error!(result = ?result, "Scheduler exited unexpectedly");
            std::process::exit(1);
        }
        _ = shutdown_signal() => {}
    }

    tracing::info!("Shutting down");
    if let Err(e) = handle.stop().await {
        tracing::error!(error = %e, "Scheduler did not shut down cleanly");
    }
}

/// Resolves on Ctrl-C. If the signal handler cannot be installed, the agent
/// keeps running until killed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
