//! Alert notification content for threshold violations.

use crate::sample::MetricSample;
use crate::thresholds::{breaches, Breach, Thresholds};

/// Fixed subject line for every resource alert.
pub const ALERT_SUBJECT: &str = "Server Alert: Resource Usage Exceeded";

/// A formatted alert, ready to hand to a notification sink.
///
/// Ephemeral: built for one send and dropped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub subject: String,
    pub body: String,
    /// The metrics that triggered this alert.
    pub breaches: Vec<Breach>,
}

impl AlertEvent {
    /// Format an alert carrying all three measurements of `sample`.
    ///
    /// The first body line always lists CPU, memory and disk; one line per
    /// breached metric follows so the reader can see which limit tripped.
    pub fn from_sample(sample: &MetricSample, thresholds: &Thresholds) -> Self {
        let breaches = breaches(sample, thresholds);

        let mut body = format!(
            "Alert! CPU: {}, Memory: {:.2}%, Disk: {:.2}% exceeded limits!\n",
            sample.cpu_load.percent_label(),
            sample.memory_usage * 100.0,
            sample.disk_usage * 100.0,
        );
        for breach in &breaches {
            body.push_str(&format!(
                "\n- {}: {:.2}% (threshold {:.2}%)",
                breach.metric_name,
                breach.value * 100.0,
                breach.threshold * 100.0,
            ));
        }
        body.push_str(&format!("\n\nSampled at {}\n", sample.captured_at.to_rfc3339()));

        Self {
            subject: ALERT_SUBJECT.to_string(),
            body,
            breaches,
        }
    }
}
