//! Run notifications.
//!
//! Every notable event of a run goes through a [`Notifier`], which logs it
//! and counts it by severity. At the end the counts become a [`Summary`]
//! that can be posted to a chat webhook.

mod webhook;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{error, info, warn};

pub use webhook::{NotifyError, WebhookClient, WebhookConfig};

/// Sink for run events.
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
    /// Counts so far, together with the number of records the run produced.
    fn summary(&self, records: usize) -> Summary;
}

/// Final counts of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub records: usize,
    pub infos: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl Summary {
    /// Chat message text. `noun` names the records, e.g. "Departures".
    pub fn message(&self, noun: &str) -> String {
        let mut message = String::from("Import has finished\n");
        if self.errors != 0 {
            message.push_str(&format!("There were {} Errors!\n", self.errors));
        }
        message.push_str(&format!("Number of {noun}: {}\n", self.records));
        message.push_str(&format!(
            "There were {} Warnings and {} Infos",
            self.warnings, self.infos
        ));
        message
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records, {} errors, {} warnings, {} infos",
            self.records, self.errors, self.warnings, self.infos
        )
    }
}

/// Notifier that forwards to `tracing` and counts by severity.
#[derive(Debug, Default)]
pub struct TracingNotifier {
    infos: AtomicUsize,
    warnings: AtomicUsize,
    errors: AtomicUsize,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) {
        info!("{message}");
        self.infos.fetch_add(1, Ordering::Relaxed);
    }

    fn warning(&self, message: &str) {
        warn!("{message}");
        self.warnings.fetch_add(1, Ordering::Relaxed);
    }

    fn error(&self, message: &str) {
        error!("{message}");
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    fn summary(&self, records: usize) -> Summary {
        Summary {
            records,
            infos: self.infos.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_severity() {
        let notifier = TracingNotifier::new();
        notifier.info("Starting import");
        notifier.warning("no data for A");
        notifier.warning("no data for B");
        notifier.error("could not store");

        assert_eq!(
            notifier.summary(42),
            Summary {
                records: 42,
                infos: 1,
                warnings: 2,
                errors: 1
            }
        );
    }

    #[test]
    fn message_mentions_errors_only_when_present() {
        let clean = Summary {
            records: 120,
            infos: 2,
            warnings: 1,
            errors: 0,
        };
        assert_eq!(
            clean.message("Departures"),
            "Import has finished\nNumber of Departures: 120\nThere were 1 Warnings and 2 Infos"
        );

        let failed = Summary { errors: 3, ..clean };
        assert!(failed.message("Trips").contains("There were 3 Errors!\n"));
        assert!(failed.message("Trips").contains("Number of Trips: 120"));
    }
}
