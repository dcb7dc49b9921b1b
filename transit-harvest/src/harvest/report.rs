//! Per-unit outcomes and the aggregated harvest report.

use std::fmt;

use crate::domain::StationId;

use super::retry::Retried;
use super::source::RawRecord;

/// Default number of failure reasons kept in a report.
pub const DEFAULT_SAMPLE_LIMIT: usize = 20;

/// One unit of fetch work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Trips from `origin` to `destination`.
    Pair {
        origin: StationId,
        destination: StationId,
    },
    /// Departures at a station.
    Station(StationId),
}

impl Unit {
    /// The station whose task owns this unit.
    pub fn owner(&self) -> &StationId {
        match self {
            Unit::Pair { origin, .. } => origin,
            Unit::Station(station) => station,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Pair {
                origin,
                destination,
            } => write!(f, "{origin} -> {destination}"),
            Unit::Station(station) => write!(f, "{station}"),
        }
    }
}

/// What one unit produced.
#[derive(Debug)]
pub struct UnitOutcome {
    pub unit: Unit,
    pub attempts: u32,
    /// Records on success, or the reason the retry budget ran out.
    pub result: Result<Vec<RawRecord>, String>,
}

impl UnitOutcome {
    pub fn from_retried(unit: Unit, retried: Retried) -> Self {
        let result = match (retried.exhausted, retried.result) {
            (false, Ok(records)) => Ok(records),
            (false, Err(e)) => Err(e.to_string()),
            (true, Ok(_)) => Err(format!("empty result after {} attempts", retried.attempts)),
            (true, Err(e)) => Err(format!("{e} (after {} attempts)", retried.attempts)),
        };

        Self {
            unit,
            attempts: retried.attempts,
            result,
        }
    }
}

/// Counters and failure sample for one harvesting run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    /// Raw records collected.
    pub records: usize,
    /// Units that produced records.
    pub units_succeeded: usize,
    /// Subset of `units_succeeded` that needed more than one attempt.
    pub units_retried: usize,
    /// Units that exhausted their retry budget.
    pub units_failed: usize,
    /// Tasks that died (panic, session failure) before finishing.
    pub task_failures: usize,
    /// Every unit that contributed nothing, in completion order.
    pub failed_units: Vec<Unit>,
    /// Owner stations of tasks that died.
    pub failed_tasks: Vec<StationId>,
    /// Bounded sample of failure reasons.
    pub sample: Vec<String>,
    sample_limit: usize,
}

impl HarvestReport {
    pub fn new(sample_limit: usize) -> Self {
        Self {
            records: 0,
            units_succeeded: 0,
            units_retried: 0,
            units_failed: 0,
            task_failures: 0,
            failed_units: Vec::new(),
            failed_tasks: Vec::new(),
            sample: Vec::new(),
            sample_limit,
        }
    }

    /// Fold one unit's outcome into the counters, returning its records.
    pub fn absorb(&mut self, outcome: UnitOutcome) -> Vec<RawRecord> {
        match outcome.result {
            Ok(records) => {
                self.units_succeeded += 1;
                if outcome.attempts > 1 {
                    self.units_retried += 1;
                }
                self.records += records.len();
                records
            }
            Err(reason) => {
                self.units_failed += 1;
                self.note(format!("{}: {reason}", outcome.unit));
                self.failed_units.push(outcome.unit);
                Vec::new()
            }
        }
    }

    /// Record a task that ended without producing outcomes.
    pub fn task_failed(&mut self, owner: &StationId, reason: impl fmt::Display) {
        self.task_failures += 1;
        self.failed_tasks.push(owner.clone());
        self.note(format!("task {owner}: {reason}"));
    }

    /// Fold another run's report into this one.
    pub fn merge(&mut self, other: HarvestReport) {
        self.records += other.records;
        self.units_succeeded += other.units_succeeded;
        self.units_retried += other.units_retried;
        self.units_failed += other.units_failed;
        self.task_failures += other.task_failures;
        self.failed_units.extend(other.failed_units);
        self.failed_tasks.extend(other.failed_tasks);
        for reason in other.sample {
            self.note(reason);
        }
    }

    /// Failures that count as warnings (exhausted units).
    pub fn warnings(&self) -> usize {
        self.units_failed
    }

    /// Failures that count as errors (dead tasks).
    pub fn errors(&self) -> usize {
        self.task_failures
    }

    fn note(&mut self, reason: String) {
        if self.sample.len() < self.sample_limit {
            self.sample.push(reason);
        }
    }
}

impl Default for HarvestReport {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_LIMIT)
    }
}

impl fmt::Display for HarvestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records from {} units ({} after retry), {} units failed, {} tasks failed",
            self.records,
            self.units_succeeded,
            self.units_retried,
            self.units_failed,
            self.task_failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn station(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn pair(o: &str, d: &str) -> Unit {
        Unit::Pair {
            origin: station(o),
            destination: station(d),
        }
    }

    #[test]
    fn unit_display_and_owner() {
        assert_eq!(pair("A", "B").to_string(), "A -> B");
        assert_eq!(pair("A", "B").owner(), &station("A"));
        assert_eq!(Unit::Station(station("C")).to_string(), "C");
    }

    #[test]
    fn absorb_counts_success_and_retry() {
        let mut report = HarvestReport::default();

        let first = report.absorb(UnitOutcome {
            unit: pair("A", "B"),
            attempts: 1,
            result: Ok(vec![json!(1), json!(2)]),
        });
        let second = report.absorb(UnitOutcome {
            unit: pair("A", "C"),
            attempts: 3,
            result: Ok(vec![json!(3)]),
        });

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
        assert_eq!(report.records, 3);
        assert_eq!(report.units_succeeded, 2);
        assert_eq!(report.units_retried, 1);
        assert_eq!(report.warnings(), 0);
    }

    #[test]
    fn absorb_failure_records_unit_and_reason() {
        let mut report = HarvestReport::default();

        let records = report.absorb(UnitOutcome {
            unit: pair("A", "C"),
            attempts: 3,
            result: Err("empty result after 3 attempts".into()),
        });

        assert!(records.is_empty());
        assert_eq!(report.units_failed, 1);
        assert_eq!(report.failed_units, vec![pair("A", "C")]);
        assert_eq!(report.sample, vec!["A -> C: empty result after 3 attempts"]);
    }

    #[test]
    fn sample_is_bounded_but_counts_are_not() {
        let mut report = HarvestReport::new(2);

        for i in 0..5 {
            report.task_failed(&station(&format!("S{i}")), "panicked");
        }

        assert_eq!(report.task_failures, 5);
        assert_eq!(report.errors(), 5);
        assert_eq!(report.failed_tasks.len(), 5);
        assert_eq!(report.sample.len(), 2);
    }

    #[test]
    fn merge_adds_counts_and_keeps_sample_bound() {
        let mut lf = HarvestReport::new(2);
        lf.absorb(UnitOutcome {
            unit: Unit::Station(station("A")),
            attempts: 2,
            result: Ok(vec![json!(1)]),
        });
        lf.absorb(UnitOutcome {
            unit: Unit::Station(station("B")),
            attempts: 3,
            result: Err("empty".into()),
        });

        let mut hf = HarvestReport::new(5);
        hf.absorb(UnitOutcome {
            unit: Unit::Station(station("C")),
            attempts: 1,
            result: Ok(vec![json!(2), json!(3)]),
        });
        hf.task_failed(&station("D"), "panicked");
        hf.task_failed(&station("E"), "panicked");

        lf.merge(hf);

        assert_eq!(lf.records, 3);
        assert_eq!(lf.units_succeeded, 2);
        assert_eq!(lf.units_retried, 1);
        assert_eq!(lf.warnings(), 1);
        assert_eq!(lf.errors(), 2);
        assert_eq!(lf.failed_tasks, vec![station("D"), station("E")]);
        assert_eq!(lf.sample, vec!["B: empty", "task D: panicked"]);
    }

    #[test]
    fn exhausted_outcome_from_retried() {
        let outcome = UnitOutcome::from_retried(
            Unit::Station(station("A")),
            Retried {
                attempts: 4,
                result: Ok(Vec::new()),
                exhausted: true,
            },
        );

        assert_eq!(outcome.attempts, 4);
        assert_eq!(
            outcome.result.unwrap_err(),
            "empty result after 4 attempts"
        );
    }
}
