//! One import run, end to end.
//!
//! Harvest raw records, normalize them into graphs, store the graphs, and
//! report everything that went wrong along the way to a [`Notifier`]. None
//! of the steps can abort the run; the caller always gets a [`RunReport`].

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::debug;

use crate::domain::{Departure, Trip};
use crate::harvest::{FetchParams, Harvest, HarvestReport, Orchestrator, RemoteFetch, Unit};
use crate::normalize::{Normalized, Rejection, normalize_all, normalize_departure, normalize_trip};
use crate::notify::{Notifier, Summary};
use crate::stations::StationRegistry;
use crate::storage::{Clock, PartitionedStore, Record};

/// Counters for one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub harvest: HarvestReport,
    /// Records dropped by business rules.
    pub filtered: usize,
    /// Records dropped because they were broken.
    pub malformed: usize,
    /// Graphs committed to storage.
    pub stored: usize,
    /// Graphs storage rolled back.
    pub store_failures: usize,
    pub summary: Summary,
}

/// A station list harvested with its own per-station record limit.
#[derive(Debug, Clone, Copy)]
pub struct StationGroup<'a> {
    pub stations: &'a StationRegistry,
    pub limit: u32,
}

impl<'a> StationGroup<'a> {
    pub fn new(stations: &'a StationRegistry, limit: u32) -> Self {
        Self { stations, limit }
    }
}

/// Harvest trips between every pair of stations and store them.
pub async fn import_trips<F, C, N>(
    orchestrator: &Orchestrator<F>,
    stations: &StationRegistry,
    params: FetchParams,
    store: &mut PartitionedStore<Trip, C>,
    notifier: &N,
) -> RunReport
where
    F: RemoteFetch,
    C: Clock,
    N: Notifier,
{
    notifier.info(&format!("Starting trip import for {} stations", stations.len()));

    let harvest = orchestrator.harvest_trips(stations.ids(), params).await;
    finish(harvest, stations, "Trips", normalize_trip, store, notifier).await
}

/// Harvest departures for every group, each with its own limit, and store
/// them as one batch.
pub async fn import_departures<F, C, N>(
    orchestrator: &Orchestrator<F>,
    groups: &[StationGroup<'_>],
    at: NaiveDateTime,
    store: &mut PartitionedStore<Departure, C>,
    notifier: &N,
) -> RunReport
where
    F: RemoteFetch,
    C: Clock,
    N: Notifier,
{
    let mut names = StationRegistry::default();
    for group in groups {
        names.merge(group.stations.clone());
    }
    notifier.info(&format!("Starting departure import for {} stations", names.len()));

    let mut harvest = Harvest::default();
    for group in groups {
        let run = orchestrator
            .harvest_departures(group.stations.ids(), FetchParams::new(at, group.limit))
            .await;
        harvest.records.extend(run.records);
        harvest.report.merge(run.report);
    }

    finish(harvest, &names, "Departures", normalize_departure, store, notifier).await
}

async fn finish<R, C, N>(
    harvest: Harvest,
    names: &StationRegistry,
    noun: &str,
    convert: fn(&Value) -> Result<R, Rejection>,
    store: &mut PartitionedStore<R, C>,
    notifier: &N,
) -> RunReport
where
    R: Record,
    C: Clock,
    N: Notifier,
{
    let Harvest { records, report } = harvest;

    for unit in &report.failed_units {
        notifier.warning(&format!("No {noun} for {}", describe_unit(names, unit)));
    }
    for owner in &report.failed_tasks {
        notifier.error(&format!("Harvest task for {} failed", names.describe(owner)));
    }

    let Normalized { graphs, rejected } = normalize_all(&records, convert);
    let mut filtered = 0;
    let mut malformed = 0;
    for (idx, reason) in &rejected {
        if reason.is_filtered() {
            debug!(record = idx, reason = %reason, "Record filtered");
            filtered += 1;
        } else {
            notifier.error(&format!("Record {idx} rejected: {reason}"));
            malformed += 1;
        }
    }
    if filtered > 0 {
        notifier.info(&format!("{filtered} records filtered out"));
    }

    let batch = store.persist_many(graphs.into_iter().map(Some)).await;
    for (_, e) in &batch.failures {
        notifier.error(&format!("Could not save {noun}. Reason: {e}"));
    }

    let summary = notifier.summary(batch.committed.len());

    RunReport {
        harvest: report,
        filtered,
        malformed,
        stored: batch.committed.len(),
        store_failures: batch.failures.len(),
        summary,
    }
}

fn describe_unit(names: &StationRegistry, unit: &Unit) -> String {
    match unit {
        Unit::Pair {
            origin,
            destination,
        } => format!("{} -> {}", names.describe(origin), names.describe(destination)),
        Unit::Station(station) => names.describe(station),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::domain::StationId;
    use crate::efa::{Reply, ScriptedFetch};
    use crate::harvest::{HarvestOptions, RetryPolicy};
    use crate::notify::TracingNotifier;
    use crate::storage::ManualClock;

    #[derive(Default)]
    struct Recording {
        inner: TracingNotifier,
        messages: Mutex<Vec<String>>,
    }

    impl Recording {
        fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }

        fn push(&self, level: &str, message: &str) {
            self.messages.lock().unwrap().push(format!("{level}: {message}"));
        }
    }

    impl Notifier for Recording {
        fn info(&self, message: &str) {
            self.push("info", message);
            self.inner.info(message);
        }

        fn warning(&self, message: &str) {
            self.push("warning", message);
            self.inner.warning(message);
        }

        fn error(&self, message: &str) {
            self.push("error", message);
            self.inner.error(message);
        }

        fn summary(&self, records: usize) -> Summary {
            self.inner.summary(records)
        }
    }

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 10, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn clock() -> ManualClock {
        ManualClock::new(NaiveDate::from_ymd_opt(2022, 10, 5).unwrap())
    }

    fn orchestrator(source: ScriptedFetch) -> Orchestrator<ScriptedFetch> {
        Orchestrator::new(
            Arc::new(source),
            HarvestOptions::new(RetryPolicy::new(1, Duration::ZERO)),
        )
    }

    fn rail_trip(duration: i64) -> Value {
        json!({
            "legs": [{
                "duration": duration,
                "transportation": { "number": "S1", "properties": { "trainType": "S" } },
                "stopSequence": [{ "id": "a" }, { "id": "b" }]
            }]
        })
    }

    fn bus_trip() -> Value {
        json!({ "legs": [{ "transportation": { "properties": { "trainType": "Bus" } } }] })
    }

    fn stop_event(station: &str) -> Value {
        json!({
            "location": { "id": station },
            "departureTimePlanned": "2022-10-05T12:00:00+02:00",
            "departureTimeEstimated": "2022-10-05T12:03:00+02:00"
        })
    }

    /// Open today's trip partition and make it refuse legs with a negative
    /// duration, so one graph fails at storage time.
    async fn refuse_negative_legs(store: &mut PartitionedStore<Trip, ManualClock>) {
        store.list_all().await.unwrap();
        let url = format!("sqlite://{}", store.current_path().display());
        let pool = sqlx::SqlitePool::connect(&url).await.unwrap();
        sqlx::query(
            "CREATE TRIGGER refuse_negative_legs BEFORE INSERT ON legs
             WHEN NEW.duration < 0
             BEGIN SELECT RAISE(ABORT, 'negative duration'); END",
        )
        .execute(&pool)
        .await
        .unwrap();
        pool.close().await;
    }

    #[tokio::test]
    async fn trip_import_end_to_end() {
        let stations =
            StationRegistry::from_reader("Alpha;x;y;A\nBeta;x;y;B\nGamma;x;y;C\n".as_bytes())
                .unwrap();
        let [a, b, c] = [id("A"), id("B"), id("C")];
        let source = ScriptedFetch::new()
            .trips(&a, &b, vec![Reply::Records(vec![rail_trip(600), bus_trip()])])
            .trips(&b, &a, vec![Reply::Records(vec![rail_trip(-1)])])
            .trips(&c, &a, vec![Reply::Records(vec![json!({ "legs": 5 })])]);

        let dir = tempfile::tempdir().unwrap();
        let mut store = PartitionedStore::new(dir.path(), clock());
        refuse_negative_legs(&mut store).await;
        let notifier = Recording::default();

        let report = import_trips(
            &orchestrator(source),
            &stations,
            FetchParams::new(at(), 5),
            &mut store,
            &notifier,
        )
        .await;

        assert_eq!(report.harvest.records, 4);
        assert_eq!(report.harvest.units_failed, 3);
        assert_eq!(report.filtered, 1);
        assert_eq!(report.malformed, 1);
        assert_eq!(report.stored, 1);
        assert_eq!(report.store_failures, 1);
        assert_eq!(
            report.summary,
            Summary {
                records: 1,
                infos: 2,
                warnings: 3,
                errors: 2
            }
        );

        let messages = notifier.messages();
        assert!(messages.contains(&"warning: No Trips for Alpha (A) -> Gamma (C)".to_string()));
        assert!(
            messages
                .iter()
                .any(|m| m.starts_with("error: Record") && m.contains("/legs"))
        );
        assert!(
            messages
                .iter()
                .any(|m| m.starts_with("error: Could not save Trips"))
        );

        let stored = store.list_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].value.legs[0].stop_sequence.len(), 2);
    }

    #[tokio::test]
    async fn departure_groups_use_their_own_limits() {
        let lf = StationRegistry::from_reader("Alpha;x;y;A\nBeta;x;y;B\n".as_bytes()).unwrap();
        let hf = StationRegistry::from_reader("Hbf;x;y;H\n".as_bytes()).unwrap();
        let source = ScriptedFetch::new()
            .departures(
                &id("A"),
                vec![Reply::Records(vec![stop_event("A"), stop_event("A")])],
            )
            .departures(&id("B"), vec![Reply::Panic])
            .departures(&id("H"), vec![Reply::Records(vec![stop_event("H")])]);
        let orchestrator = orchestrator(source);

        let dir = tempfile::tempdir().unwrap();
        let mut store = PartitionedStore::new(dir.path(), clock());
        let notifier = Recording::default();

        let groups = [StationGroup::new(&lf, 10), StationGroup::new(&hf, 20)];
        let report = import_departures(&orchestrator, &groups, at(), &mut store, &notifier).await;

        assert_eq!(report.stored, 3);
        assert_eq!(report.harvest.task_failures, 1);
        assert_eq!(report.summary.errors, 1);
        assert!(
            notifier
                .messages()
                .contains(&"error: Harvest task for Beta (B) failed".to_string())
        );

        let stored = store.list_all().await.unwrap();
        assert!(stored.iter().all(|s| s.value.delay_minutes == Some(3)));
        assert!(dir.path().join("departures-2022-10-05.db").exists());
    }

    #[tokio::test]
    async fn departure_limits_reach_the_source() {
        let lf = StationRegistry::from_reader("Alpha;x;y;A\n".as_bytes()).unwrap();
        let hf = StationRegistry::from_reader("Hbf;x;y;H\n".as_bytes()).unwrap();
        let source = Arc::new(ScriptedFetch::new());
        let orchestrator = Orchestrator::new(
            source.clone(),
            HarvestOptions::new(RetryPolicy::new(1, Duration::ZERO)),
        );

        let dir = tempfile::tempdir().unwrap();
        let mut store = PartitionedStore::new(dir.path(), clock());
        let notifier = TracingNotifier::new();

        let groups = [StationGroup::new(&lf, 10), StationGroup::new(&hf, 20)];
        let report = import_departures(&orchestrator, &groups, at(), &mut store, &notifier).await;

        assert_eq!(source.departure_limit(&id("A")), Some(10));
        assert_eq!(source.departure_limit(&id("H")), Some(20));
        assert_eq!(report.stored, 0);
        assert_eq!(report.summary.warnings, 2);
    }

    #[tokio::test]
    async fn empty_station_list_stores_nothing() {
        let stations = StationRegistry::default();
        let dir = tempfile::tempdir().unwrap();
        let mut store = PartitionedStore::new(dir.path(), clock());
        let notifier = TracingNotifier::new();

        let report = import_trips(
            &orchestrator(ScriptedFetch::new()),
            &stations,
            FetchParams::new(at(), 5),
            &mut store,
            &notifier,
        )
        .await;

        assert_eq!(report.stored, 0);
        assert_eq!(report.summary.records, 0);
        assert_eq!(report.summary.warnings, 0);
    }
}
