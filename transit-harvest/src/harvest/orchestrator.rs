//! Concurrent fan-out over stations and station pairs.
//!
//! Work is partitioned by owner station: one task per origin (trips) or per
//! station (departures). Each task opens its own session and walks its
//! units sequentially, applying the retry policy to every unit. Tasks run
//! in parallel up to `max_workers`; their outcomes are merged in
//! completion order by a single collecting loop.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::sync::Semaphore;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::domain::StationId;
use crate::efa::FetchError;

use super::report::{DEFAULT_SAMPLE_LIMIT, HarvestReport, Unit, UnitOutcome};
use super::retry::{Attempt, FetchResult, RetryPolicy};
use super::source::{FetchParams, RawRecord, RemoteFetch};

/// Tuning for a harvesting run.
#[derive(Debug, Clone, Copy)]
pub struct HarvestOptions {
    /// Upper bound on concurrently running tasks. `None` sizes the pool to
    /// the number of owner stations.
    pub max_workers: Option<usize>,
    pub retry: RetryPolicy,
    /// How many failure reasons the report keeps.
    pub sample_limit: usize,
}

impl HarvestOptions {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            max_workers: None,
            retry,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }

    /// Cap the number of concurrently running tasks.
    pub fn with_max_workers(mut self, n: usize) -> Self {
        self.max_workers = Some(n.max(1));
        self
    }
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

/// Everything a run collected.
#[derive(Debug, Default)]
pub struct Harvest {
    /// Raw records from every successful unit, in completion order.
    pub records: Vec<RawRecord>,
    pub report: HarvestReport,
}

/// Fans fetches out over a [`RemoteFetch`] source.
pub struct Orchestrator<F> {
    source: Arc<F>,
    options: HarvestOptions,
}

impl<F: RemoteFetch> Orchestrator<F> {
    pub fn new(source: Arc<F>, options: HarvestOptions) -> Self {
        Self { source, options }
    }

    /// Fetch trips for every ordered pair of distinct stations.
    pub async fn harvest_trips(&self, stations: &[StationId], params: FetchParams) -> Harvest {
        self.run(trip_work(stations), params).await
    }

    /// Fetch departures for every station.
    pub async fn harvest_departures(&self, stations: &[StationId], params: FetchParams) -> Harvest {
        self.run(departure_work(stations), params).await
    }

    async fn run(&self, work: Vec<(StationId, Vec<Unit>)>, params: FetchParams) -> Harvest {
        let workers = self.options.max_workers.unwrap_or(work.len()).max(1);
        let semaphore = Arc::new(Semaphore::new(workers));

        info!(tasks = work.len(), workers, "Starting harvest");

        let mut in_flight: FuturesUnordered<_> = work
            .into_iter()
            .map(|(owner, units)| {
                let task = run_task(
                    self.source.clone(),
                    semaphore.clone(),
                    units,
                    params,
                    self.options.retry,
                )
                .instrument(info_span!("task", station = %owner));
                let handle = tokio::spawn(task);
                async move { (owner, handle.await) }
            })
            .collect();

        let mut harvest = Harvest {
            records: Vec::new(),
            report: HarvestReport::new(self.options.sample_limit),
        };

        while let Some((owner, joined)) = in_flight.next().await {
            match joined {
                Ok(Ok(outcomes)) => {
                    for outcome in outcomes {
                        if let Err(reason) = &outcome.result {
                            warn!(unit = %outcome.unit, reason = %reason, "No records for unit");
                        }
                        let records = harvest.report.absorb(outcome);
                        harvest.records.extend(records);
                    }
                }
                Ok(Err(e)) => {
                    error!(station = %owner, error = %e, "Task could not start");
                    harvest.report.task_failed(&owner, e);
                }
                Err(e) => {
                    error!(station = %owner, error = %e, "Task failed");
                    harvest.report.task_failed(&owner, e);
                }
            }
        }

        info!(report = %harvest.report, "Harvest complete");
        harvest
    }
}

/// One task's whole run: open a session, then walk the units in order.
async fn run_task<F: RemoteFetch>(
    source: Arc<F>,
    semaphore: Arc<Semaphore>,
    units: Vec<Unit>,
    params: FetchParams,
    retry: RetryPolicy,
) -> Result<Vec<UnitOutcome>, FetchError> {
    // The semaphore is never closed, so a failed acquire only means we run
    // without a permit.
    let _permit = semaphore.acquire_owned().await.ok();

    let mut session = source.open_session()?;
    let mut outcomes = Vec::with_capacity(units.len());

    for unit in units {
        let mut op = UnitFetch {
            source: source.as_ref(),
            session: &mut session,
            unit: &unit,
            params: &params,
        };
        let retried = retry.run(&mut op).await;
        debug!(unit = %unit, attempts = retried.attempts, "Unit finished");
        outcomes.push(UnitOutcome::from_retried(unit, retried));
    }

    Ok(outcomes)
}

/// A single fetch call for one unit on a borrowed session.
struct UnitFetch<'a, F: RemoteFetch> {
    source: &'a F,
    session: &'a mut F::Session,
    unit: &'a Unit,
    params: &'a FetchParams,
}

impl<F: RemoteFetch> Attempt for UnitFetch<'_, F> {
    async fn attempt(&mut self) -> FetchResult {
        match self.unit {
            Unit::Pair {
                origin,
                destination,
            } => {
                self.source
                    .fetch_trips(&mut *self.session, origin, destination, self.params)
                    .await
            }
            Unit::Station(station) => {
                self.source
                    .fetch_departures(&mut *self.session, station, self.params)
                    .await
            }
        }
    }
}

/// One entry per origin, holding every destination other than itself.
pub fn trip_work(stations: &[StationId]) -> Vec<(StationId, Vec<Unit>)> {
    stations
        .iter()
        .map(|origin| {
            let units = stations
                .iter()
                .filter(|destination| *destination != origin)
                .map(|destination| Unit::Pair {
                    origin: origin.clone(),
                    destination: destination.clone(),
                })
                .collect();
            (origin.clone(), units)
        })
        .collect()
}

/// One entry per station, holding a single departure unit.
pub fn departure_work(stations: &[StationId]) -> Vec<(StationId, Vec<Unit>)> {
    stations
        .iter()
        .map(|station| (station.clone(), vec![Unit::Station(station.clone())]))
        .collect()
}
