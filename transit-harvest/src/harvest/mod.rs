//! Concurrent harvesting of raw records.
//!
//! The orchestrator turns a station list into units of work (station pairs
//! for trips, single stations for departures), runs them concurrently with
//! bounded retry, and returns every record it could collect together with a
//! [`HarvestReport`]. No single unit or task can abort the run.

mod orchestrator;
mod report;
mod retry;
mod source;


pub use orchestrator::{Harvest, HarvestOptions, Orchestrator, departure_work, trip_work};
pub use report::{DEFAULT_SAMPLE_LIMIT, HarvestReport, Unit, UnitOutcome};
pub use retry::{Attempt, FetchResult, Retried, RetryPolicy, empty_or_failed};
pub use source::{FetchParams, RawRecord, RemoteFetch};
