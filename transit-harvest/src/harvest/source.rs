//! The remote fetch capability the orchestrator depends on.

use std::future::Future;

use chrono::NaiveDateTime;

use crate::domain::StationId;
use crate::efa::FetchError;

/// One raw, still-nested trip or departure record.
pub type RawRecord = serde_json::Value;

/// Parameters shared by every fetch in one harvesting run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchParams {
    /// Reference time for the query (local time of the network).
    pub at: NaiveDateTime,
    /// Maximum number of records the service should return per call.
    pub limit: u32,
}

impl FetchParams {
    pub fn new(at: NaiveDateTime, limit: u32) -> Self {
        Self { at, limit }
    }
}

/// Source of raw trip and departure records.
///
/// This abstraction allows the orchestrator to be tested with scripted data.
/// A session is owned by exactly one task for the whole of its run, so
/// implementations never need to synchronise access to it.
pub trait RemoteFetch: Send + Sync + 'static {
    /// Per-task connection state (e.g. an HTTP client with its own pool).
    type Session: Send + 'static;

    /// Open a fresh session for one task.
    fn open_session(&self) -> Result<Self::Session, FetchError>;

    /// Fetch trips from `origin` to `destination`. An empty list means the
    /// service had nothing to offer for this pair.
    fn fetch_trips(
        &self,
        session: &mut Self::Session,
        origin: &StationId,
        destination: &StationId,
        params: &FetchParams,
    ) -> impl Future<Output = Result<Vec<RawRecord>, FetchError>> + Send;

    /// Fetch departures at `station`.
    fn fetch_departures(
        &self,
        session: &mut Self::Session,
        station: &StationId,
        params: &FetchParams,
    ) -> impl Future<Output = Result<Vec<RawRecord>, FetchError>> + Send;
}
