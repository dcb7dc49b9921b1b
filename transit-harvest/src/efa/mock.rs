//! Scripted in-memory fetch source.
//!
//! Serves pre-arranged replies per station pair (trips) or per station
//! (departures) so the orchestrator and pipeline can be exercised without
//! network access. Every call is counted.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::StationId;
use crate::harvest::{FetchParams, RawRecord, RemoteFetch};

use super::error::FetchError;

/// One scripted answer to a fetch call.
#[derive(Debug, Clone)]
pub enum Reply {
    Records(Vec<RawRecord>),
    Empty,
    /// Fails with an API error carrying this message.
    Fail(String),
    /// Panics inside the calling task.
    Panic,
}

/// Key for scripted replies: `(origin, Some(destination))` for trips,
/// `(station, None)` for departures.
type ScriptKey = (StationId, Option<StationId>);

/// Fetch source that replays scripted replies.
///
/// Replies for a key are consumed in order; once only one remains it is
/// repeated forever. Keys without a script answer [`Reply::Empty`].
#[derive(Default)]
pub struct ScriptedFetch {
    scripts: Mutex<HashMap<ScriptKey, VecDeque<Reply>>>,
    calls: Mutex<HashMap<ScriptKey, usize>>,
    limits: Mutex<HashMap<ScriptKey, u32>>,
    sessions: AtomicUsize,
}

impl ScriptedFetch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the replies for trips from `origin` to `destination`.
    pub fn trips(self, origin: &StationId, destination: &StationId, replies: Vec<Reply>) -> Self {
        self.script((origin.clone(), Some(destination.clone())), replies)
    }

    /// Script the replies for departures at `station`.
    pub fn departures(self, station: &StationId, replies: Vec<Reply>) -> Self {
        self.script((station.clone(), None), replies)
    }

    fn script(self, key: ScriptKey, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, replies.into());
        self
    }

    /// Number of trip fetches issued for a pair.
    pub fn trip_calls(&self, origin: &StationId, destination: &StationId) -> usize {
        self.calls_for(&(origin.clone(), Some(destination.clone())))
    }

    /// Number of departure fetches issued for a station.
    pub fn departure_calls(&self, station: &StationId) -> usize {
        self.calls_for(&(station.clone(), None))
    }

    /// Total fetches issued across all keys.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).values().sum()
    }

    /// Every key that was fetched at least once.
    pub fn called_pairs(&self) -> Vec<(StationId, Option<StationId>)> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    /// Number of sessions opened.
    pub fn sessions_opened(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    fn calls_for(&self, key: &ScriptKey) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// The record limit of the most recent departure call at `station`.
    pub fn departure_limit(&self, station: &StationId) -> Option<u32> {
        self.limits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(station.clone(), None))
            .copied()
    }

    fn next_reply(&self, key: ScriptKey, params: &FetchParams) -> Reply {
        self.limits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.clone(), params.limit);

        *self
            .calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(key.clone())
            .or_insert(0) += 1;

        let mut scripts = self.scripts.lock().unwrap_or_else(|e| e.into_inner());
        match scripts.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Reply::Empty),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::Empty),
            None => Reply::Empty,
        }
    }
}

fn answer(reply: Reply) -> Result<Vec<RawRecord>, FetchError> {
    match reply {
        Reply::Records(records) => Ok(records),
        Reply::Empty => Ok(Vec::new()),
        Reply::Fail(message) => Err(FetchError::Api {
            status: 503,
            message,
        }),
        Reply::Panic => panic!("scripted panic"),
    }
}

impl RemoteFetch for ScriptedFetch {
    type Session = ();

    fn open_session(&self) -> Result<(), FetchError> {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch_trips(
        &self,
        _session: &mut (),
        origin: &StationId,
        destination: &StationId,
        params: &FetchParams,
    ) -> Result<Vec<RawRecord>, FetchError> {
        answer(self.next_reply((origin.clone(), Some(destination.clone())), params))
    }

    async fn fetch_departures(
        &self,
        _session: &mut (),
        station: &StationId,
        params: &FetchParams,
    ) -> Result<Vec<RawRecord>, FetchError> {
        answer(self.next_reply((station.clone(), None), params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    fn params() -> FetchParams {
        let at = chrono::NaiveDate::from_ymd_opt(2022, 10, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        FetchParams::new(at, 5)
    }

    #[tokio::test]
    async fn replays_in_order_then_repeats_last() {
        let (a, b) = (id("A"), id("B"));
        let source = ScriptedFetch::new().trips(
            &a,
            &b,
            vec![Reply::Empty, Reply::Records(vec![json!({"rating": 1})])],
        );

        assert!(source.fetch_trips(&mut (), &a, &b, &params()).await.unwrap().is_empty());
        assert_eq!(source.fetch_trips(&mut (), &a, &b, &params()).await.unwrap().len(), 1);
        assert_eq!(source.fetch_trips(&mut (), &a, &b, &params()).await.unwrap().len(), 1);
        assert_eq!(source.trip_calls(&a, &b), 3);
    }

    #[tokio::test]
    async fn unscripted_keys_are_empty() {
        let source = ScriptedFetch::new();
        let result = source
            .fetch_departures(&mut (), &id("X"), &params())
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(source.departure_calls(&id("X")), 1);
        assert_eq!(source.departure_limit(&id("X")), Some(5));
        assert_eq!(source.departure_limit(&id("Y")), None);
        assert_eq!(source.total_calls(), 1);
    }

    #[tokio::test]
    async fn fail_reply_is_an_api_error() {
        let a = id("A");
        let source = ScriptedFetch::new().departures(&a, vec![Reply::Fail("down".into())]);
        let err = source.fetch_departures(&mut (), &a, &params()).await.unwrap_err();
        assert!(matches!(err, FetchError::Api { status: 503, .. }));
    }
}
