//! EFA journey planner HTTP client.
//!
//! Issues trip (`XML_TRIP_REQUEST2`) and departure monitor
//! (`XML_DM_REQUEST`) queries in `rapidJSON` output format and returns the
//! raw record lists untouched. Interpretation of the records is left to
//! [`crate::normalize`].

use std::time::Duration;

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::domain::StationId;
use crate::harvest::{FetchParams, RawRecord, RemoteFetch};

use super::error::FetchError;

/// Default base URL (VVS Stuttgart EFA endpoint).
pub const DEFAULT_BASE_URL: &str = "https://www3.vvs.de/mngvvs";

/// Configuration for the EFA client.
#[derive(Debug, Clone)]
pub struct EfaConfig {
    /// Base URL for the API, without a trailing slash
    pub base_url: String,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout, covering the read of the response body
    pub timeout: Duration,
}

impl EfaConfig {
    /// Create a config for the given base URL with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            connect_timeout: Duration::from_secs(3),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set connect and request timeouts.
    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.timeout = request;
        self
    }
}

impl Default for EfaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// EFA API client.
///
/// The client itself is only configuration; every task opens its own
/// [`EfaSession`] so connection pools are never shared between tasks.
#[derive(Debug, Clone)]
pub struct EfaClient {
    config: EfaConfig,
}

/// One task's HTTP connection pool.
#[derive(Debug)]
pub struct EfaSession {
    http: reqwest::Client,
}

impl EfaClient {
    pub fn new(config: EfaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EfaConfig {
        &self.config
    }

    async fn get_records(
        &self,
        session: &EfaSession,
        endpoint: &str,
        query: &[(&str, String)],
        list_key: &str,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let url = format!("{}/{}", self.config.base_url, endpoint);

        let response = session.http.get(&url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await?;
        records_under(&body, list_key)
    }
}

impl RemoteFetch for EfaClient {
    type Session = EfaSession;

    fn open_session(&self) -> Result<EfaSession, FetchError> {
        let http = reqwest::Client::builder()
            .connect_timeout(self.config.connect_timeout)
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        Ok(EfaSession { http })
    }

    async fn fetch_trips(
        &self,
        session: &mut EfaSession,
        origin: &StationId,
        destination: &StationId,
        params: &FetchParams,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let mut query = common_query(params.at);
        query.extend([
            ("type_origin", "any".to_string()),
            ("name_origin", origin.as_str().to_string()),
            ("type_destination", "any".to_string()),
            ("name_destination", destination.as_str().to_string()),
            ("itdTripDateTimeDepArr", "dep".to_string()),
            ("calcNumberOfTrips", params.limit.to_string()),
        ]);

        self.get_records(session, "XML_TRIP_REQUEST2", &query, "journeys")
            .await
    }

    async fn fetch_departures(
        &self,
        session: &mut EfaSession,
        station: &StationId,
        params: &FetchParams,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let mut query = common_query(params.at);
        query.extend([
            ("type_dm", "any".to_string()),
            ("name_dm", station.as_str().to_string()),
            ("mode", "direct".to_string()),
            ("limit", params.limit.to_string()),
        ]);

        self.get_records(session, "XML_DM_REQUEST", &query, "stopEvents")
            .await
    }
}

/// Query parameters every request carries.
fn common_query(at: NaiveDateTime) -> Vec<(&'static str, String)> {
    vec![
        ("outputFormat", "rapidJSON".to_string()),
        ("useRealtime", "1".to_string()),
        ("itdDate", at.format("%Y%m%d").to_string()),
        ("itdTime", at.format("%H%M").to_string()),
    ]
}

/// Pull the record list stored under `key` out of a response body.
///
/// A missing key or `null` means "no results" and yields an empty list.
fn records_under(body: &str, key: &str) -> Result<Vec<RawRecord>, FetchError> {
    let mut root: Value = serde_json::from_str(body).map_err(|e| FetchError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(500).collect()),
    })?;

    match root.get_mut(key).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(records)) => Ok(records),
        Some(other) => Err(FetchError::Shape(format!(
            "`{key}` is {}, expected an array",
            json_kind(&other)
        ))),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
