//! Run configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::efa::{DEFAULT_BASE_URL, EfaConfig};
use crate::harvest::{HarvestOptions, RetryPolicy};

/// What a run imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Trips,
    Departures,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trips" => Ok(Mode::Trips),
            "departures" => Ok(Mode::Departures),
            other => Err(format!("expected `trips` or `departures`, got `{other}`")),
        }
    }
}

/// Errors in the environment configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}={value}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything a run needs to know.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    /// Station list (low-frequency stations for departures).
    pub stations: PathBuf,
    /// Optional high-frequency station list for departures.
    pub hf_stations: Option<PathBuf>,
    /// Directory holding the daily partitions.
    pub data_dir: PathBuf,
    pub efa: EfaConfig,
    pub harvest: HarvestOptions,
    /// Departures requested per low-frequency station.
    pub limit: u32,
    /// Departures requested per high-frequency station.
    pub hf_limit: u32,
    /// Trips requested per station pair.
    pub trip_limit: u32,
    pub webhook_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Departures,
            stations: PathBuf::from("stations.csv"),
            hf_stations: None,
            data_dir: PathBuf::from("data"),
            efa: EfaConfig::default(),
            harvest: HarvestOptions::default(),
            limit: 10,
            hf_limit: 20,
            trip_limit: 5,
            webhook_url: None,
        }
    }
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through `lookup`. Unset and empty variables
    /// take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let base_url = get("EFA_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let connect = parse(&get, "HARVEST_CONNECT_TIMEOUT_SECS", 3)?;
        let request = parse(&get, "HARVEST_TIMEOUT_SECS", 10)?;
        let efa = EfaConfig::new(base_url)
            .with_timeouts(Duration::from_secs(connect), Duration::from_secs(request));

        let retry = RetryPolicy::new(
            parse(&get, "HARVEST_MAX_ATTEMPTS", 3)?,
            Duration::from_millis(parse(&get, "HARVEST_RETRY_DELAY_MS", 1000)?),
        );
        let mut harvest = HarvestOptions::new(retry);
        if let Some(workers) = parse_opt::<usize>(&get, "HARVEST_MAX_WORKERS")? {
            harvest = harvest.with_max_workers(workers);
        }

        Ok(Self {
            mode: parse(&get, "HARVEST_MODE", defaults.mode)?,
            stations: get("HARVEST_STATIONS")
                .map(PathBuf::from)
                .unwrap_or(defaults.stations),
            hf_stations: get("HARVEST_HF_STATIONS").map(PathBuf::from),
            data_dir: get("HARVEST_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            efa,
            harvest,
            limit: parse(&get, "HARVEST_LIMIT", defaults.limit)?,
            hf_limit: parse(&get, "HARVEST_HF_LIMIT", defaults.hf_limit)?,
            trip_limit: parse(&get, "HARVEST_TRIP_LIMIT", defaults.trip_limit)?,
            webhook_url: get("WEBHOOK_LOGGING_URL"),
        })
    }
}

fn parse<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    Ok(parse_opt(get, var)?.unwrap_or(default))
}

fn parse_opt<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    get(var)
        .map(|value| {
            value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}
