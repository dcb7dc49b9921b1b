use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use transit_harvest::config::{Config, Mode};
use transit_harvest::domain::{Departure, Trip};
use transit_harvest::efa::EfaClient;
use transit_harvest::harvest::{FetchParams, Orchestrator};
use transit_harvest::notify::{TracingNotifier, WebhookClient, WebhookConfig};
use transit_harvest::pipeline::{RunReport, StationGroup, import_departures, import_trips};
use transit_harvest::stations::StationRegistry;
use transit_harvest::storage::{PartitionedStore, SystemClock};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("transit_harvest=info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Import aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let notifier = TracingNotifier::new();
    let orchestrator = Orchestrator::new(
        Arc::new(EfaClient::new(config.efa.clone())),
        config.harvest,
    );
    let at = chrono::Local::now().naive_local();

    let (report, noun) = match config.mode {
        Mode::Trips => {
            let stations = StationRegistry::load(&config.stations)?;
            info!(stations = stations.len(), "Loaded station list");

            let mut store: PartitionedStore<Trip, _> =
                PartitionedStore::new(config.data_dir.clone(), SystemClock);
            let params = FetchParams::new(at, config.trip_limit);
            let report =
                import_trips(&orchestrator, &stations, params, &mut store, &notifier).await;
            store.close().await;
            (report, "Trips")
        }
        Mode::Departures => {
            let lf = StationRegistry::load(&config.stations)?;
            let hf = config
                .hf_stations
                .as_ref()
                .map(|path| StationRegistry::load(path))
                .transpose()?;

            let mut groups = vec![StationGroup::new(&lf, config.limit)];
            if let Some(hf) = &hf {
                groups.push(StationGroup::new(hf, config.hf_limit));
            }
            info!(
                stations = lf.len(),
                hf_stations = hf.as_ref().map_or(0, StationRegistry::len),
                "Loaded station lists"
            );

            let mut store: PartitionedStore<Departure, _> =
                PartitionedStore::new(config.data_dir.clone(), SystemClock);
            let report = import_departures(&orchestrator, &groups, at, &mut store, &notifier).await;
            store.close().await;
            (report, "Departures")
        }
    };

    info!(
        summary = %report.summary,
        harvest = %report.harvest,
        filtered = report.filtered,
        "Import finished"
    );
    post_summary(&config, &report, noun).await;

    Ok(())
}

async fn post_summary(config: &Config, report: &RunReport, noun: &str) {
    let Some(url) = &config.webhook_url else {
        warn!("WEBHOOK_LOGGING_URL is not set, summary not posted");
        return;
    };

    let sent = match WebhookClient::new(WebhookConfig::new(url)) {
        Ok(client) => client.send(&report.summary.message(noun)).await,
        Err(e) => Err(e),
    };
    if let Err(e) = sent {
        warn!(error = %e, "Could not post summary");
    }
}
