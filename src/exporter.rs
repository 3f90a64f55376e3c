//! Periodic polling of the query API into [`ExporterMetrics`].

use tokio::{
    sync::watch,
    time::{Duration, sleep},
};
use tracing::{info, warn};

use crate::{
    metrics::ExporterMetrics,
    ttn::{FetchError, FetchMeasurements, Measurement},
};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Gauges now hold the last measurement of the response.
    Refreshed,

    /// Nothing recent: battery went to zero, temperature and light are stale.
    Zeroed,

    /// Gauges untouched.
    Failed,
}

pub fn apply_fetch_result(
    metrics: &ExporterMetrics,
    result: Result<Vec<Measurement>, FetchError>,
) -> TickOutcome {
    let measurements = match result {
        Ok(m) => m,
        Err(err) => {
            warn!(error = %err, "failed to get measurement");
            return TickOutcome::Failed;
        }
    };

    let Some(last) = measurements.last() else {
        info!("no recent measurement found, zeroing battery");
        metrics.zero_battery();
        return TickOutcome::Zeroed;
    };

    info!(
        device_id = %last.device_id,
        time = %last.time,
        battery = last.battery,
        temperature = last.temperature,
        light = last.light,
        "refreshing measurement"
    );
    metrics.observe(last);

    TickOutcome::Refreshed
}

pub async fn poll_once<F>(fetcher: &F, metrics: &ExporterMetrics) -> TickOutcome
where
    F: FetchMeasurements,
{
    apply_fetch_result(metrics, fetcher.fetch().await)
}

/// Sleeps `interval`, polls, and repeats until `shutdown` changes or its sender is dropped.
pub async fn run<F>(
    fetcher: F,
    metrics: ExporterMetrics,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) where
    F: FetchMeasurements + Sync,
{
    info!(interval_secs = interval.as_secs(), "exporter loop started");

    loop {
        tokio::select! {
            _ = sleep(interval) => {}
            _ = shutdown.changed() => break,
        }

        tokio::select! {
            _ = poll_once(&fetcher, &metrics) => {}
            _ = shutdown.changed() => break,
        }
    }

    info!("exporter loop stopped");
}
