//! Fleet KPI report for ride-pooling simulation output databases.

pub mod analyzers;
pub mod config;
pub mod output;
pub mod store;
pub mod window;

use tracing::info;

use crate::analyzers::{KpiReport, compute_report};
use crate::config::ReportConfig;
use crate::store::{SimLog, SimLogStore, StoreError};
use crate::window::TimeWindow;

/// Resolves the window for `log` from the configured bounds, with defaults
/// taken from the completed trips.
pub fn resolve_window(config: &ReportConfig, log: &SimLog) -> TimeWindow {
    TimeWindow::resolve(
        config.start,
        config.end,
        log.trips.iter().filter(|t| t.is_completed()),
    )
}

/// Loads the database named by `config` and computes its report.
#[tracing::instrument(skip(config), fields(input = %config.input.display()))]
pub fn build_report(config: &ReportConfig) -> Result<KpiReport, StoreError> {
    let store = SimLogStore::open(&config.input)?;
    let log = store.load_all()?;
    let window = resolve_window(config, &log);

    info!(
        start = ?window.start,
        end = ?window.end,
        filtering = window.filtering,
        "Resolved report window"
    );

    Ok(compute_report(&log, &window))
}
