//! CLI entry point for the fleet KPI report.
//!
//! Reads a simulation output database, prints the report and writes it next
//! to the input as `<INPUT>.txt` and `<INPUT>.csv`.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use fleet_kpi::build_report;
use fleet_kpi::config::{ReportConfig, parse_bound};
use fleet_kpi::output::{print_json, print_report, render_text, write_artifacts};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fleet_kpi")]
#[command(about = "Computes fleet KPIs from a simulation output database", long_about = None)]
struct Cli {
    /// Path to the simulation output database
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Start of the report window, "yyyy-mm-dd hh:mm:ss"
    #[arg(short = 's', long, value_parser = parse_bound)]
    starttime: Option<NaiveDateTime>,

    /// End of the report window, "yyyy-mm-dd hh:mm:ss"
    #[arg(short = 'e', long, value_parser = parse_bound)]
    endtime: Option<NaiveDateTime>,

    /// Also log the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/fleet_kpi.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("fleet_kpi.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = match ReportConfig::new(cli.input, cli.starttime, cli.endtime) {
        Ok(config) => config,
        Err(e) => Cli::command().error(ErrorKind::ArgumentConflict, e).exit(),
    };

    if let Err(e) = run(&config, cli.json) {
        error!(input = %config.input.display(), error = %e, "Report failed");
        return Err(e);
    }

    Ok(())
}

fn run(config: &ReportConfig, json: bool) -> Result<()> {
    let report = build_report(config)
        .with_context(|| format!("failed to build report for {}", config.input.display()))?;

    print_report(&config.input, &render_text(&report));
    if json {
        print_json(&report)?;
    }

    let paths = write_artifacts(&config.input, &report)?;
    info!(
        kpis = report.kpis.len(),
        report = %paths.report.display(),
        values = %paths.values.display(),
        "Done"
    );
    Ok(())
}
