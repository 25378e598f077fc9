//! Report rendering and persistence.
//!
//! Produces the labeled text report and the decimal-comma value list from a
//! [`KpiReport`], and writes both next to the input database.

use anyhow::{Context, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::{Kpi, KpiReport, MetricValue, Unit};

const LABEL_WIDTH: usize = 25;

/// Display labels of the text report, by indicator key.
static LABELS: &[(&str, &str)] = &[
    ("service_rate", "Service Rate"),
    ("shared_trip_rate", "Shared Rate"),
    ("mean_waiting_time", "Avg. waiting time"),
    ("median_waiting_time", "Med. waiting time"),
    ("mean_dwell_time", "Avg. dwell time"),
    ("mean_trip_duration_elongation", "Avg. dur elongation"),
    ("mean_trip_duration_elongation_percentage", "Avg. dur elongation %"),
    ("median_trip_duration_elongation", "Med. dur elongation"),
    ("median_trip_duration_elongation_percentage", "Med. dur elongation %"),
    ("mean_total_trip_duration_elongation", "Avg. total dur elong."),
    ("mean_total_trip_duration_elongation_percentage", "Avg. total dur elong. %"),
    ("median_total_trip_duration_elongation", "Med. total dur elong."),
    ("median_total_trip_duration_elongation_percentage", "Med. total dur elong. %"),
    ("mean_trip_distance_elongation", "Avg. dist elongation"),
    ("mean_trip_distance_elongation_percentage", "Avg. dist elongation %"),
    ("median_trip_distance_elongation", "Med. dist elongation"),
    ("median_trip_distance_elongation_percentage", "Med. dist elongation %"),
    ("mean_pax_count_all", "Mean pax count"),
    ("mean_veh_driving_distance", "Mean vehicle distance"),
    ("median_veh_driving_distance", "Median vehicle distance"),
    ("mean_pax_count_busy", "Avg. Pax Count BUSY time weighted"),
    ("avg_pax_count_dist_weighted", "Avg. Pax Count ENRT>0Pax dist weighted"),
    ("total_vmt", "TOTAL VMT"),
    ("vmt_enrt", "VMT ENRTE"),
    ("vmt_enrt_gt0", "VMT ENRTE > 0 Pax"),
    ("vmt_enrt_sh", "VMT ENRTE > 1 Pax"),
    ("vmt_enrt_eq0", "VMT ENRTE = 0 Pax"),
    ("vmt_reloc", "VMT RELOC"),
    ("trip_original_vmt", "VMT ORIG"),
    ("trip_vmt_ratio", "VMT ENRTE>0/VMT ORIG"),
    ("trip_vmt_enrt_shared_ratio", "VMT SH/VMT ENRTE>0"),
    ("trip_vmt_total_ratio", "TOTAL VMT/VMT ORIG"),
    ("mean_served_requests", "Mean served requests"),
    ("median_served_requests", "Median served requests"),
    ("mean_served_passengers", "Mean served passengers"),
    ("median_served_passengers", "Median served passengers"),
    ("sum_energy_consumption", "Fleet energy consumption"),
    ("mean_max_idle_duration", "Mean idle dur"),
    ("median_max_idle_duration", "Median idle dur"),
    ("sum_duration_idle", "Total veh idle dur"),
    ("sum_duration_busy_driving", "Total veh busy drv dur"),
    ("sum_duration_busy_dwell", "Total veh busy dwl dur"),
    ("sum_duration_relocating", "Total veh busy reloc dur"),
    ("sim_duration", "Sim duration"),
    ("sim_duration_seconds", "Sim duration sec"),
    ("max_pax_on_vehicle", "Max pax on vehicle"),
];

/// Where [`write_artifacts`] put the report files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub report: PathBuf,
    pub values: PathBuf,
}

impl ArtifactPaths {
    /// `<input>.txt` and `<input>.csv`.
    pub fn for_input(input: &Path) -> Self {
        Self {
            report: with_suffix(input, ".txt"),
            values: with_suffix(input, ".csv"),
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

fn label(key: &str) -> &str {
    LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(key, |(_, l)| *l)
}

/// Renders the labeled text report, one indicator per line.
pub fn render_text(report: &KpiReport) -> String {
    let total_vmt = report.value("total_vmt").unwrap_or(f64::NAN);

    report
        .iter()
        .map(|kpi| {
            format!(
                "{:<width$}: {}\n",
                label(kpi.key),
                format_text_value(kpi, total_vmt),
                width = LABEL_WIDTH
            )
        })
        .collect()
}

fn format_text_value(kpi: &Kpi, total_vmt: f64) -> String {
    let v = match &kpi.value {
        MetricValue::Text(s) => return s.clone(),
        other => other.as_f64().unwrap_or(f64::NAN),
    };

    match kpi.unit {
        Unit::Share => format!("{}%", fixed(v * 100.0, 1)),
        Unit::Ratio => format!("{} %", fixed(v * 100.0, 2)),
        Unit::Seconds => format!("{} s", fixed(v, 2)),
        Unit::Kilometers => format!("{} km", fixed(v, 2)),
        Unit::VmtKilometers => format!(
            "{} km ({}%)",
            fixed(v, 2),
            fixed(v / total_vmt * 100.0, 1)
        ),
        Unit::Minutes => format!("{} min", fixed(v, 2)),
        Unit::TotalMinutes => format!("{} min", fixed(v, 0)),
        Unit::KilowattHours => format!("{} kwh", fixed(v, 2)),
        Unit::Count => fixed(v, 2),
        Unit::Peak => fixed(v, 0),
        Unit::Text => fixed(v, 2),
    }
}

/// Fixed-point formatting that spells non-finite values `nan` / `inf`.
fn fixed(v: f64, precision: usize) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else if v.is_infinite() {
        let spelled = if v > 0.0 { "inf" } else { "-inf" };
        spelled.to_string()
    } else {
        format!("{:.*}", precision, v)
    }
}

/// Shortest round-trip form with at least one decimal place, switching to
/// exponent notation outside `[1e-4, 1e16)`.
fn raw_float(v: f64) -> String {
    if v.is_nan() || v.is_infinite() {
        return fixed(v, 0);
    }

    let magnitude = v.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let exp = format!("{:e}", v);
        return match exp.split_once('e') {
            Some((mantissa, e)) => {
                let e: i32 = e.parse().unwrap_or(0);
                let sign = if e < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, e.abs())
            }
            None => exp,
        };
    }

    if v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

fn raw_value(value: &MetricValue) -> String {
    match value {
        MetricValue::Float(v) => raw_float(*v),
        MetricValue::Integer(i) => i.to_string(),
        MetricValue::Text(s) => s.clone(),
    }
}

/// Renders the value list: one raw value per line in report order, with
/// every decimal point replaced by a comma.
pub fn render_value_list(report: &KpiReport) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for kpi in report.iter() {
        writer.write_record([raw_value(&kpi.value).replace('.', ",")])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush value list: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

/// Prints the report to stdout, headed by the database it was computed from.
pub fn print_report(input: &Path, text: &str) {
    println!("\nDB STATS: {}\n{}", input.display(), text);
}

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &KpiReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes the text report and the value list next to `input`.
///
/// Both files are rendered first and staged under temporary names; they are
/// only moved into place once both are on disk, so a failure leaves neither.
pub fn write_artifacts(input: &Path, report: &KpiReport) -> Result<ArtifactPaths> {
    let paths = ArtifactPaths::for_input(input);
    let text = render_text(report);
    let values = render_value_list(report)?;

    let staged = [
        (with_suffix(&paths.report, ".tmp"), &paths.report, text),
        (with_suffix(&paths.values, ".tmp"), &paths.values, values),
    ];

    for (tmp, _, content) in &staged {
        if let Err(e) = fs::write(tmp, content) {
            discard(&staged);
            return Err(e).with_context(|| format!("failed to write {}", tmp.display()));
        }
        debug!(path = %tmp.display(), bytes = content.len(), "Staged report artifact");
    }

    for (moved, (tmp, target, _)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(tmp, target) {
            discard(&staged);
            for (_, placed, _) in &staged[..moved] {
                let _ = fs::remove_file(placed);
            }
            return Err(e).with_context(|| format!("failed to move {} into place", tmp.display()));
        }
    }

    info!(
        report = %paths.report.display(),
        values = %paths.values.display(),
        "Report written"
    );
    Ok(paths)
}

fn discard(staged: &[(PathBuf, &PathBuf, String)]) {
    for (tmp, _, _) in staged {
        let _ = fs::remove_file(tmp);
    }
}
