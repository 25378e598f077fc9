//! Request-level indicators: service rate, waiting time and elongation.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::analyzers::utility::{mean, median, rate, total};
use crate::store::TripRecord;
use crate::window::TimeWindow;

/// The two trip populations every request metric is drawn from.
pub struct TripSets<'a> {
    /// All requests inside the window, whatever their outcome.
    pub raw: Vec<&'a TripRecord>,
    /// Completed requests inside the window.
    pub completed: Vec<&'a TripRecord>,
}

impl<'a> TripSets<'a> {
    pub fn select(trips: &'a [TripRecord], window: &TimeWindow) -> Self {
        let raw: Vec<&TripRecord> = trips
            .iter()
            .filter(|t| window.contains(t.orig_start_time))
            .collect();
        let completed = raw.iter().copied().filter(|t| t.is_completed()).collect();
        Self { raw, completed }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripMetrics {
    pub service_rate: f64,
    pub shared_trip_rate: f64,
    pub mean_waiting_time: f64,
    pub median_waiting_time: f64,
    pub mean_dwell_time: f64,
    pub mean_trip_duration_elongation: f64,
    pub mean_trip_duration_elongation_percentage: f64,
    pub median_trip_duration_elongation: f64,
    pub median_trip_duration_elongation_percentage: f64,
    pub mean_total_trip_duration_elongation: f64,
    pub mean_total_trip_duration_elongation_percentage: f64,
    pub median_total_trip_duration_elongation: f64,
    pub median_total_trip_duration_elongation_percentage: f64,
    pub mean_trip_distance_elongation: f64,
    pub mean_trip_distance_elongation_percentage: f64,
    pub median_trip_distance_elongation: f64,
    pub median_trip_distance_elongation_percentage: f64,
    pub trip_original_vmt: f64,
}

impl TripMetrics {
    pub fn compute(sets: &TripSets<'_>) -> Self {
        let completed = &sets.completed;

        let waiting = column(completed, |t| {
            seconds_between(Some(t.orig_start_time), t.time_picked_up)
        });
        let dwell = column(completed, |t| {
            seconds_between(t.time_picked_up, t.time_completed) - t.driving_duration_min * 60.0
        });

        let duration_excess = column(completed, |t| {
            t.driving_duration_min - t.factored_duration_min
        });
        let duration_factor = column(completed, |t| {
            t.driving_duration_min / t.factored_duration_min
        });

        // Absolute form measures past the scheduled stop, relative form measures
        // the whole elapsed time since the request.
        let total_excess = column(completed, |t| {
            seconds_between(t.orig_stop_time(), t.time_completed)
        });
        let total_relative = column(completed, |t| {
            seconds_between(Some(t.orig_start_time), t.time_completed)
                / (t.factored_duration_min * 60.0)
                - 1.0
        });

        let distance_excess = column(completed, |t| t.driving_distance_km - t.orig_distance_km);
        let distance_factor = column(completed, |t| t.driving_distance_km / t.orig_distance_km);

        let shared = completed.iter().filter(|t| t.shared).count();

        Self {
            service_rate: rate(completed.len(), sets.raw.len()),
            shared_trip_rate: rate(shared, completed.len()),
            mean_waiting_time: mean(&waiting),
            median_waiting_time: median(&waiting),
            mean_dwell_time: mean(&dwell),
            mean_trip_duration_elongation: mean(&duration_excess) * 60.0,
            mean_trip_duration_elongation_percentage: mean(&duration_factor) - 1.0,
            median_trip_duration_elongation: median(&duration_excess) * 60.0,
            median_trip_duration_elongation_percentage: median(&duration_factor) - 1.0,
            mean_total_trip_duration_elongation: mean(&total_excess),
            mean_total_trip_duration_elongation_percentage: mean(&total_relative),
            median_total_trip_duration_elongation: median(&total_excess),
            median_total_trip_duration_elongation_percentage: median(&total_relative),
            mean_trip_distance_elongation: mean(&distance_excess),
            mean_trip_distance_elongation_percentage: mean(&distance_factor) - 1.0,
            median_trip_distance_elongation: median(&distance_excess),
            median_trip_distance_elongation_percentage: median(&distance_factor) - 1.0,
            trip_original_vmt: total(completed.iter().map(|t| t.orig_distance_km)),
        }
    }
}

fn column(trips: &[&TripRecord], f: impl Fn(&TripRecord) -> f64) -> Vec<f64> {
    trips.iter().map(|t| f(*t)).collect()
}

/// Seconds from `from` to `to`; NaN when either timestamp is missing.
fn seconds_between(from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> f64 {
    match (from, to) {
        (Some(from), Some(to)) => (to - from)
            .num_microseconds()
            .map_or(f64::NAN, |us| us as f64 / 1_000_000.0),
        _ => f64::NAN,
    }
}
