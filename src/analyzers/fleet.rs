//! Vehicle-side indicators: occupancy snapshots and per-vehicle summaries.

use serde::Serialize;

use crate::analyzers::utility::{mean, median, sum};
use crate::store::{VehicleStats, VehicleStatus, VehicleStatusSample};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyMetrics {
    pub mean_pax_count_all: f64,
    pub mean_pax_count_busy: f64,
}

impl OccupancyMetrics {
    pub fn compute(samples: &[VehicleStatusSample]) -> Self {
        let all: Vec<f64> = samples.iter().map(|s| s.pax_count).collect();
        let busy: Vec<f64> = samples
            .iter()
            .filter(|s| s.status == VehicleStatus::Busy)
            .map(|s| s.pax_count)
            .collect();

        Self {
            mean_pax_count_all: mean(&all),
            mean_pax_count_busy: mean(&busy),
        }
    }
}

/// Aggregates over the per-vehicle summary table. Durations stay in minutes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetMetrics {
    pub mean_veh_driving_distance: f64,
    pub median_veh_driving_distance: f64,
    pub mean_served_requests: f64,
    pub median_served_requests: f64,
    pub mean_served_passengers: f64,
    pub median_served_passengers: f64,
    pub sum_energy_consumption: f64,
    pub mean_max_idle_duration: f64,
    pub median_max_idle_duration: f64,
    pub sum_duration_idle: f64,
    pub sum_duration_busy_driving: f64,
    pub sum_duration_busy_dwell: f64,
    pub sum_duration_relocating: f64,
    /// `None` when no vehicle recorded a value.
    pub max_pax_on_vehicle: Option<i64>,
}

impl FleetMetrics {
    pub fn compute(vehicles: &[VehicleStats]) -> Self {
        let column =
            |f: fn(&VehicleStats) -> f64| -> Vec<f64> { vehicles.iter().map(f).collect() };

        let distance = column(|v| v.driving_distance_km);
        let requests = column(|v| v.served_requests);
        let passengers = column(|v| v.served_passengers);
        let idle_max = column(|v| v.dur_idle_max_min);

        Self {
            mean_veh_driving_distance: mean(&distance),
            median_veh_driving_distance: median(&distance),
            mean_served_requests: mean(&requests),
            median_served_requests: median(&requests),
            mean_served_passengers: mean(&passengers),
            median_served_passengers: median(&passengers),
            sum_energy_consumption: sum(vehicles.iter().map(|v| v.energy_consumption_kwh)),
            mean_max_idle_duration: mean(&idle_max),
            median_max_idle_duration: median(&idle_max),
            sum_duration_idle: sum(vehicles.iter().map(|v| v.dur_idle_sum_min)),
            sum_duration_busy_driving: sum(vehicles.iter().map(|v| v.dur_busy_drive_sum_min)),
            sum_duration_busy_dwell: sum(vehicles.iter().map(|v| v.dur_busy_dwell_sum_min)),
            sum_duration_relocating: sum(vehicles.iter().map(|v| v.dur_relocation_sum_min)),
            max_pax_on_vehicle: vehicles.iter().filter_map(|v| v.max_simultaneous_pax).max(),
        }
    }
}
