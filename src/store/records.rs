//! Typed rows loaded from the simulator's output database.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::store::duration::SimDuration;

/// Trips requested below this distance are treated as noise and never
/// count as completed.
pub const MIN_COMPLETED_DISTANCE_KM: f64 = 0.1;

/// Final status of a travel request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TripStatus {
    Completed,
    Other(String),
}

impl TripStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "COMPLETED" => TripStatus::Completed,
            other => TripStatus::Other(other.to_string()),
        }
    }
}

/// A single row of `log_trips`.
#[derive(Debug, Clone, Serialize)]
pub struct TripRecord {
    pub request_id: i64,
    pub status: TripStatus,
    pub orig_start_time: NaiveDateTime,
    pub factored_duration_min: f64,
    pub orig_distance_km: f64,
    pub time_picked_up: Option<NaiveDateTime>,
    pub time_drop_off: Option<NaiveDateTime>,
    pub time_completed: Option<NaiveDateTime>,
    pub driving_duration_min: f64,
    pub driving_distance_km: f64,
    pub shared: bool,
}

impl TripRecord {
    /// Whether the trip takes part in completion-based metrics.
    pub fn is_completed(&self) -> bool {
        self.status == TripStatus::Completed && self.orig_distance_km > MIN_COMPLETED_DISTANCE_KM
    }

    /// Scheduled arrival: request time plus the factored travel duration.
    /// `None` when the factored duration is missing.
    pub fn orig_stop_time(&self) -> Option<NaiveDateTime> {
        if !self.factored_duration_min.is_finite() {
            return None;
        }
        let micros = (self.factored_duration_min * 60.0 * 1_000_000.0).round() as i64;
        Some(self.orig_start_time + Duration::microseconds(micros))
    }
}

/// Vehicle status as recorded in `log_simobject_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VehicleStatus {
    Busy,
    Other(String),
}

impl VehicleStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "VEHICLE_BUSY" => VehicleStatus::Busy,
            other => VehicleStatus::Other(other.to_string()),
        }
    }
}

/// Instantaneous occupancy snapshot of one vehicle.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleStatusSample {
    /// NaN when not recorded.
    pub pax_count: f64,
    pub status: VehicleStatus,
}

/// Per-vehicle summary row of `log_stats_vehicle`. Durations are minutes.
/// Missing numeric cells load as NaN.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VehicleStats {
    pub vehicle_id: i64,
    pub driving_distance_km: f64,
    pub served_requests: f64,
    pub served_passengers: f64,
    pub dur_idle_max_min: f64,
    pub dur_idle_sum_min: f64,
    pub dur_busy_drive_sum_min: f64,
    pub dur_busy_dwell_sum_min: f64,
    pub dur_relocation_sum_min: f64,
    pub energy_consumption_kwh: f64,
    pub max_simultaneous_pax: Option<i64>,
}

/// Kind of a driven route leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StepType {
    Enroute,
    EnrouteRelocation,
    Other(String),
}

impl StepType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ENROUTE" => StepType::Enroute,
            "ENROUTE_RELOCATION" => StepType::EnrouteRelocation,
            other => StepType::Other(other.to_string()),
        }
    }
}

/// A driven leg from `log_routes`.
#[derive(Debug, Clone, Serialize)]
pub struct RouteStep {
    pub pax_count: f64,
    pub request_count: f64,
    pub step_type: StepType,
    pub distance_km: f64,
}

/// Everything one report run reads from the database.
#[derive(Debug, Clone, Serialize)]
pub struct SimLog {
    pub trips: Vec<TripRecord>,
    pub vehicle_status: Vec<VehicleStatusSample>,
    pub vehicle_stats: Vec<VehicleStats>,
    pub route_steps: Vec<RouteStep>,
    pub sim_duration: SimDuration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn trip(status: &str, distance: f64) -> TripRecord {
        TripRecord {
            request_id: 1,
            status: TripStatus::parse(status),
            orig_start_time: NaiveDate::from_ymd_opt(2017, 5, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            factored_duration_min: 10.5,
            orig_distance_km: distance,
            time_picked_up: None,
            time_drop_off: None,
            time_completed: None,
            driving_duration_min: 0.0,
            driving_distance_km: 0.0,
            shared: false,
        }
    }

    #[test]
    fn test_completed_requires_status_and_distance() {
        assert!(trip("COMPLETED", 5.0).is_completed());
        assert!(!trip("COMPLETED", 0.1).is_completed());
        assert!(!trip("REJECTED", 5.0).is_completed());
    }

    #[test]
    fn test_orig_stop_time_adds_factored_duration() {
        let t = trip("COMPLETED", 5.0);
        let expected = t.orig_start_time + Duration::seconds(630);
        assert_eq!(t.orig_stop_time(), Some(expected));
    }

    #[test]
    fn test_orig_stop_time_without_factored_duration() {
        let mut t = trip("COMPLETED", 5.0);
        t.factored_duration_min = f64::NAN;
        assert_eq!(t.orig_stop_time(), None);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!(StepType::parse("ENROUTE"), StepType::Enroute);
        assert_eq!(
            StepType::parse("ENROUTE_RELOCATION"),
            StepType::EnrouteRelocation
        );
        assert_eq!(
            StepType::parse("ENROUTE_X"),
            StepType::Other("ENROUTE_X".to_string())
        );
        assert_eq!(VehicleStatus::parse("VEHICLE_BUSY"), VehicleStatus::Busy);
        assert_eq!(
            VehicleStatus::parse("VEHICLE_IDLE"),
            VehicleStatus::Other("VEHICLE_IDLE".to_string())
        );
    }
}
