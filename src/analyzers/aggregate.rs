use tracing::debug;

use crate::analyzers::fleet::{FleetMetrics, OccupancyMetrics};
use crate::analyzers::trips::{TripMetrics, TripSets};
use crate::analyzers::types::{Kpi, KpiReport, MetricValue, Unit};
use crate::analyzers::vmt::VmtMetrics;
use crate::store::SimLog;
use crate::window::TimeWindow;

/// Computes the full indicator list for `log` restricted to `window`.
///
/// The order of the returned indicators is fixed and shared by every output.
/// Pure: identical inputs give identical reports.
pub fn compute_report(log: &SimLog, window: &TimeWindow) -> KpiReport {
    let sets = TripSets::select(&log.trips, window);
    debug!(
        raw = sets.raw.len(),
        completed = sets.completed.len(),
        filtering = window.filtering,
        "Trip sets selected"
    );

    let trips = TripMetrics::compute(&sets);
    let occupancy = OccupancyMetrics::compute(&log.vehicle_status);
    let fleet = FleetMetrics::compute(&log.vehicle_stats);
    let vmt = VmtMetrics::compute(&log.route_steps, trips.trip_original_vmt);

    let mut kpis = Vec::with_capacity(46);

    macro_rules! push_kpi {
        ($key:literal, $unit:ident, $value:expr) => {
            kpis.push(Kpi {
                key: $key,
                unit: Unit::$unit,
                value: MetricValue::from($value),
            });
        };
    }

    push_kpi!("service_rate", Share, trips.service_rate);
    push_kpi!("shared_trip_rate", Share, trips.shared_trip_rate);
    push_kpi!("mean_waiting_time", Seconds, trips.mean_waiting_time);
    push_kpi!("median_waiting_time", Seconds, trips.median_waiting_time);
    push_kpi!("mean_dwell_time", Seconds, trips.mean_dwell_time);
    push_kpi!(
        "mean_trip_duration_elongation",
        Seconds,
        trips.mean_trip_duration_elongation
    );
    push_kpi!(
        "mean_trip_duration_elongation_percentage",
        Ratio,
        trips.mean_trip_duration_elongation_percentage
    );
    push_kpi!(
        "median_trip_duration_elongation",
        Seconds,
        trips.median_trip_duration_elongation
    );
    push_kpi!(
        "median_trip_duration_elongation_percentage",
        Ratio,
        trips.median_trip_duration_elongation_percentage
    );
    push_kpi!(
        "mean_total_trip_duration_elongation",
        Seconds,
        trips.mean_total_trip_duration_elongation
    );
    push_kpi!(
        "mean_total_trip_duration_elongation_percentage",
        Ratio,
        trips.mean_total_trip_duration_elongation_percentage
    );
    push_kpi!(
        "median_total_trip_duration_elongation",
        Seconds,
        trips.median_total_trip_duration_elongation
    );
    push_kpi!(
        "median_total_trip_duration_elongation_percentage",
        Ratio,
        trips.median_total_trip_duration_elongation_percentage
    );
    push_kpi!(
        "mean_trip_distance_elongation",
        Kilometers,
        trips.mean_trip_distance_elongation
    );
    push_kpi!(
        "mean_trip_distance_elongation_percentage",
        Ratio,
        trips.mean_trip_distance_elongation_percentage
    );
    push_kpi!(
        "median_trip_distance_elongation",
        Kilometers,
        trips.median_trip_distance_elongation
    );
    push_kpi!(
        "median_trip_distance_elongation_percentage",
        Ratio,
        trips.median_trip_distance_elongation_percentage
    );

    push_kpi!("mean_pax_count_all", Count, occupancy.mean_pax_count_all);
    push_kpi!("mean_veh_driving_distance", Kilometers, fleet.mean_veh_driving_distance);
    push_kpi!("median_veh_driving_distance", Kilometers, fleet.median_veh_driving_distance);
    push_kpi!("mean_pax_count_busy", Count, occupancy.mean_pax_count_busy);

    push_kpi!(
        "avg_pax_count_dist_weighted",
        Count,
        vmt_value(&vmt, vmt.avg_pax_count_dist_weighted)
    );
    push_kpi!("total_vmt", Kilometers, vmt_value(&vmt, vmt.total_vmt));
    push_kpi!("vmt_enrt", VmtKilometers, vmt_value(&vmt, vmt.vmt_enrt));
    push_kpi!("vmt_enrt_gt0", VmtKilometers, vmt_value(&vmt, vmt.vmt_enrt_gt0));
    push_kpi!("vmt_enrt_sh", VmtKilometers, vmt_value(&vmt, vmt.vmt_enrt_sh));
    push_kpi!("vmt_enrt_eq0", VmtKilometers, vmt_value(&vmt, vmt.vmt_enrt_eq0));
    push_kpi!("vmt_reloc", VmtKilometers, vmt_value(&vmt, vmt.vmt_reloc));
    push_kpi!("trip_original_vmt", Kilometers, vmt.trip_original_vmt);
    push_kpi!("trip_vmt_ratio", Ratio, vmt_value(&vmt, vmt.trip_vmt_ratio));
    push_kpi!(
        "trip_vmt_enrt_shared_ratio",
        Ratio,
        vmt_value(&vmt, vmt.trip_vmt_enrt_shared_ratio)
    );
    push_kpi!("trip_vmt_total_ratio", Ratio, vmt_value(&vmt, vmt.trip_vmt_total_ratio));

    push_kpi!("mean_served_requests", Count, fleet.mean_served_requests);
    push_kpi!("median_served_requests", Count, fleet.median_served_requests);
    push_kpi!("mean_served_passengers", Count, fleet.mean_served_passengers);
    push_kpi!("median_served_passengers", Count, fleet.median_served_passengers);
    push_kpi!("sum_energy_consumption", KilowattHours, fleet.sum_energy_consumption);
    push_kpi!("mean_max_idle_duration", Minutes, fleet.mean_max_idle_duration);
    push_kpi!("median_max_idle_duration", Minutes, fleet.median_max_idle_duration);
    push_kpi!("sum_duration_idle", TotalMinutes, fleet.sum_duration_idle);
    push_kpi!("sum_duration_busy_driving", TotalMinutes, fleet.sum_duration_busy_driving);
    push_kpi!("sum_duration_busy_dwell", TotalMinutes, fleet.sum_duration_busy_dwell);
    push_kpi!("sum_duration_relocating", TotalMinutes, fleet.sum_duration_relocating);

    push_kpi!("sim_duration", Text, log.sim_duration.text.clone());
    push_kpi!("sim_duration_seconds", Seconds, log.sim_duration.seconds);
    push_kpi!("max_pax_on_vehicle", Peak, fleet.max_pax_on_vehicle);

    KpiReport {
        window: *window,
        kpis,
    }
}

/// The no-route block holds whole-number placeholders, reported as integers.
fn vmt_value(vmt: &VmtMetrics, value: f64) -> MetricValue {
    if vmt.from_routes {
        MetricValue::Float(value)
    } else {
        MetricValue::Integer(value as i64)
    }
}
