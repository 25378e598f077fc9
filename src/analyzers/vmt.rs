//! Vehicle-kilometres-travelled decomposition over the enroute legs.

use serde::Serialize;

use crate::analyzers::utility::total;
use crate::store::{RouteStep, StepType};

/// `total_vmt` reported when no legs were logged, so downstream shares of it
/// stay finite.
pub const EMPTY_TOTAL_VMT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VmtMetrics {
    pub avg_pax_count_dist_weighted: f64,
    pub total_vmt: f64,
    pub vmt_enrt: f64,
    pub vmt_enrt_gt0: f64,
    pub vmt_enrt_sh: f64,
    pub vmt_enrt_eq0: f64,
    pub vmt_reloc: f64,
    pub trip_original_vmt: f64,
    pub trip_vmt_ratio: f64,
    pub trip_vmt_enrt_shared_ratio: f64,
    pub trip_vmt_total_ratio: f64,
    /// `false` for the [`VmtMetrics::without_routes`] placeholder block.
    pub from_routes: bool,
}

impl VmtMetrics {
    /// Decomposes the driven distance. `trip_original_vmt` is the requested
    /// distance of the completed trips in the window.
    ///
    /// Ratios divide plainly: with legs present but none occupied,
    /// `trip_vmt_enrt_shared_ratio` is NaN.
    pub fn compute(steps: &[RouteStep], trip_original_vmt: f64) -> Self {
        if steps.is_empty() {
            return Self::without_routes(trip_original_vmt);
        }

        let enroute = || steps.iter().filter(|s| s.step_type == StepType::Enroute);
        let occupied = || enroute().filter(|s| s.pax_count > 0.0);

        let weighted_pax = total(occupied().map(|s| s.pax_count * s.distance_km));

        let total_vmt = total(steps.iter().map(|s| s.distance_km));
        let vmt_enrt = total(enroute().map(|s| s.distance_km));
        let vmt_enrt_gt0 = total(occupied().map(|s| s.distance_km));
        let vmt_enrt_sh = total(
            enroute()
                .filter(|s| s.request_count > 1.0)
                .map(|s| s.distance_km),
        );
        let vmt_enrt_eq0 = total(
            enroute()
                .filter(|s| s.pax_count == 0.0)
                .map(|s| s.distance_km),
        );
        let vmt_reloc = total(
            steps
                .iter()
                .filter(|s| s.step_type == StepType::EnrouteRelocation)
                .map(|s| s.distance_km),
        );

        Self {
            avg_pax_count_dist_weighted: weighted_pax / vmt_enrt_gt0,
            total_vmt,
            vmt_enrt,
            vmt_enrt_gt0,
            vmt_enrt_sh,
            vmt_enrt_eq0,
            vmt_reloc,
            trip_original_vmt,
            trip_vmt_ratio: vmt_enrt_gt0 / trip_original_vmt - 1.0,
            trip_vmt_enrt_shared_ratio: vmt_enrt_sh / vmt_enrt_gt0,
            trip_vmt_total_ratio: total_vmt / trip_original_vmt - 1.0,
            from_routes: true,
        }
    }

    /// Values reported when the route log has no enroute legs: every sum and
    /// ratio is zero except the total, which is [`EMPTY_TOTAL_VMT`].
    pub fn without_routes(trip_original_vmt: f64) -> Self {
        Self {
            avg_pax_count_dist_weighted: 0.0,
            total_vmt: EMPTY_TOTAL_VMT,
            vmt_enrt: 0.0,
            vmt_enrt_gt0: 0.0,
            vmt_enrt_sh: 0.0,
            vmt_enrt_eq0: 0.0,
            vmt_reloc: 0.0,
            trip_original_vmt,
            trip_vmt_ratio: 0.0,
            trip_vmt_enrt_shared_ratio: 0.0,
            trip_vmt_total_ratio: 0.0,
            from_routes: false,
        }
    }
}
