//! Time window resolution for a report run.

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::store::TripRecord;

/// The window a report covers. Bounds are inclusive.
///
/// `filtering` is only set when the caller gave at least one explicit bound;
/// otherwise the bounds are derived from the data and merely describe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub filtering: bool,
}

impl TimeWindow {
    /// Resolves the window from explicit bounds, falling back to the request
    /// times of the completed trips for any bound that was not given.
    pub fn resolve<'a, I>(
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        completed: I,
    ) -> Self
    where
        I: IntoIterator<Item = &'a TripRecord>,
    {
        let mut first: Option<NaiveDateTime> = None;
        let mut last: Option<NaiveDateTime> = None;
        for trip in completed {
            let t = trip.orig_start_time;
            first = Some(first.map_or(t, |f| f.min(t)));
            last = Some(last.map_or(t, |l| l.max(t)));
        }

        Self {
            start: start.or_else(|| first.map(truncate_to_hour)),
            end: end.or_else(|| last.map(|l| truncate_to_hour(l + Duration::hours(1)))),
            filtering: start.is_some() || end.is_some(),
        }
    }

    /// Whether a trip requested at `t` belongs to the report. A missing bound
    /// leaves that side open.
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        if !self.filtering {
            return true;
        }
        self.start.is_none_or(|s| t >= s) && self.end.is_none_or(|e| t <= e)
    }
}

fn truncate_to_hour(t: NaiveDateTime) -> NaiveDateTime {
    t.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TripStatus;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn trip(start: NaiveDateTime) -> TripRecord {
        TripRecord {
            request_id: 0,
            status: TripStatus::Completed,
            orig_start_time: start,
            factored_duration_min: 10.0,
            orig_distance_km: 5.0,
            time_picked_up: None,
            time_drop_off: None,
            time_completed: None,
            driving_duration_min: 10.0,
            driving_distance_km: 5.0,
            shared: false,
        }
    }

    #[test]
    fn test_defaults_truncate_to_hour() {
        let trips = vec![trip(at(8, 17, 45)), trip(at(10, 59, 59)), trip(at(9, 0, 0))];
        let w = TimeWindow::resolve(None, None, &trips);

        assert_eq!(w.start, Some(at(8, 0, 0)));
        assert_eq!(w.end, Some(at(11, 0, 0)));
        assert!(!w.filtering);
    }

    #[test]
    fn test_defaults_are_descriptive_only() {
        let trips = vec![trip(at(8, 30, 0))];
        let w = TimeWindow::resolve(None, None, &trips);
        assert!(w.contains(at(23, 0, 0)));
    }

    #[test]
    fn test_explicit_bounds_are_inclusive() {
        let none: Vec<TripRecord> = Vec::new();
        let w = TimeWindow::resolve(Some(at(8, 0, 0)), Some(at(9, 0, 0)), &none);
        assert!(w.filtering);
        assert!(w.contains(at(8, 0, 0)));
        assert!(w.contains(at(9, 0, 0)));
        assert!(!w.contains(at(9, 0, 1)));
        assert!(!w.contains(at(7, 59, 59)));
    }

    #[test]
    fn test_single_explicit_bound_uses_default_for_other() {
        let trips = vec![trip(at(8, 30, 0)), trip(at(12, 10, 0))];
        let w = TimeWindow::resolve(Some(at(9, 0, 0)), None, &trips);

        assert!(w.filtering);
        assert_eq!(w.end, Some(at(13, 0, 0)));
        assert!(w.contains(at(12, 10, 0)));
        assert!(!w.contains(at(13, 0, 1)));
    }

    #[test]
    fn test_no_data_leaves_side_open() {
        let none: Vec<TripRecord> = Vec::new();
        let w = TimeWindow::resolve(Some(at(9, 0, 0)), None, &none);
        assert_eq!(w.end, None);
        assert!(w.contains(at(23, 59, 59)));
    }
}
