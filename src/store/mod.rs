//! Read-only access to a simulation output database.
//!
//! [`SimLogStore`] owns the SQLite connection for one report run and turns
//! the `log_*` tables into the typed records in [`records`]. The connection
//! is closed when the store is dropped.

pub mod duration;
pub mod error;
pub mod records;
pub mod timestamp;

pub use duration::SimDuration;
pub use error::StoreError;
pub use records::{
    RouteStep, SimLog, StepType, TripRecord, TripStatus, VehicleStats, VehicleStatus,
    VehicleStatusSample,
};

use chrono::NaiveDateTime;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::store::timestamp::parse_timestamp;

const VEHICLE_OBJECT_PATTERN: &str = "%Vehicle";
const ENROUTE_STEP_PATTERN: &str = "ENROUTE%";
const DURATION_KEY_PATTERN: &str = "Simulation%";

const TRIPS_QUERY: &str = "SELECT request_id, status, orig_start_time, factored_duration_min, \
     orig_distance_km, time_trip_picked_up, time_trip_drop_off, time_trip_completed, \
     driving_duration, driving_distance, trip_was_shared FROM log_trips";
const VEHICLE_STATUS_QUERY: &str =
    "SELECT pax_count, status FROM log_simobject_status WHERE object_type LIKE ?1";
const VEHICLE_STATS_QUERY: &str = "SELECT vehicle_id, driving_distance_km, served_requests, \
     served_passengers, dur_idle_max_min, dur_idle_sum_min, dur_busy_drive_sum_min, \
     dur_busy_dwell_sum_min, dur_relocation_sum_min, energy_consumption_kwh, \
     max_simultaneous_pax FROM log_stats_vehicle";
const ROUTE_STEPS_QUERY: &str = "SELECT pax_count, request_count, step_type, distance_km \
     FROM log_routes WHERE object_type LIKE ?1 AND step_type LIKE ?2";
const DURATION_QUERY: &str = "SELECT value, strftime('%s', '1970-01-01 ' || value) \
     FROM log_configuration WHERE key LIKE ?1";

/// Numeric cell as `f64`, NaN when NULL.
fn real(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<f64> {
    Ok(row.get::<_, Option<f64>>(idx)?.unwrap_or(f64::NAN))
}

/// Trip row with its timestamps still in stored form.
struct RawTrip {
    request_id: Option<i64>,
    status: Option<String>,
    orig_start_time: String,
    factored_duration_min: Option<f64>,
    orig_distance_km: Option<f64>,
    picked_up: Option<String>,
    drop_off: Option<String>,
    completed: Option<String>,
    driving_duration_min: Option<f64>,
    driving_distance_km: Option<f64>,
    shared: Option<i64>,
}

pub struct SimLogStore {
    conn: Connection,
    path: PathBuf,
}

impl SimLogStore {
    /// Opens the database at `path` read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "Opened simulation database");
        Ok(Self { conn, path })
    }

    /// Wraps an already open connection, e.g. an in-memory fixture.
    pub fn from_connection(conn: Connection, path: impl Into<PathBuf>) -> Self {
        Self {
            conn,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every table the report needs.
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load_all(&self) -> Result<SimLog, StoreError> {
        let log = SimLog {
            trips: self.load_trips()?,
            vehicle_status: self.load_vehicle_status()?,
            vehicle_stats: self.load_vehicle_stats()?,
            route_steps: self.load_route_steps()?,
            sim_duration: self.load_sim_duration()?,
        };

        info!(
            trips = log.trips.len(),
            vehicle_status = log.vehicle_status.len(),
            vehicle_stats = log.vehicle_stats.len(),
            route_steps = log.route_steps.len(),
            sim_duration = %log.sim_duration.text,
            "Simulation log loaded"
        );
        Ok(log)
    }

    pub fn load_trips(&self) -> Result<Vec<TripRecord>, StoreError> {
        const TABLE: &str = "log_trips";

        let raw: Vec<RawTrip> = self.query(TABLE, TRIPS_QUERY, params![], |row| {
            Ok(RawTrip {
                request_id: row.get(0)?,
                status: row.get(1)?,
                orig_start_time: row.get(2)?,
                factored_duration_min: row.get(3)?,
                orig_distance_km: row.get(4)?,
                picked_up: row.get(5)?,
                drop_off: row.get(6)?,
                completed: row.get(7)?,
                driving_duration_min: row.get(8)?,
                driving_distance_km: row.get(9)?,
                shared: row.get(10)?,
            })
        })?;

        let parse = |row: usize, column: &'static str, value: &str| {
            parse_timestamp(value).map_err(|source| StoreError::Timestamp {
                path: self.path.clone(),
                table: TABLE,
                column,
                row,
                source,
            })
        };
        let parse_opt = |row: usize,
                         column: &'static str,
                         value: Option<&String>|
         -> Result<Option<NaiveDateTime>, StoreError> {
            value.map(|v| parse(row, column, v)).transpose()
        };

        let mut trips = Vec::with_capacity(raw.len());
        for (i, r) in raw.into_iter().enumerate() {
            trips.push(TripRecord {
                request_id: r.request_id.unwrap_or_default(),
                status: TripStatus::parse(r.status.as_deref().unwrap_or_default()),
                orig_start_time: parse(i, "orig_start_time", &r.orig_start_time)?,
                factored_duration_min: r.factored_duration_min.unwrap_or(f64::NAN),
                orig_distance_km: r.orig_distance_km.unwrap_or(f64::NAN),
                time_picked_up: parse_opt(i, "time_trip_picked_up", r.picked_up.as_ref())?,
                time_drop_off: parse_opt(i, "time_trip_drop_off", r.drop_off.as_ref())?,
                time_completed: parse_opt(i, "time_trip_completed", r.completed.as_ref())?,
                driving_duration_min: r.driving_duration_min.unwrap_or(f64::NAN),
                driving_distance_km: r.driving_distance_km.unwrap_or(f64::NAN),
                shared: r.shared == Some(1),
            });
        }

        debug!(rows = trips.len(), "Loaded {}", TABLE);
        Ok(trips)
    }

    pub fn load_vehicle_status(&self) -> Result<Vec<VehicleStatusSample>, StoreError> {
        let samples = self.query(
            "log_simobject_status",
            VEHICLE_STATUS_QUERY,
            [VEHICLE_OBJECT_PATTERN],
            |row| {
                let status: Option<String> = row.get(1)?;
                Ok(VehicleStatusSample {
                    pax_count: real(row, 0)?,
                    status: VehicleStatus::parse(status.as_deref().unwrap_or_default()),
                })
            },
        )?;

        if samples.is_empty() {
            warn!("No vehicle status samples, occupancy means will be undefined");
        }
        Ok(samples)
    }

    pub fn load_vehicle_stats(&self) -> Result<Vec<VehicleStats>, StoreError> {
        self.query("log_stats_vehicle", VEHICLE_STATS_QUERY, params![], |row| {
            let vehicle_id: Option<i64> = row.get(0)?;
            Ok(VehicleStats {
                vehicle_id: vehicle_id.unwrap_or_default(),
                driving_distance_km: real(row, 1)?,
                served_requests: real(row, 2)?,
                served_passengers: real(row, 3)?,
                dur_idle_max_min: real(row, 4)?,
                dur_idle_sum_min: real(row, 5)?,
                dur_busy_drive_sum_min: real(row, 6)?,
                dur_busy_dwell_sum_min: real(row, 7)?,
                dur_relocation_sum_min: real(row, 8)?,
                energy_consumption_kwh: real(row, 9)?,
                max_simultaneous_pax: row.get(10)?,
            })
        })
    }

    pub fn load_route_steps(&self) -> Result<Vec<RouteStep>, StoreError> {
        let steps = self.query(
            "log_routes",
            ROUTE_STEPS_QUERY,
            [VEHICLE_OBJECT_PATTERN, ENROUTE_STEP_PATTERN],
            |row| {
                let step_type: String = row.get(2)?;
                Ok(RouteStep {
                    pax_count: real(row, 0)?,
                    request_count: real(row, 1)?,
                    step_type: StepType::parse(&step_type),
                    distance_km: real(row, 3)?,
                })
            },
        )?;

        if steps.is_empty() {
            warn!("No enroute legs in log_routes, VMT block falls back to defaults");
        }
        Ok(steps)
    }

    pub fn load_sim_duration(&self) -> Result<SimDuration, StoreError> {
        let stored: Option<(Option<String>, Option<String>)> = self
            .conn
            .query_row(DURATION_QUERY, [DURATION_KEY_PATTERN], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()
            .map_err(|source| self.query_error("log_configuration", source))?;

        let (text, seconds) = match stored {
            Some((Some(text), seconds)) => (text, seconds),
            _ => return Err(StoreError::MissingDuration(self.path.clone())),
        };

        SimDuration::from_stored(&text, seconds.as_deref()).map_err(|source| {
            StoreError::Duration {
                path: self.path.clone(),
                source,
            }
        })
    }

    fn query<T, P, F>(
        &self,
        table: &'static str,
        sql: &str,
        params: P,
        map: F,
    ) -> Result<Vec<T>, StoreError>
    where
        P: rusqlite::Params,
        F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    {
        let run = || -> rusqlite::Result<Vec<T>> {
            let mut stmt = self.conn.prepare(sql)?;
            let rows = stmt.query_map(params, map)?;
            rows.collect()
        };
        run().map_err(|source| self.query_error(table, source))
    }

    fn query_error(&self, table: &'static str, source: rusqlite::Error) -> StoreError {
        StoreError::Query {
            path: self.path.clone(),
            table,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_store() -> SimLogStore {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(include_str!("../../tests/fixtures/schema.sql"))
            .unwrap();
        SimLogStore::from_connection(conn, ":memory:")
    }

    fn exec(store: &SimLogStore, sql: &str) {
        store.conn.execute_batch(sql).unwrap();
    }

    #[test]
    fn test_open_missing_file_fails() {
        let result = SimLogStore::open("/nonexistent/dir/sim.db");
        assert!(matches!(result, Err(StoreError::Open { .. })));
    }

    #[test]
    fn test_load_trips_parses_timestamps_and_nulls() {
        let store = fixture_store();
        exec(
            &store,
            "INSERT INTO log_trips (request_id, status, orig_start_time, factored_duration_min,
                orig_distance_km, time_trip_picked_up, time_trip_drop_off, time_trip_completed,
                driving_duration, driving_distance, trip_was_shared)
             VALUES (1, 'COMPLETED', '2017-05-01T08:00', 10.0, 5.0, '2017-05-01T08:02',
                '2017-05-01T08:12', '2017-05-01T08:12:30', 12.0, 6.0, 1),
                    (2, 'REJECTED', '2017-05-01T09:15:10', 7.0, 3.0, NULL, NULL, NULL,
                NULL, 0.0, 0);",
        );

        let trips = store.load_trips().unwrap();
        assert_eq!(trips.len(), 2);
        assert!(trips[0].is_completed());
        assert!(trips[0].shared);
        assert!(trips[0].time_completed.is_some());
        assert_eq!(trips[1].status, TripStatus::Other("REJECTED".to_string()));
        assert!(trips[1].time_picked_up.is_none());
        assert!(trips[1].driving_duration_min.is_nan());
        assert!(!trips[1].shared);
    }

    #[test]
    fn test_bad_timestamp_is_fatal() {
        let store = fixture_store();
        exec(
            &store,
            "INSERT INTO log_trips (request_id, status, orig_start_time)
             VALUES (1, 'COMPLETED', 'not a time');",
        );

        let err = store.load_trips().unwrap_err();
        assert!(matches!(
            err,
            StoreError::Timestamp {
                column: "orig_start_time",
                row: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_vehicle_filters() {
        let store = fixture_store();
        exec(
            &store,
            "INSERT INTO log_simobject_status (object_type, status, pax_count) VALUES
                ('Vehicle', 'VEHICLE_BUSY', 2),
                ('Vehicle', 'VEHICLE_IDLE', 0),
                ('User', 'USER_IN_TRANSIT', 1);
             INSERT INTO log_routes (object_type, step_type, pax_count, request_count, distance_km) VALUES
                ('Vehicle', 'ENROUTE', 1, 1, 2.5),
                ('Vehicle', 'ENROUTE_RELOCATION', 0, 0, 1.0),
                ('Vehicle', 'STATIONARY', 0, 0, 0.0),
                ('User', 'ENROUTE', 1, 1, 9.0);",
        );

        let samples = store.load_vehicle_status().unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].status, VehicleStatus::Busy);

        let steps = store.load_route_steps().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].step_type, StepType::EnrouteRelocation);
    }

    #[test]
    fn test_null_numeric_cells_load_as_nan() {
        let store = fixture_store();
        exec(
            &store,
            "INSERT INTO log_simobject_status (object_type, status, pax_count) VALUES
                ('Vehicle', 'VEHICLE_BUSY', NULL);
             INSERT INTO log_stats_vehicle (vehicle_id, served_requests, energy_consumption_kwh)
                VALUES (7, 3, NULL);
             INSERT INTO log_routes (object_type, step_type, pax_count, request_count, distance_km)
                VALUES ('Vehicle', 'ENROUTE', NULL, 1, NULL);",
        );

        let samples = store.load_vehicle_status().unwrap();
        assert!(samples[0].pax_count.is_nan());

        let vehicles = store.load_vehicle_stats().unwrap();
        assert_eq!(vehicles[0].vehicle_id, 7);
        assert_eq!(vehicles[0].served_requests, 3.0);
        assert!(vehicles[0].energy_consumption_kwh.is_nan());
        assert!(vehicles[0].dur_idle_max_min.is_nan());
        assert_eq!(vehicles[0].max_simultaneous_pax, None);

        let steps = store.load_route_steps().unwrap();
        assert!(steps[0].pax_count.is_nan());
        assert_eq!(steps[0].request_count, 1.0);
        assert!(steps[0].distance_km.is_nan());
    }

    #[test]
    fn test_empty_tables_load_empty() {
        let store = fixture_store();
        assert!(store.load_vehicle_status().unwrap().is_empty());
        assert!(store.load_route_steps().unwrap().is_empty());
        assert!(store.load_vehicle_stats().unwrap().is_empty());
    }

    #[test]
    fn test_sim_duration_from_string() {
        let store = fixture_store();
        exec(
            &store,
            "INSERT INTO log_configuration VALUES ('Simulation Duration', '01:30:00');",
        );
        let d = store.load_sim_duration().unwrap();
        assert_eq!(d.seconds, 5400);
        assert_eq!(d.text, "01:30:00");
    }

    #[test]
    fn test_sim_duration_beyond_a_day() {
        let store = fixture_store();
        exec(
            &store,
            "INSERT INTO log_configuration VALUES ('Simulation Duration', '25:00:01');",
        );
        assert_eq!(store.load_sim_duration().unwrap().seconds, 90001);
    }

    #[test]
    fn test_sim_duration_missing_or_malformed() {
        let store = fixture_store();
        assert!(matches!(
            store.load_sim_duration(),
            Err(StoreError::MissingDuration(_))
        ));

        exec(
            &store,
            "INSERT INTO log_configuration VALUES ('Simulation Duration', 'about an hour');",
        );
        assert!(matches!(
            store.load_sim_duration(),
            Err(StoreError::Duration { .. })
        ));
    }
}
