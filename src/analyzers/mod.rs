//! Metric engine.
//!
//! Turns a loaded [`SimLog`](crate::store::SimLog) and a resolved
//! [`TimeWindow`](crate::window::TimeWindow) into an ordered
//! [`KpiReport`](types::KpiReport). Each submodule owns one group of
//! indicators; [`aggregate::compute_report`] assembles them in report order.

pub mod aggregate;
pub mod fleet;
pub mod trips;
pub mod types;
pub mod utility;
pub mod vmt;

pub use aggregate::compute_report;
pub use types::{Kpi, KpiReport, MetricValue, Unit};
