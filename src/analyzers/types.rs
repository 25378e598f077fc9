//! Data types produced by the metric engine.

use serde::Serialize;

use crate::window::TimeWindow;

/// Semantic unit of a KPI. The renderer picks the presentation from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Fraction of a count, e.g. served over requested.
    Share,
    /// Relative elongation or ratio, `actual / reference - 1`.
    Ratio,
    Seconds,
    Kilometers,
    /// Kilometres that are also reported as a share of the total VMT.
    VmtKilometers,
    Minutes,
    /// Fleet-wide minute totals, reported without decimals.
    TotalMinutes,
    KilowattHours,
    Count,
    /// Whole-number maximum, reported without decimals.
    Peak,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Float(f64),
    Integer(i64),
    Text(String),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Float(v) => Some(*v),
            MetricValue::Integer(v) => Some(*v as f64),
            MetricValue::Text(_) => None,
        }
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Integer(v)
    }
}

impl From<Option<i64>> for MetricValue {
    fn from(v: Option<i64>) -> Self {
        v.map_or(MetricValue::Float(f64::NAN), MetricValue::Integer)
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

/// One named indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub key: &'static str,
    pub unit: Unit,
    pub value: MetricValue,
}

/// The ordered indicator list of one report run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    pub window: TimeWindow,
    pub kpis: Vec<Kpi>,
}

impl KpiReport {
    pub fn get(&self, key: &str) -> Option<&Kpi> {
        self.kpis.iter().find(|k| k.key == key)
    }

    /// Numeric value of `key`, `None` for unknown keys and text values.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|k| k.value.as_f64())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Kpi> {
        self.kpis.iter()
    }
}
