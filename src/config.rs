//! Run configuration assembled from the command line.

use chrono::NaiveDateTime;
use std::path::PathBuf;
use thiserror::Error;

use crate::output::ArtifactPaths;

/// Layout accepted for `--starttime` / `--endtime`.
pub const BOUND_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid time bound '{0}', expected yyyy-mm-dd hh:mm:ss")]
    InvalidBound(String),
    #[error("end time {end} is before start time {start}")]
    EndBeforeStart {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Parses a window bound given on the command line.
pub fn parse_bound(raw: &str) -> Result<NaiveDateTime, ConfigError> {
    NaiveDateTime::parse_from_str(raw.trim(), BOUND_FORMAT)
        .map_err(|_| ConfigError::InvalidBound(raw.to_string()))
}

/// Everything one report run needs. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub input: PathBuf,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl ReportConfig {
    pub fn new(
        input: impl Into<PathBuf>,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Self, ConfigError> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(ConfigError::EndBeforeStart { start, end });
            }
        }

        Ok(Self {
            input: input.into(),
            start,
            end,
        })
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::for_input(&self.input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_bound() {
        assert_eq!(parse_bound("2017-05-01 08:30:00").unwrap(), at(8, 30));
        assert_eq!(parse_bound(" 2017-05-01 08:30:00 ").unwrap(), at(8, 30));
    }

    #[test]
    fn test_parse_bound_rejects_other_layouts() {
        assert_eq!(
            parse_bound("2017-05-01T08:30"),
            Err(ConfigError::InvalidBound("2017-05-01T08:30".to_string()))
        );
        assert!(parse_bound("yesterday").is_err());
    }

    #[test]
    fn test_end_before_start_rejected() {
        let err = ReportConfig::new("run.sqlite", Some(at(9, 0)), Some(at(8, 0))).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EndBeforeStart {
                start: at(9, 0),
                end: at(8, 0)
            }
        );
    }

    #[test]
    fn test_single_and_equal_bounds_accepted() {
        assert!(ReportConfig::new("run.sqlite", Some(at(8, 0)), None).is_ok());
        assert!(ReportConfig::new("run.sqlite", None, Some(at(8, 0))).is_ok());
        assert!(ReportConfig::new("run.sqlite", Some(at(8, 0)), Some(at(8, 0))).is_ok());
    }

    #[test]
    fn test_artifact_paths() {
        let cfg = ReportConfig::new("out/run.sqlite", None, None).unwrap();
        let paths = cfg.artifact_paths();
        assert_eq!(paths.report, PathBuf::from("out/run.sqlite.txt"));
        assert_eq!(paths.values, PathBuf::from("out/run.sqlite.csv"));
    }
}
