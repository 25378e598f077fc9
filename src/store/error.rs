use std::path::PathBuf;

use crate::store::duration::DurationParseError;
use crate::store::timestamp::TimestampParseError;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("failed to open simulation database {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    #[error("failed to read table {table} from {path}: {source}")]
    Query {
        path: PathBuf,
        table: &'static str,
        source: rusqlite::Error,
    },
    #[error("invalid timestamp in {table}.{column} (row {row}) of {path}: {source}")]
    Timestamp {
        path: PathBuf,
        table: &'static str,
        column: &'static str,
        row: usize,
        source: TimestampParseError,
    },
    #[error("no simulation duration entry in log_configuration of {0}")]
    MissingDuration(PathBuf),
    #[error("malformed simulation duration in {path}: {source}")]
    Duration {
        path: PathBuf,
        source: DurationParseError,
    },
}
