use chrono::NaiveDateTime;

/// Layouts the simulator writes timestamps in. `T` is what it produces;
/// the space-separated forms come from hand-edited or exported databases.
const LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unrecognized timestamp '{0}'")]
pub struct TimestampParseError(pub String);

/// Parses a stored timestamp in any of the accepted layouts.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, TimestampParseError> {
    let trimmed = raw.trim();
    LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(trimmed, layout).ok())
        .ok_or_else(|| TimestampParseError(raw.to_string()))
}
