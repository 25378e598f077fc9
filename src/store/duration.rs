//! The simulation wall-clock duration stored in `log_configuration`.

use serde::Serialize;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("expected three ':'-separated fields in duration '{0}'")]
    FieldCount(String),
    #[error("duration field '{field}' in '{raw}' is not an integer")]
    InvalidField { raw: String, field: String },
}

/// Duration as stored (`HH:MM:SS`) and as seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimDuration {
    pub text: String,
    pub seconds: i64,
}

impl SimDuration {
    /// Builds the duration from the stored string and the seconds value SQLite
    /// computed for it, if any.
    ///
    /// SQLite only produces seconds for strings that are valid times of day,
    /// so runs of 24 hours or more fall back to splitting the string.
    pub fn from_stored(text: &str, seconds: Option<&str>) -> Result<Self, DurationParseError> {
        let parsed = match seconds.and_then(|s| s.trim().parse::<i64>().ok()) {
            Some(s) => s,
            None => parse_hms(text)?,
        };
        Ok(Self {
            text: text.to_string(),
            seconds: parsed,
        })
    }
}

/// Parses `H:M:S` into `h*3600 + m*60 + s`.
pub fn parse_hms(raw: &str) -> Result<i64, DurationParseError> {
    let fields: Vec<&str> = raw.trim().split(':').collect();
    if fields.len() != 3 {
        return Err(DurationParseError::FieldCount(raw.to_string()));
    }

    let mut parts = [0i64; 3];
    for (slot, field) in parts.iter_mut().zip(&fields) {
        *slot = field
            .trim()
            .parse()
            .map_err(|_| DurationParseError::InvalidField {
                raw: raw.to_string(),
                field: field.to_string(),
            })?;
    }

    let [h, m, s] = parts;
    Ok(h * 3600 + m * 60 + s)
}
