use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A row of the `time` dimension: the calendar breakdown of one event
/// timestamp.
///
/// `start_time` is the raw epoch-millisecond value rendered as a decimal
/// string, the same key `songplays.start_time` carries. All fields are
/// computed in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_time: String,
    pub hour: u32,
    pub day: u32,
    /// ISO-8601 week number.
    pub week: u32,
    pub month: u32,
    pub year: i32,
    /// Day of the week, Monday = 0 through Sunday = 6.
    pub weekday: u32,
}

impl TimeSlot {
    /// Derive the time row for an epoch-millisecond timestamp.
    ///
    /// # Errors
    /// Returns [`Error::InvalidTimestamp`] if `millis` is outside the range
    /// chrono can represent.
    pub fn from_millis(millis: i64) -> Result<Self> {
        let at = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or(Error::InvalidTimestamp(millis))?;

        Ok(Self {
            start_time: Self::key_for(millis),
            hour: at.hour(),
            day: at.day(),
            week: at.iso_week().week(),
            month: at.month(),
            year: at.year(),
            weekday: at.weekday().num_days_from_monday(),
        })
    }

    /// The `start_time` key for a timestamp: the value itself, unformatted.
    #[must_use]
    pub fn key_for(millis: i64) -> String {
        millis.to_string()
    }
}
