//! Core type definitions with validation.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage and display format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage and display format for wall-clock times.
pub const TIME_FORMAT: &str = "%H:%M";

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The date string was not `YYYY-MM-DD`.
    #[error("invalid date {value:?}, expected YYYY-MM-DD")]
    InvalidDate { value: String },

    /// The time string was not `HH:MM`.
    #[error("invalid time {value:?}, expected HH:MM")]
    InvalidTime { value: String },

    /// The end of a range was not after its start.
    #[error("end time {end} must be after start time {start}")]
    EmptyRange { start: String, end: String },

    /// Only one of start and end was given.
    #[error("start and end must both be given or both be omitted")]
    HalfDefinedRange,

    /// A duration was negative or not a finite number.
    #[error("duration must be a non-negative number of hours, got {value}")]
    InvalidDuration { value: f64 },

    /// Unknown category label.
    #[error("unknown category: {value}")]
    UnknownCategory { value: String },

    /// ISO week number outside the given year.
    #[error("week {week} does not exist in {year}")]
    InvalidWeek { year: i32, week: u32 },
}

/// What kind of time a period records.
///
/// A tag rather than a hierarchy: all categories share the same fields, and
/// only the presence of start/end decides whether overlap resolution applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Working,
    SickLeave,
    Vacation,
}

impl Category {
    /// Label used for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Working => "Working",
            Self::SickLeave => "Sick Leave",
            Self::Vacation => "Vacation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "working" | "work" => Ok(Self::Working),
            "sick leave" | "sick-leave" | "sick_leave" | "sick" => Ok(Self::SickLeave),
            "vacation" => Ok(Self::Vacation),
            _ => Err(ValidationError::UnknownCategory {
                value: s.to_string(),
            }),
        }
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        value: s.to_string(),
    })
}

/// Parses a 24-hour `HH:MM` time.
pub fn parse_time(s: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).map_err(|_| ValidationError::InvalidTime {
        value: s.to_string(),
    })
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Formats a time as `HH:MM`.
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Serde adapter storing times as `HH:MM`.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_time(*time))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_time(&s).map_err(serde::de::Error::custom)
    }
}
