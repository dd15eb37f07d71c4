//! Work periods and the time ranges they cover.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::types::{Category, ValidationError, format_date, format_time, hhmm, parse_time};

/// Hours credited to a whole-day period, and the length of a standard day.
pub const STANDARD_DAY_HOURS: f64 = 7.5;

/// Surrogate identifier of a stored period.
pub type EntryId = i64;

/// A half-open wall-clock range `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct TimeRange {
    #[serde(with = "hhmm")]
    start: NaiveTime,
    #[serde(with = "hhmm")]
    end: NaiveTime,
}

#[derive(Deserialize)]
struct RawRange {
    #[serde(with = "hhmm")]
    start: NaiveTime,
    #[serde(with = "hhmm")]
    end: NaiveTime,
}

impl TryFrom<RawRange> for TimeRange {
    type Error = ValidationError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeRange {
    /// Creates a range, rejecting `end <= start`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::EmptyRange {
                start: format_time(start),
                end: format_time(end),
            });
        }
        Ok(Self { start, end })
    }

    /// Builds an optional range from optional bounds.
    ///
    /// Both bounds absent is a whole-day period (`None`); exactly one present
    /// is rejected.
    pub fn from_bounds(
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) -> Result<Option<Self>, ValidationError> {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            (None, None) => Ok(None),
            _ => Err(ValidationError::HalfDefinedRange),
        }
    }

    /// Bounds already known to be ordered, e.g. remainders of a valid range.
    pub(crate) fn ordered(start: NaiveTime, end: NaiveTime) -> Self {
        debug_assert!(start < end, "range {start}..{end} is empty");
        Self { start, end }
    }

    #[must_use]
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    /// Length of the range in hours.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }

    /// Whether the two ranges share any instant. Touching ranges do not.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && self.end > other.start
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_time(self.start), format_time(self.end))
    }
}

/// A dated work or leave period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct WorkPeriod {
    pub date: NaiveDate,
    /// `None` for whole-day periods, which never take part in overlap resolution.
    #[serde(flatten)]
    pub range: Option<TimeRange>,
    pub category: Category,
    pub duration_hours: f64,
    pub has_break: bool,
}

#[derive(Deserialize)]
struct RawPeriod {
    date: NaiveDate,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    category: Category,
    duration_hours: f64,
    #[serde(default)]
    has_break: bool,
}

impl TryFrom<RawPeriod> for WorkPeriod {
    type Error = ValidationError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        let start = raw.start.as_deref().map(parse_time).transpose()?;
        let end = raw.end.as_deref().map(parse_time).transpose()?;
        let period = Self {
            date: raw.date,
            range: TimeRange::from_bounds(start, end)?,
            category: raw.category,
            duration_hours: raw.duration_hours,
            has_break: raw.has_break,
        };
        period.validate()?;
        Ok(period)
    }
}

impl WorkPeriod {
    /// A period with check-in and check-out times; duration is derived from the range.
    #[must_use]
    pub fn timed(date: NaiveDate, range: TimeRange, category: Category, has_break: bool) -> Self {
        Self {
            date,
            range: Some(range),
            category,
            duration_hours: range.hours(),
            has_break,
        }
    }

    /// A period without times, credited with [`STANDARD_DAY_HOURS`].
    #[must_use]
    pub const fn whole_day(date: NaiveDate, category: Category) -> Self {
        Self {
            date,
            range: None,
            category,
            duration_hours: STANDARD_DAY_HOURS,
            has_break: false,
        }
    }

    /// Overrides the stored duration.
    pub fn with_duration(mut self, hours: f64) -> Result<Self, ValidationError> {
        self.duration_hours = hours;
        self.validate()?;
        Ok(self)
    }

    /// Checks invariants not enforced by construction.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.duration_hours.is_finite() || self.duration_hours < 0.0 {
            return Err(ValidationError::InvalidDuration {
                value: self.duration_hours,
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn is_timed(&self) -> bool {
        self.range.is_some()
    }

    #[must_use]
    pub const fn key(&self) -> NaturalKey {
        NaturalKey {
            date: self.date,
            range: self.range,
        }
    }
}

impl fmt::Display for WorkPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {:.2}h",
            self.key(),
            self.category,
            self.duration_hours
        )?;
        if self.has_break {
            write!(f, ", with break")?;
        }
        write!(f, ")")
    }
}

/// A period together with its surrogate id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPeriod {
    pub id: EntryId,
    #[serde(flatten)]
    pub period: WorkPeriod,
}

/// The `(date, start, end)` tuple callers use to address a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub date: NaiveDate,
    pub range: Option<TimeRange>,
}

impl NaturalKey {
    pub fn new(
        date: NaiveDate,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            date,
            range: TimeRange::from_bounds(start, end)?,
        })
    }

    #[must_use]
    pub fn start(&self) -> Option<NaiveTime> {
        self.range.map(|range| range.start())
    }

    #[must_use]
    pub fn end(&self) -> Option<NaiveTime> {
        self.range.map(|range| range.end())
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.range {
            Some(range) => write!(f, "{} {range}", format_date(self.date)),
            None => write!(f, "{} whole day", format_date(self.date)),
        }
    }
}
