//! Weekly summaries and extra-hours accounting.

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use serde::Serialize;

use crate::period::{StoredPeriod, TimeRange};
use crate::types::{Category, ValidationError};

/// Span shown for periods without their own times: 09:00 to 16:30.
#[must_use]
pub fn standard_span() -> TimeRange {
    TimeRange::ordered(
        NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
        NaiveTime::from_hms_opt(16, 30, 0).unwrap_or_default(),
    )
}

/// Monday of the week containing `day`.
#[must_use]
pub fn week_start(day: NaiveDate) -> NaiveDate {
    let offset = u64::from(day.weekday().num_days_from_monday());
    day.checked_sub_days(Days::new(offset)).unwrap_or(day)
}

/// Monday of ISO week `week` in `year`.
pub fn iso_week_start(year: i32, week: u32) -> Result<NaiveDate, ValidationError> {
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
        .ok_or(ValidationError::InvalidWeek { year, week })
}

/// One displayed span within a day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Span {
    #[serde(flatten)]
    pub range: TimeRange,
    pub category: Category,
    /// True when the period has no times and the standard span stands in.
    pub assumed: bool,
}

impl Span {
    #[must_use]
    pub fn hours(&self) -> f64 {
        self.range.hours()
    }
}

/// Periods of a single day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub spans: Vec<Span>,
    /// Sum of the stored durations.
    pub hours: f64,
}

/// Seven consecutive days starting at `start`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub iso_week: u32,
    pub days: Vec<DaySummary>,
    pub total_hours: f64,
    /// Time beyond `standard_hours` within each span, summed over the week.
    pub extra_hours: f64,
}

impl WeekSummary {
    /// Builds the summary for the week beginning at `start`.
    ///
    /// Periods dated outside the week are ignored. When `start` is a Sunday
    /// that day is listed last.
    pub fn build(start: NaiveDate, periods: &[StoredPeriod], standard_hours: f64) -> Self {
        let mut dates: Vec<NaiveDate> = start.iter_days().take(7).collect();
        if start.weekday() == Weekday::Sun {
            dates.rotate_left(1);
        }
        let end = start.checked_add_days(Days::new(6)).unwrap_or(start);

        let days: Vec<DaySummary> = dates
            .into_iter()
            .map(|date| summarize_day(date, periods))
            .collect();

        let total_hours = days.iter().map(|day| day.hours).sum();
        let extra_hours = days
            .iter()
            .flat_map(|day| &day.spans)
            .map(|span| (span.hours() - standard_hours).max(0.0))
            .sum();

        Self {
            start,
            end,
            iso_week: start.iso_week().week(),
            days,
            total_hours,
            extra_hours,
        }
    }
}

fn summarize_day(date: NaiveDate, periods: &[StoredPeriod]) -> DaySummary {
    let mut spans = Vec::new();
    let mut hours = 0.0;
    for stored in periods.iter().filter(|stored| stored.period.date == date) {
        let period = &stored.period;
        hours += period.duration_hours;
        spans.push(match period.range {
            Some(range) => Span {
                range,
                category: period.category,
                assumed: false,
            },
            None => Span {
                range: standard_span(),
                category: period.category,
                assumed: true,
            },
        });
    }
    spans.sort_by_key(|span| span.range.start());
    DaySummary { date, spans, hours }
}
