//! Shared utilities for CLI commands.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use wh_core::{Category, TimeRange, WorkPeriod, parse_date, week_start};
use wh_db::Database;

/// Setting holding the first day of the displayed week.
pub const START_DATE_SETTING: &str = "start_date";

/// Builds a period, crediting `standard_hours` to whole-day periods unless
/// `hours` overrides the duration.
pub fn build_period(
    date: NaiveDate,
    range: Option<TimeRange>,
    category: Category,
    has_break: bool,
    hours: Option<f64>,
    standard_hours: f64,
) -> Result<WorkPeriod> {
    let period = match range {
        Some(range) => WorkPeriod::timed(date, range, category, has_break),
        None => WorkPeriod {
            has_break,
            ..WorkPeriod::whole_day(date, category)
        }
        .with_duration(standard_hours)
        .context("invalid standard_day_hours in configuration")?,
    };
    match hours {
        Some(hours) => Ok(period.with_duration(hours)?),
        None => Ok(period),
    }
}

/// First day of the displayed week.
///
/// Reads the stored `start_date` setting, falling back to the Monday of the
/// week containing `today` when it is missing or unreadable.
pub fn displayed_week_start(db: &Database, today: NaiveDate) -> Result<NaiveDate> {
    let stored = db
        .get_setting(START_DATE_SETTING)
        .context("failed to read start_date setting")?;
    let Some(value) = stored else {
        return Ok(week_start(today));
    };
    match parse_date(&value) {
        Ok(date) => Ok(date),
        Err(err) => {
            tracing::warn!(%err, "ignoring stored start_date");
            Ok(week_start(today))
        }
    }
}
