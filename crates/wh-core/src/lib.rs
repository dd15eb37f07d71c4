//! Core domain logic for the work-hours tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Work periods: dated check-in/check-out ranges and whole-day leave
//! - Resolution: planning how a new range displaces overlapping periods
//! - Summaries: weekly totals and extra hours

mod period;
pub mod resolve;
pub mod summary;
mod types;

pub use period::{EntryId, NaturalKey, STANDARD_DAY_HOURS, StoredPeriod, TimeRange, WorkPeriod};
pub use resolve::{Overlap, Resolution, classify, plan_resolution};
pub use summary::{DaySummary, Span, WeekSummary, iso_week_start, week_start};
pub use types::{
    Category, DATE_FORMAT, TIME_FORMAT, ValidationError, format_date, format_time, parse_date,
    parse_time,
};
