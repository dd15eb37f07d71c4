//! Update command for changing an existing period.
//!
//! The period is addressed by its date and times; fields not given on the
//! command line keep their current values. The recorded duration is kept
//! while the times stay the same and recomputed when they change, unless
//! `--hours` sets it.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveTime};
use clap::Args;
use wh_core::{Category, NaturalKey, TimeRange, parse_date, parse_time};
use wh_db::Database;

use super::util::build_period;

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Date of the period to change (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub date: NaiveDate,

    /// Current check-in time (HH:MM). Omit both times to address a whole-day period.
    #[arg(long, value_parser = parse_time, requires = "end")]
    pub start: Option<NaiveTime>,

    /// Current check-out time (HH:MM).
    #[arg(long, value_parser = parse_time, requires = "start")]
    pub end: Option<NaiveTime>,

    /// Move the period to another date.
    #[arg(long, value_parser = parse_date)]
    pub new_date: Option<NaiveDate>,

    /// New check-in time.
    #[arg(long, value_parser = parse_time, conflicts_with = "whole_day")]
    pub new_start: Option<NaiveTime>,

    /// New check-out time.
    #[arg(long, value_parser = parse_time, conflicts_with = "whole_day")]
    pub new_end: Option<NaiveTime>,

    /// Drop the times, turning the period into a whole-day period.
    #[arg(long)]
    pub whole_day: bool,

    /// New category.
    #[arg(long)]
    pub category: Option<Category>,

    /// Mark that a break was taken.
    #[arg(long = "break", conflicts_with = "no_break")]
    pub has_break: bool,

    /// Mark that no break was taken.
    #[arg(long)]
    pub no_break: bool,

    /// Override the recorded duration in hours.
    #[arg(long)]
    pub hours: Option<f64>,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &UpdateArgs,
    standard_hours: f64,
) -> Result<()> {
    let key = NaturalKey::new(args.date, args.start, args.end)?;
    let current = match db.get_entry(key.date, key.start())? {
        Some(stored) if stored.period.range == key.range => stored.period,
        _ => bail!("no entry found for {key}"),
    };

    let range = if args.whole_day {
        None
    } else if args.new_start.is_some() || args.new_end.is_some() {
        TimeRange::from_bounds(
            args.new_start.or_else(|| key.start()),
            args.new_end.or_else(|| key.end()),
        )?
    } else {
        current.range
    };

    let has_break = if args.has_break {
        true
    } else if args.no_break {
        false
    } else {
        current.has_break
    };

    let hours = match args.hours {
        Some(hours) => Some(hours),
        None if range == current.range => Some(current.duration_hours),
        None => None,
    };

    let period = build_period(
        args.new_date.unwrap_or(current.date),
        range,
        args.category.unwrap_or(current.category),
        has_break,
        hours,
        standard_hours,
    )?;

    db.update_entry(&key, &period)
        .with_context(|| format!("failed to update {key}"))?;
    writeln!(writer, "Updated {key} -> {period}")?;
    Ok(())
}
