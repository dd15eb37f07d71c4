//! Add command for recording a work or leave period.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::Args;
use wh_core::{Category, TimeRange, parse_date, parse_time};
use wh_db::Database;

use super::util::build_period;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Date of the period (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Check-in time (HH:MM). Omit both times for a whole-day period.
    #[arg(long, value_parser = parse_time, requires = "end")]
    pub start: Option<NaiveTime>,

    /// Check-out time (HH:MM).
    #[arg(long, value_parser = parse_time, requires = "start")]
    pub end: Option<NaiveTime>,

    /// Category: working, sick-leave or vacation.
    #[arg(long, default_value = "working")]
    pub category: Category,

    /// Mark that a break was taken during the period.
    #[arg(long = "break")]
    pub has_break: bool,

    /// Override the recorded duration in hours.
    #[arg(long)]
    pub hours: Option<f64>,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &AddArgs,
    standard_hours: f64,
    today: NaiveDate,
) -> Result<()> {
    let date = args.date.unwrap_or(today);
    let range = TimeRange::from_bounds(args.start, args.end)?;
    let period = build_period(
        date,
        range,
        args.category,
        args.has_break,
        args.hours,
        standard_hours,
    )?;

    db.add_entry(&period)
        .with_context(|| format!("failed to add {}", period.key()))?;
    writeln!(writer, "Added {period}")?;
    Ok(())
}
