//! List command for printing stored periods in a date range.

use std::fmt::Write;

use anyhow::Result;
use chrono::{Days, NaiveDate};
use clap::Args;
use wh_core::{StoredPeriod, format_date, format_time, parse_date};
use wh_db::Database;

use super::util::displayed_week_start;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// First date to include. Defaults to the start of the displayed week.
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last date to include. Defaults to six days after `--from`.
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Formats periods as an aligned table.
pub fn format_entries(entries: &[StoredPeriod], from: NaiveDate, to: NaiveDate) -> String {
    let mut output = String::new();
    if entries.is_empty() {
        writeln!(
            output,
            "No entries between {} and {}.",
            format_date(from),
            format_date(to)
        )
        .unwrap();
        return output;
    }

    writeln!(
        output,
        "{:<10}  {:<5}  {:<5}  {:<10}  {:>5}  BREAK",
        "DATE", "START", "END", "CATEGORY", "HOURS"
    )
    .unwrap();
    for stored in entries {
        let period = &stored.period;
        let (start, end) = period.range.map_or_else(
            || ("-".to_string(), "-".to_string()),
            |range| (format_time(range.start()), format_time(range.end())),
        );
        writeln!(
            output,
            "{:<10}  {start:<5}  {end:<5}  {:<10}  {:>5.2}  {}",
            format_date(period.date),
            period.category.as_str(),
            period.duration_hours,
            if period.has_break { "yes" } else { "no" },
        )
        .unwrap();
    }
    output
}

pub fn run(db: &Database, args: &ListArgs, today: NaiveDate) -> Result<()> {
    let from = match args.from {
        Some(from) => from,
        None => displayed_week_start(db, today)?,
    };
    let to = args
        .to
        .unwrap_or_else(|| from.checked_add_days(Days::new(6)).unwrap_or(from));
    let entries = db.query_entries(from, to)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", format_entries(&entries, from, to));
    }
    Ok(())
}
