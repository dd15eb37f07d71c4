//! Week command for the weekly summary and extra hours.
//!
//! The displayed week is remembered in the `start_date` setting, so
//! `--prev`/`--next` step relative to the last week shown.

use std::fmt::Write;

use anyhow::{Context, Result};
use chrono::{Datelike, Days, NaiveDate};
use clap::Args;
use wh_core::{Span, WeekSummary, format_date, iso_week_start, parse_date};
use wh_db::Database;

use super::util::{START_DATE_SETTING, displayed_week_start};

#[derive(Debug, Args)]
pub struct WeekArgs {
    /// Show the week starting at this date.
    #[arg(long, value_parser = parse_date, conflicts_with_all = ["week", "prev", "next"])]
    pub start: Option<NaiveDate>,

    /// Show ISO week N of the current year.
    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(1..=53),
        conflicts_with_all = ["prev", "next"]
    )]
    pub week: Option<u32>,

    /// Step back one week.
    #[arg(long, conflicts_with = "next")]
    pub prev: bool,

    /// Step forward one week.
    #[arg(long)]
    pub next: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Picks the week to show and remembers it when it changed.
pub fn select_week(db: &mut Database, args: &WeekArgs, today: NaiveDate) -> Result<NaiveDate> {
    let current = displayed_week_start(db, today)?;
    let selected = if let Some(start) = args.start {
        start
    } else if let Some(week) = args.week {
        iso_week_start(today.iso_week().year(), week)?
    } else if args.prev {
        current
            .checked_sub_days(Days::new(7))
            .context("week out of range")?
    } else if args.next {
        current
            .checked_add_days(Days::new(7))
            .context("week out of range")?
    } else {
        return Ok(current);
    };

    db.set_setting(START_DATE_SETTING, &format_date(selected))
        .context("failed to store displayed week")?;
    Ok(selected)
}

/// Loads the summary for the week starting at `start`.
pub fn load_week(db: &Database, start: NaiveDate, standard_hours: f64) -> Result<WeekSummary> {
    let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
    let entries = db.query_entries(start, end)?;
    Ok(WeekSummary::build(start, &entries, standard_hours))
}

fn format_span(span: &Span) -> String {
    if span.assumed {
        format!("{} (whole day)", span.category)
    } else {
        format!("{} {}", span.range, span.category)
    }
}

/// Formats the human-readable weekly summary.
pub fn format_week(summary: &WeekSummary) -> String {
    let mut output = String::new();
    writeln!(
        output,
        "Week {}: {} to {}",
        summary.iso_week,
        format_date(summary.start),
        format_date(summary.end)
    )
    .unwrap();
    writeln!(output).unwrap();

    for day in &summary.days {
        let mut line = format!(
            "{} {} {:>6.2}h",
            day.date.format("%a"),
            format_date(day.date),
            day.hours
        );
        if !day.spans.is_empty() {
            let spans: Vec<String> = day.spans.iter().map(format_span).collect();
            line.push_str("  ");
            line.push_str(&spans.join(", "));
        }
        writeln!(output, "{line}").unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "Total: {:.2}h", summary.total_hours).unwrap();
    writeln!(output, "Extra hours: {:.2}", summary.extra_hours).unwrap();
    output
}

pub fn run(
    db: &mut Database,
    args: &WeekArgs,
    standard_hours: f64,
    today: NaiveDate,
) -> Result<()> {
    let start = select_week(db, args, today)?;
    let summary = load_week(db, start, standard_hours)?;
    tracing::debug!(start = %summary.start, extra_hours = summary.extra_hours, "week loaded");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", format_week(&summary));
    }
    Ok(())
}
