//! Delete command for removing a period.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::Args;
use wh_core::{NaturalKey, parse_date, parse_time};
use wh_db::Database;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Date of the period (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub date: NaiveDate,

    /// Check-in time (HH:MM). Omit both times to delete a whole-day period.
    #[arg(long, value_parser = parse_time, requires = "end")]
    pub start: Option<NaiveTime>,

    /// Check-out time (HH:MM).
    #[arg(long, value_parser = parse_time, requires = "start")]
    pub end: Option<NaiveTime>,
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, args: &DeleteArgs) -> Result<()> {
    let key = NaturalKey::new(args.date, args.start, args.end)?;
    db.delete_entry(&key)
        .with_context(|| format!("failed to delete {key}"))?;
    writeln!(writer, "Deleted {key}")?;
    Ok(())
}
