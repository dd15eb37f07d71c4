//! Setting command for reading and writing stored settings.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Subcommand;
use wh_core::parse_date;
use wh_db::Database;

use super::util::START_DATE_SETTING;

#[derive(Debug, Subcommand)]
pub enum SettingAction {
    /// Print a setting.
    Get {
        /// Setting name, e.g. start_date.
        key: String,
    },

    /// Store a setting.
    Set {
        /// Setting name.
        key: String,

        /// New value.
        value: String,
    },
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, action: &SettingAction) -> Result<()> {
    match action {
        SettingAction::Get { key } => match db.get_setting(key)? {
            Some(value) => writeln!(writer, "{value}")?,
            None => writeln!(writer, "{key} is not set")?,
        },
        SettingAction::Set { key, value } => {
            if key == START_DATE_SETTING {
                parse_date(value).with_context(|| format!("invalid value for {key}"))?;
            }
            db.set_setting(key, value)?;
            writeln!(writer, "Set {key} = {value}")?;
        }
    }
    Ok(())
}
