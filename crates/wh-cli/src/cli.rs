//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::add::AddArgs;
use crate::commands::delete::DeleteArgs;
use crate::commands::list::ListArgs;
use crate::commands::setting::SettingAction;
use crate::commands::update::UpdateArgs;
use crate::commands::week::WeekArgs;

/// Personal work-hours tracker.
///
/// Records working time and leave per day, keeps periods on the same date
/// from overlapping, and summarizes each week with its extra hours.
#[derive(Debug, Parser)]
#[command(name = "wh", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record a period, trimming any periods it overlaps.
    Add(AddArgs),

    /// Change an existing period.
    Update(UpdateArgs),

    /// Remove a period.
    Delete(DeleteArgs),

    /// List periods in a date range.
    List(ListArgs),

    /// Show the weekly summary.
    Week(WeekArgs),

    /// Read or write stored settings.
    #[command(subcommand)]
    Setting(SettingAction),
}
