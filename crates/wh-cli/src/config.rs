//! Configuration for the `wh` binary.
//!
//! Settings are layered, later sources winning:
//!
//! 1. built-in defaults (database under the platform data dir, 7.5h day)
//! 2. `config.toml` in the platform config dir, e.g. `~/.config/wh/config.toml`
//! 3. the file passed with `--config`
//! 4. `WH_DATABASE_PATH` and `WH_STANDARD_DAY_HOURS`
//!
//! Per-database state such as the displayed week lives in the `settings`
//! table, not here.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wh_core::STANDARD_DAY_HOURS;

/// Resolved configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite file holding work entries and settings.
    pub database_path: PathBuf,
    /// Length of a standard working day in hours.
    ///
    /// Credited to whole-day periods and used as the extra-hours threshold.
    pub standard_day_hours: f64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("work_hours.db"),
            standard_day_hours: STANDARD_DAY_HOURS,
        }
    }
}

impl Config {
    /// Loads configuration, layering `config_path` above the default file.
    ///
    /// Missing files are skipped; a malformed file or a non-numeric
    /// `WH_STANDARD_DAY_HOURS` is an error.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("WH_"));

        figment.extract()
    }
}

/// Directory searched for `config.toml`.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wh"))
}

/// Directory holding the default database, `~/.local/share/wh` on Linux.
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("wh"))
}
