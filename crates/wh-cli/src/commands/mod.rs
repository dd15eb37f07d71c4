//! CLI subcommand implementations.

pub mod add;
pub mod delete;
pub mod list;
pub mod setting;
pub mod update;
pub mod util;
pub mod week;
