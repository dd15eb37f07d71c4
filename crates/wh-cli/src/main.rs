use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wh_cli::commands::{add, delete, list, setting, update, week};
use wh_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(wh_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = wh_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init so a second initialization is not fatal
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let today = Local::now().date_naive();
    let mut stdout = std::io::stdout().lock();

    match command {
        Commands::Add(args) => {
            add::run(&mut stdout, &mut db, args, config.standard_day_hours, today)?;
        }
        Commands::Update(args) => {
            update::run(&mut stdout, &mut db, args, config.standard_day_hours)?;
        }
        Commands::Delete(args) => delete::run(&mut stdout, &mut db, args)?,
        Commands::List(args) => list::run(&db, args, today)?,
        Commands::Week(args) => week::run(&mut db, args, config.standard_day_hours, today)?,
        Commands::Setting(action) => setting::run(&mut stdout, &mut db, action)?,
    }

    Ok(())
}
