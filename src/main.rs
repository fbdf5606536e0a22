mod analytics;
mod config;
mod db;
mod error;
mod logging;
mod models;
mod recurring;
mod report;
mod run;
mod tracker;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use config::{Cli, Config};
use run::Session;
use tracker::ExpenseManager;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::from_cli(&cli)?;

    let db = db::Database::open(&config.db_path)
        .with_context(|| format!("Failed to open database: {}", config.db_path.display()))?;

    debug!(threshold = %config.alert_threshold, "configuration loaded");

    let mut session = Session::new(ExpenseManager::new(db), config.alert_threshold);
    let result = if cli.command.is_empty() {
        run::as_shell(&mut session)
    } else {
        run::as_cli(&cli.command, &mut session)
    };

    session.close()?;
    result
}
