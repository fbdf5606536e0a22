use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use rust_decimal::Decimal;

pub(crate) const DEFAULT_ALERT_THRESHOLD: Decimal = Decimal::from_parts(80, 0, 0, false, 2);

#[derive(Debug, Parser)]
#[command(
    name = "expense-tracker",
    version,
    about = "Track income, expenses and budgets from the terminal",
    after_help = "Run without a command to start the interactive shell. Type 'help' inside it for the command list."
)]
pub(crate) struct Cli {
    /// SQLite database file (default: platform data directory)
    #[arg(long, env = "EXPENSE_TRACKER_DB", value_name = "PATH")]
    pub(crate) db: Option<PathBuf>,

    /// Budget usage ratio that raises a warning, e.g. 0.8
    #[arg(
        long,
        env = "EXPENSE_TRACKER_ALERT_THRESHOLD",
        value_name = "RATIO",
        value_parser = parse_threshold
    )]
    pub(crate) alert_threshold: Option<Decimal>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub(crate) verbose: u8,

    /// Command to run once, e.g. `add-expense 12.50 Food "Lunch"`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub(crate) command: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) db_path: PathBuf,
    pub(crate) alert_threshold: Decimal,
}

impl Config {
    pub(crate) fn from_cli(cli: &Cli) -> Result<Self> {
        let db_path = match &cli.db {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create directory: {}", parent.display())
                    })?;
                }
                path.clone()
            }
            None => default_db_path()?,
        };

        Ok(Self {
            db_path,
            alert_threshold: cli.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD),
        })
    }
}

fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "expense-tracker", "ExpenseTracker")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("expenses.db"))
}

fn parse_threshold(s: &str) -> std::result::Result<Decimal, String> {
    let value = Decimal::from_str(s.trim()).map_err(|e| format!("'{s}' is not a number: {e}"))?;
    if value <= Decimal::ZERO {
        return Err("threshold must be greater than 0".into());
    }
    Ok(value)
}
