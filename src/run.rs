mod commands;
mod output;
mod shell;

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::tracker::ExpenseManager;
use crate::ui::charts::{self, ChartData};

pub(crate) use commands::{dispatch, Reply};

/// State shared by every command for the life of the process.
pub(crate) struct Session {
    pub(crate) manager: ExpenseManager,
    pub(crate) alert_threshold: Decimal,
    pub(crate) running: bool,
}

impl Session {
    pub(crate) fn new(manager: ExpenseManager, alert_threshold: Decimal) -> Self {
        Self {
            manager,
            alert_threshold,
            running: true,
        }
    }

    pub(crate) fn close(self) -> Result<()> {
        self.manager.close().context("Failed to close the database")
    }
}

/// Run a single command given on the process command line.
pub(crate) fn as_cli(words: &[String], session: &mut Session) -> Result<()> {
    let reply = dispatch(words, session)?;
    present(reply, session)
}

/// Interactive read-eval-print loop.
pub(crate) fn as_shell(session: &mut Session) -> Result<()> {
    shell::run(session)
}

fn present(reply: Reply, session: &mut Session) -> Result<()> {
    match reply {
        Reply::Text(text) => output::plain(&text),
        Reply::Success(msg) => output::success(&msg),
        Reply::Warning(msg) => output::warning(&msg),
        Reply::Chart => show_charts(session)?,
        Reply::Clear => output::clear_screen(),
        Reply::Exit => {
            session.running = false;
            output::success("Thank you for using Expense Tracker!");
        }
    }
    Ok(())
}

fn show_charts(session: &Session) -> Result<()> {
    let data = ChartData::load(&session.manager)?;
    if data.is_empty() {
        output::warning("No data to visualize yet.");
        return Ok(());
    }
    charts::show(&data).context("Failed to draw charts")
}
