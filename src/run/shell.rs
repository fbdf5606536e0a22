use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use shell_words::split;
use tracing::debug;

use super::{commands, dispatch, output, present, Session};
use crate::error::TrackerError;
use crate::ui::util::format_amount;

const PROMPT: &str = "expense-tracker> ";

pub(crate) fn run(session: &mut Session) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    banner(session);

    while session.running {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                handle_line(session, trimmed);
            }
            Err(ReadlineError::Interrupted) => {
                output::warning("Interrupted by user.");
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Errors are reported and swallowed so the shell keeps going.
fn handle_line(session: &mut Session, line: &str) {
    let words = match split(line) {
        Ok(words) => words,
        Err(err) => {
            output::warning(&format!("Could not parse input: {err}"));
            return;
        }
    };
    debug!(command = words.first().map(String::as_str), "shell command");

    let result = dispatch(&words, session).and_then(|reply| present(reply, session));
    if let Err(err) = result {
        let user_error = err
            .downcast_ref::<TrackerError>()
            .is_some_and(|e| e.is_validation() || e.is_not_found());
        if user_error {
            output::warning(&err.to_string());
        } else {
            output::error(&format!("{err:#}"));
        }
    }
}

fn banner(session: &Session) {
    output::heading("Expense Tracker");
    output::plain(&format!(
        "Your personal finance tool. {} commands available; type 'help' to list them.",
        commands::command_names().len()
    ));
    let count = session.manager.db().transaction_count();
    match (count, session.manager.balance()) {
        (Ok(0), _) => output::plain("No transactions recorded yet."),
        (Ok(n), Ok(balance)) => output::plain(&format!(
            "{n} transaction(s) on record, balance {}.",
            format_amount(balance)
        )),
        (Err(err), _) | (_, Err(err)) => debug!(%err, "could not read totals for banner"),
    }
}
