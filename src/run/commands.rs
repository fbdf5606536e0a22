use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::Session;
use crate::analytics::{
    alert_summary, category_trends, forecast, savings_rate, search_by_amount_range,
    search_by_category_and_date, search_by_description, search_by_pattern,
};
use crate::models::{parse_date, today, ExpenseCategory, Frequency, TransactionKind, INCOME_CATEGORY};
use crate::error::TrackerError;
use crate::recurring::RecurringManager;
use crate::report;
use crate::tracker::parse_category;
use crate::ui::util::format_amount;

const DEFAULT_FORECAST_MONTHS: u32 = 3;
const MAX_FORECAST_MONTHS: u32 = 36;

/// What a command produced. The caller decides how to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reply {
    Text(String),
    Success(String),
    Warning(String),
    Chart,
    Clear,
    Exit,
}

type Handler = fn(&[String], &mut Session) -> Result<Reply>;

pub(crate) struct Command {
    pub(crate) group: &'static str,
    pub(crate) usage: &'static str,
    pub(crate) description: &'static str,
    pub(crate) run: Handler,
}

macro_rules! register_command {
    ($name:expr, $group:expr, $usage:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                group: $group,
                usage: $usage,
                description: $desc,
                run: $func,
            },
        );
    }};
}

const GROUPS: [&str; 6] = [
    "Transactions",
    "Reports",
    "Budgets",
    "Recurring",
    "Search & Analytics",
    "Utility",
];

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    // ── Transactions
    register_command!(
        "add-income",
        "Transactions",
        "add-income <amount> <description>",
        "Record income, e.g. add-income 3000 \"Monthly salary\"",
        cmd_add_income,
        r
    );
    register_command!(
        "add-expense",
        "Transactions",
        "add-expense <amount> <category> <description>",
        "Record an expense, e.g. add-expense 50 Food Groceries",
        cmd_add_expense,
        r
    );
    register_command!("list-all", "Transactions", "list-all", "List all transactions", cmd_list_all, r);
    register_command!(
        "list-income",
        "Transactions",
        "list-income",
        "List income only",
        cmd_list_income,
        r
    );
    register_command!(
        "list-expenses",
        "Transactions",
        "list-expenses",
        "List expenses only",
        cmd_list_expenses,
        r
    );
    register_command!(
        "list-category",
        "Transactions",
        "list-category <category>",
        "List expenses in one category",
        cmd_list_category,
        r
    );
    register_command!(
        "delete",
        "Transactions",
        "delete <id>",
        "Delete a transaction by id",
        cmd_delete,
        r
    );
    register_command!(
        "import-csv",
        "Transactions",
        "import-csv <file>",
        "Add the rows of a file written by export-csv",
        cmd_import_csv,
        r
    );

    // ── Reports
    register_command!("summary", "Reports", "summary", "Income, expenses and balance", cmd_summary, r);
    register_command!(
        "detailed-report",
        "Reports",
        "detailed-report",
        "Every transaction in a table",
        cmd_detailed_report,
        r
    );
    register_command!(
        "category-report",
        "Reports",
        "category-report",
        "Expenses by category with share of total",
        cmd_category_report,
        r
    );
    register_command!(
        "monthly-report",
        "Reports",
        "monthly-report",
        "Income, expenses and balance per month",
        cmd_monthly_report,
        r
    );
    register_command!(
        "filter-date",
        "Reports",
        "filter-date <start> <end>",
        "Transactions between two dates (YYYY-MM-DD), inclusive",
        cmd_filter_date,
        r
    );
    register_command!(
        "filter-category",
        "Reports",
        "filter-category <category> <start> <end>",
        "Expenses in one category between two dates, inclusive",
        cmd_filter_category,
        r
    );
    register_command!(
        "visualize",
        "Reports",
        "visualize",
        "Show charts in the terminal",
        cmd_visualize,
        r
    );
    register_command!(
        "export-csv",
        "Reports",
        "export-csv <file>",
        "Export all transactions to CSV",
        cmd_export_csv,
        r
    );
    register_command!(
        "export-pdf",
        "Reports",
        "export-pdf <file>",
        "Export a PDF report",
        cmd_export_pdf,
        r
    );

    // ── Budgets
    register_command!(
        "set-budget",
        "Budgets",
        "set-budget <category> <amount>",
        "Set or replace a category budget",
        cmd_set_budget,
        r
    );
    register_command!(
        "budget-report",
        "Budgets",
        "budget-report",
        "Budget vs spending per category",
        cmd_budget_report,
        r
    );
    register_command!(
        "alerts",
        "Budgets",
        "alerts",
        "Budgets at or over the alert threshold",
        cmd_alerts,
        r
    );

    // ── Recurring
    register_command!(
        "add-recurring",
        "Recurring",
        "add-recurring <amount> <category|income> <frequency> <description>",
        "Add a daily, weekly, monthly or yearly template starting today",
        cmd_add_recurring,
        r
    );
    register_command!(
        "list-recurring",
        "Recurring",
        "list-recurring",
        "List recurring templates",
        cmd_list_recurring,
        r
    );
    register_command!(
        "delete-recurring",
        "Recurring",
        "delete-recurring <id>",
        "Delete a recurring template",
        cmd_delete_recurring,
        r
    );
    register_command!(
        "apply-recurring",
        "Recurring",
        "apply-recurring",
        "Record every occurrence due up to today",
        cmd_apply_recurring,
        r
    );

    // ── Search & Analytics
    register_command!(
        "search",
        "Search & Analytics",
        "search <text>",
        "Transactions whose description contains the text",
        cmd_search,
        r
    );
    register_command!(
        "search-regex",
        "Search & Analytics",
        "search-regex <pattern>",
        "Transactions whose description or category matches a regex",
        cmd_search_regex,
        r
    );
    register_command!(
        "search-amount",
        "Search & Analytics",
        "search-amount <min> <max>",
        "Transactions with an amount in the range, inclusive",
        cmd_search_amount,
        r
    );
    register_command!(
        "analytics",
        "Search & Analytics",
        "analytics",
        "Savings rate, top category and forecast",
        cmd_analytics,
        r
    );
    register_command!(
        "forecast",
        "Search & Analytics",
        "forecast [months]",
        "Projected spending for the coming months",
        cmd_forecast,
        r
    );

    // ── Utility
    register_command!("categories", "Utility", "categories", "List expense categories", cmd_categories, r);
    register_command!("help", "Utility", "help", "Show this help", cmd_help, r);
    register_command!("clear", "Utility", "clear", "Clear the screen", cmd_clear, r);
    register_command!("exit", "Utility", "exit", "Leave the shell", cmd_exit, r);
    register_command!("quit", "Utility", "quit", "Leave the shell", cmd_exit, r);

    r
});

/// Run the command named by `words[0]` with the remaining words as
/// arguments. Unknown names fail with a closest-match suggestion.
pub(crate) fn dispatch(words: &[String], session: &mut Session) -> Result<Reply> {
    let Some((name, args)) = words.split_first() else {
        return Ok(Reply::Text(String::new()));
    };
    let name = name.to_lowercase();

    match COMMANDS.get(name.as_str()) {
        Some(cmd) => (cmd.run)(args, session),
        None => {
            let suggestion = find_closest(&name);
            Err(invalid(format!(
                "Unknown command: {name}. Did you mean '{suggestion}'? Type 'help' for the command list."
            )))
        }
    }
}

pub(crate) fn command_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = COMMANDS.keys().copied().collect();
    names.sort_unstable();
    names
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Argument parsing ─────────────────────────────────────────

/// Bad user input, reported the same way as the engine's validation errors.
fn invalid(msg: impl Into<String>) -> anyhow::Error {
    TrackerError::validation(msg).into()
}

fn usage(name: &str) -> anyhow::Error {
    match COMMANDS.get(name) {
        Some(cmd) => invalid(format!("Usage: {}", cmd.usage)),
        None => invalid(format!("Invalid arguments for {name}")),
    }
}

fn require<'a>(args: &'a [String], min: usize, name: &str) -> Result<&'a [String]> {
    if args.len() < min {
        return Err(usage(name));
    }
    Ok(args)
}

fn parse_amount(raw: &str, name: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim())
        .map_err(|_| invalid(format!("Invalid amount '{raw}'. {}", usage(name))))
}

fn parse_id(raw: &str, name: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| invalid(format!("Invalid id '{raw}'. {}", usage(name))))
}

fn parse_day(raw: &str, name: &str) -> Result<NaiveDate> {
    parse_date(raw).ok_or_else(|| {
        invalid(format!(
            "Invalid date '{raw}', expected YYYY-MM-DD. {}",
            usage(name)
        ))
    })
}

fn rest(args: &[String]) -> String {
    args.join(" ")
}

// ── Transactions ─────────────────────────────────────────────

fn cmd_add_income(args: &[String], session: &mut Session) -> Result<Reply> {
    let args = require(args, 2, "add-income")?;
    let amount = parse_amount(&args[0], "add-income")?;
    let id = session.manager.add_income(amount, &rest(&args[1..]), None)?;
    Ok(Reply::Success(format!(
        "Income of {} added (ID {id})",
        format_amount(amount)
    )))
}

fn cmd_add_expense(args: &[String], session: &mut Session) -> Result<Reply> {
    let args = require(args, 3, "add-expense")?;
    let amount = parse_amount(&args[0], "add-expense")?;
    let id = session
        .manager
        .add_expense(amount, &args[1], &rest(&args[2..]), None)?;
    Ok(Reply::Success(format!(
        "Expense of {} added (ID {id})",
        format_amount(amount)
    )))
}

fn cmd_list_all(_args: &[String], session: &mut Session) -> Result<Reply> {
    Ok(Reply::Text(report::detailed_report(
        &session.manager.all_transactions()?,
    )))
}

fn cmd_list_income(_args: &[String], session: &mut Session) -> Result<Reply> {
    Ok(Reply::Text(report::detailed_report(&session.manager.income()?)))
}

fn cmd_list_expenses(_args: &[String], session: &mut Session) -> Result<Reply> {
    Ok(Reply::Text(report::detailed_report(
        &session.manager.expenses()?,
    )))
}

fn cmd_list_category(args: &[String], session: &mut Session) -> Result<Reply> {
    let args = require(args, 1, "list-category")?;
    Ok(Reply::Text(report::detailed_report(
        &session.manager.expenses_in_category(&args[0])?,
    )))
}

fn cmd_delete(args: &[String], session: &mut Session) -> Result<Reply> {
    let args = require(args, 1, "delete")?;
    let id = parse_id(&args[0], "delete")?;
    session.manager.delete_transaction(id)?;
    Ok(Reply::Success(format!("Transaction {id} deleted")))
}

fn cmd_import_csv(args: &[String], session: &mut Session) -> Result<Reply> {
    let args = require(args, 1, "import-csv")?;
    let path = Path::new(&args[0]);
    if !path.exists() {
        return Err(invalid(format!("File not found: {}", args[0])));
    }
    let rows = report::read_csv(path)?;
    let count = session.manager.import_transactions(rows)?;
    Ok(Reply::Success(format!(
        "Imported {count} transaction(s) from {}",
        args[0]
    )))
}

// ── Reports ──────────────────────────────────────────────────

fn cmd_summary(_args: &[String], session: &mut Session) -> Result<Reply> {
    let em = &session.manager;
    Ok(Reply::Text(report::summary_report(
        em.total_income()?,
        em.total_expenses()?,
    )))
}

fn cmd_detailed_report(args: &[String], session: &mut Session) -> Result<Reply> {
    cmd_list_all(args, session)
}

fn cmd_category_report(_args: &[String], session: &mut Session) -> Result<Reply> {
    Ok(Reply::Text(report::category_report(
        &session.manager.category_summary()?,
    )?))
}

fn cmd_monthly_report(_args: &[String], session: &mut Session) -> Result<Reply> {
    Ok(Reply::Text(report::monthly_report(
        &session.manager.monthly_summary()?,
    )))
}

fn cmd_filter_date(args: &[String], session: &mut Session) -> Result<Reply> {
    let args = require(args, 2, "filter-date")?;
    let start = parse_day(&args[0], "filter-date")?;
    let end = parse_day(&args[1], "filter-date")?;
    Ok(Reply::Text(report::detailed_report(
        &session.manager.transactions_between(start, end)?,
    )))
}

fn cmd_filter_category(args: &[String], session: &mut Session) -> Result<Reply> {
    let args = require(args, 3, "filter-category")?;
    let category = parse_category(&args[0])?;
    let start = parse_day(&args[1], "filter-category")?;
    let end = parse_day(&args[2], "filter-category")?;
    if start > end {
        return Err(invalid(format!(
            "Start date {start} is after end date {end}"
        )));
    }
    let hits = search_by_category_and_date(&session.manager.expenses()?, category.as_str(), start, end);
    Ok(Reply::Text(report::detailed_report(&hits)))
}

fn cmd_visualize(_args: &[String], _session: &mut Session) -> Result<Reply> {
    Ok(Reply::Chart)
}

fn cmd_export_csv(args: &[String], session: &mut Session) -> Result<Reply> {
    let args = require(args, 1, "export-csv")?;
    let count = report::export_csv(Path::new(&args[0]), &session.manager.all_transactions()?)?;
    Ok(Reply::Success(format!(
        "Exported {count} transaction(s) to {}",
        args[0]
    )))
}

fn cmd_export_pdf(args: &[String], _session: &mut Session) -> Result<Reply> {
    let args = require(args, 1, "export-pdf")?;
    report::export_pdf(Path::new(&args[0]))?;
    Ok(Reply::Success(format!("PDF report exported to {}", args[0])))
}

// ── Budgets ──────────────────────────────────────────────────

fn cmd_set_budget(args: &[String], session: &mut Session) -> Result<Reply> {
    let args = require(args, 2, "set-budget")?;
    let amount = parse_amount(&args[1], "set-budget")?;
    let previous = session.manager.get_budget(&args[0])?;
    session.manager.set_budget(&args[0], amount)?;
    let name = ExpenseCategory::parse(&args[0])
        .map(|c| c.as_str())
        .unwrap_or(args[0].as_str());
    let mut msg = format!("Budget for {name} set to {}", format_amount(amount));
    if let Some(old) = previous {
        msg.push_str(&format!(" (was {})", format_amount(old)));
    }
    Ok(Reply::Success(msg))
}

fn cmd_budget_report(_args: &[String], session: &mut Session) -> Result<Reply> {
    Ok(Reply::Text(report::budget_report(
        &session.manager.budget_status()?,
    )))
}

fn cmd_alerts(_args: &[String], session: &mut Session) -> Result<Reply> {
    let status = session.manager.budget_status()?;
    let summary = alert_summary(&status, session.alert_threshold);
    if summary.alerts.is_empty() {
        return Ok(Reply::Success("All budgets are below the alert threshold".into()));
    }
    Ok(Reply::Text(report::alerts_report(&summary)))
}

// ── Recurring ────────────────────────────────────────────────

fn cmd_add_recurring(args: &[String], session: &mut Session) -> Result<Reply> {
    let args = require(args, 4, "add-recurring")?;
    let amount = parse_amount(&args[0], "add-recurring")?;
    let kind = if args[1].eq_ignore_ascii_case("income")
        || args[1].eq_ignore_ascii_case(INCOME_CATEGORY)
    {
        TransactionKind::Income
    } else {
        TransactionKind::Expense
    };
    let frequency = Frequency::parse(&args[2]).ok_or_else(|| {
        let names: Vec<&str> = Frequency::all().iter().map(|f| f.as_str()).collect();
        invalid(format!(
            "Invalid frequency '{}'. Valid frequencies: {}",
            args[2],
            names.join(", ")
        ))
    })?;

    let rm = RecurringManager::new(session.manager.db_mut());
    let id = rm.add(kind, amount, &args[1], &rest(&args[3..]), frequency, None)?;
    Ok(Reply::Success(format!(
        "Recurring {kind} of {} every {} added (ID {id})",
        format_amount(amount),
        frequency_noun(frequency)
    )))
}

fn frequency_noun(frequency: Frequency) -> &'static str {
    match frequency {
        Frequency::Daily => "day",
        Frequency::Weekly => "week",
        Frequency::Monthly => "month",
        Frequency::Yearly => "year",
    }
}

fn cmd_list_recurring(_args: &[String], session: &mut Session) -> Result<Reply> {
    let rm = RecurringManager::new(session.manager.db_mut());
    Ok(Reply::Text(report::recurring_report(&rm.list()?)))
}

fn cmd_delete_recurring(args: &[String], session: &mut Session) -> Result<Reply> {
    let args = require(args, 1, "delete-recurring")?;
    let id = parse_id(&args[0], "delete-recurring")?;
    RecurringManager::new(session.manager.db_mut()).delete(id)?;
    Ok(Reply::Success(format!("Recurring transaction {id} deleted")))
}

fn cmd_apply_recurring(_args: &[String], session: &mut Session) -> Result<Reply> {
    let count = RecurringManager::new(session.manager.db_mut()).apply_due(today())?;
    if count == 0 {
        return Ok(Reply::Warning("No recurring transactions due".into()));
    }
    Ok(Reply::Success(format!(
        "Applied {count} recurring transaction(s)"
    )))
}

// ── Search & Analytics ───────────────────────────────────────

fn cmd_search(args: &[String], session: &mut Session) -> Result<Reply> {
    let args = require(args, 1, "search")?;
    let hits = search_by_description(&session.manager.all_transactions()?, &rest(args));
    Ok(Reply::Text(report::detailed_report(&hits)))
}

fn cmd_search_regex(args: &[String], session: &mut Session) -> Result<Reply> {
    let args = require(args, 1, "search-regex")?;
    let hits = search_by_pattern(&session.manager.all_transactions()?, &rest(args))?;
    Ok(Reply::Text(report::detailed_report(&hits)))
}

fn cmd_search_amount(args: &[String], session: &mut Session) -> Result<Reply> {
    let args = require(args, 2, "search-amount")?;
    let min = parse_amount(&args[0], "search-amount")?;
    let max = parse_amount(&args[1], "search-amount")?;
    if min > max {
        return Err(invalid(format!(
            "Minimum {min} is greater than maximum {max}"
        )));
    }
    let hits = search_by_amount_range(&session.manager.all_transactions()?, min, max);
    Ok(Reply::Text(report::detailed_report(&hits)))
}

fn cmd_analytics(_args: &[String], session: &mut Session) -> Result<Reply> {
    let em = &session.manager;
    let monthly = em.monthly_summary()?;
    let rate = savings_rate(em.total_income()?, em.total_expenses()?)?;
    let trends = category_trends(&em.category_summary()?, &monthly)?;
    let projected = forecast(&monthly, DEFAULT_FORECAST_MONTHS, today())?;
    Ok(Reply::Text(report::analytics_report(rate, &trends, &projected)))
}

fn cmd_forecast(args: &[String], session: &mut Session) -> Result<Reply> {
    let months = match args.first() {
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) if (1..=MAX_FORECAST_MONTHS).contains(&n) => n,
            _ => {
                return Err(invalid(format!(
                    "Months must be between 1 and {MAX_FORECAST_MONTHS}. {}",
                    usage("forecast")
                )))
            }
        },
        None => DEFAULT_FORECAST_MONTHS,
    };
    let monthly = session.manager.monthly_summary()?;
    Ok(Reply::Text(report::forecast_report(&forecast(
        &monthly,
        months,
        today(),
    )?)))
}

// ── Utility ──────────────────────────────────────────────────

fn cmd_categories(_args: &[String], _session: &mut Session) -> Result<Reply> {
    let mut lines = vec!["Available expense categories:".to_string()];
    for (i, cat) in ExpenseCategory::all().iter().enumerate() {
        lines.push(format!("  {}. {cat}", i + 1));
    }
    Ok(Reply::Text(lines.join("\n")))
}

fn cmd_help(_args: &[String], _session: &mut Session) -> Result<Reply> {
    Ok(Reply::Text(help_text()))
}

pub(crate) fn help_text() -> String {
    let mut lines = vec!["Available commands:".to_string()];
    for group in GROUPS {
        let mut entries: Vec<&Command> = COMMANDS.values().filter(|c| c.group == group).collect();
        entries.sort_by_key(|c| c.usage);
        lines.push(String::new());
        lines.push(format!("{group}:"));
        for cmd in entries {
            lines.push(format!("  {:<44} {}", cmd.usage, cmd.description));
        }
    }
    lines.push(String::new());
    lines.push(format!("Categories: {}", ExpenseCategory::names()));
    lines.join("\n")
}

fn cmd_clear(_args: &[String], _session: &mut Session) -> Result<Reply> {
    Ok(Reply::Clear)
}

fn cmd_exit(_args: &[String], _session: &mut Session) -> Result<Reply> {
    Ok(Reply::Exit)
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
