//! Fixed-width text reports. Every function takes already-computed data and
//! returns the rendered text, so the shell decides where it goes.

mod export;

use rust_decimal::Decimal;

use crate::analytics::{category_percentage, AlertSummary, CategoryTrends, Forecast};
use crate::models::{RecurringTransaction, Transaction};
use crate::error::Result;
use crate::tracker::{checked_sum, BudgetStatus, CategoryTotal, MonthlyTotal};
use crate::ui::util::{format_amount, format_percent, truncate};

pub(crate) use export::{export_csv, export_pdf, read_csv, CSV_HEADER};

const RULE_WIDTH: usize = 72;
const DESCRIPTION_WIDTH: usize = 30;

fn rule() -> String {
    "─".repeat(RULE_WIDTH)
}

fn titled(title: &str) -> Vec<String> {
    vec![title.to_string(), rule()]
}

pub(crate) fn summary_report(income: Decimal, expenses: Decimal) -> String {
    let mut lines = titled("Expense Tracker Summary");
    lines.push(format!("  Total Income:    {:>16}", format_amount(income)));
    lines.push(format!("  Total Expenses:  {:>16}", format_amount(expenses)));
    lines.push(format!("  {}", "─".repeat(33)));
    lines.push(format!(
        "  Balance:         {:>16}",
        format_amount(income - expenses)
    ));
    lines.join("\n")
}

/// One row per transaction, in the order given.
pub(crate) fn detailed_report(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions found.".into();
    }

    let mut lines = vec![
        format!(
            "{:<5} {:<10}  {:<8} {:<14} {:>14}  Description",
            "ID", "Date", "Type", "Category", "Amount"
        ),
        rule(),
    ];
    for txn in transactions {
        lines.push(format!(
            "{:<5} {:<10}  {:<8} {:<14} {:>14}  {}",
            txn.id.map(|id| id.to_string()).unwrap_or_default(),
            txn.date.to_string(),
            txn.kind.as_str().to_uppercase(),
            truncate(&txn.category, 14),
            format_amount(txn.amount),
            truncate(&txn.description, DESCRIPTION_WIDTH),
        ));
    }
    lines.push(rule());
    lines.push(format!("{} transaction(s)", transactions.len()));
    lines.join("\n")
}

/// Expense totals with each category's share of all expenses.
pub(crate) fn category_report(summary: &[CategoryTotal]) -> Result<String> {
    if summary.is_empty() {
        return Ok("No expenses found.".into());
    }

    let total = checked_sum(summary.iter().map(|c| c.amount), "expense total")?;
    let mut lines = titled("Expenses by Category");
    lines.push(format!("{:<16} {:>14} {:>10}", "Category", "Amount", "Share"));
    for entry in summary {
        lines.push(format!(
            "{:<16} {:>14} {:>10}",
            entry.category,
            format_amount(entry.amount),
            format_percent(category_percentage(&entry.category, summary)?),
        ));
    }
    lines.push(rule());
    lines.push(format!("{:<16} {:>14}", "Total", format_amount(total)));
    Ok(lines.join("\n"))
}

pub(crate) fn monthly_report(monthly: &[MonthlyTotal]) -> String {
    if monthly.is_empty() {
        return "No transactions found.".into();
    }

    let mut lines = titled("Monthly Summary");
    lines.push(format!(
        "{:<8} {:>14} {:>14} {:>14}",
        "Month", "Income", "Expenses", "Balance"
    ));
    for month in monthly {
        lines.push(format!(
            "{:<8} {:>14} {:>14} {:>14}",
            month.month,
            format_amount(month.income),
            format_amount(month.expenses),
            format_amount(month.balance()),
        ));
    }
    lines.join("\n")
}

pub(crate) fn budget_report(status: &[BudgetStatus]) -> String {
    if status.is_empty() {
        return "No budgets set.".into();
    }

    let mut lines = titled("Budget Status");
    lines.push(format!(
        "{:<16} {:>12} {:>12} {:>12} {:>8}",
        "Category", "Budget", "Spent", "Remaining", "Used"
    ));
    for s in status {
        lines.push(format!(
            "{:<16} {:>12} {:>12} {:>12} {:>8}",
            s.category,
            format_amount(s.budget),
            format_amount(s.spent),
            format_amount(s.remaining),
            format_percent(s.percentage),
        ));
    }
    lines.join("\n")
}

pub(crate) fn alerts_report(summary: &AlertSummary) -> String {
    if summary.alerts.is_empty() {
        return "No budget alerts.".into();
    }

    let mut lines = titled("Budget Alerts");
    for alert in &summary.alerts {
        lines.push(format!(
            "  [{:<8}] {}  ({} of {})",
            alert.severity.as_str().to_uppercase(),
            alert.message(),
            format_amount(alert.spent),
            format_amount(alert.budget),
        ));
    }
    lines.push(rule());
    lines.push(format!(
        "{} alert(s): {} warning, {} critical",
        summary.total(),
        summary.warnings,
        summary.critical
    ));
    lines.join("\n")
}

pub(crate) fn forecast_report(forecast: &[Forecast]) -> String {
    if forecast.is_empty() {
        return "Not enough history to forecast.".into();
    }

    let mut lines = titled("Spending Forecast");
    for entry in forecast {
        lines.push(format!("  {:<8} {:>14}", entry.month, format_amount(entry.amount)));
    }
    lines.join("\n")
}

pub(crate) fn analytics_report(
    savings_rate: Decimal,
    trends: &CategoryTrends,
    forecast: &[Forecast],
) -> String {
    let mut lines = titled("Spending Analytics");
    lines.push(format!("  Savings rate:             {:>10}", format_percent(savings_rate)));
    lines.push(format!(
        "  Expense categories used:  {:>10}",
        trends.total_categories
    ));
    match &trends.top_category {
        Some(top) => lines.push(format!(
            "  Top category:             {} ({})",
            top.category,
            format_amount(top.amount)
        )),
        None => lines.push("  Top category:             -".into()),
    }
    lines.push(format!(
        "  Average monthly expense:  {:>10}",
        format_amount(trends.average_monthly_expense)
    ));
    lines.push(String::new());
    lines.push(forecast_report(forecast));
    lines.join("\n")
}

pub(crate) fn recurring_report(recurring: &[RecurringTransaction]) -> String {
    if recurring.is_empty() {
        return "No recurring transactions.".into();
    }

    let mut lines = vec![
        format!(
            "{:<4} {:<8} {:<8} {:<14} {:>12}  {:<10}  Description",
            "ID", "Type", "Every", "Category", "Amount", "Next due"
        ),
        rule(),
    ];
    for r in recurring {
        lines.push(format!(
            "{:<4} {:<8} {:<8} {:<14} {:>12}  {:<10}  {}",
            r.id.map(|id| id.to_string()).unwrap_or_default(),
            r.kind.as_str(),
            r.frequency.as_str(),
            truncate(&r.category, 14),
            format_amount(r.amount),
            r.next_due().map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
            truncate(&r.description, DESCRIPTION_WIDTH),
        ));
    }
    lines.join("\n")
}
