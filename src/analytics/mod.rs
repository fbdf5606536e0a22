//! Derived views over the tracker's aggregates: budget alerts, savings and
//! trend figures, a naive spending forecast, and transaction search.

mod search;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

use crate::error::{Result, TrackerError};
use crate::tracker::{checked_sum, find_total, percentage_of, BudgetStatus, CategoryTotal, MonthlyTotal};

pub(crate) use search::{
    search_by_amount_range, search_by_category_and_date, search_by_description,
    search_by_pattern,
};

/// Number of most recent months the forecast averages over.
const FORECAST_WINDOW: usize = 3;

// ── Budget alerts ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Severity {
    Warning,
    Critical,
}

impl Severity {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BudgetAlert {
    pub(crate) category: String,
    pub(crate) severity: Severity,
    pub(crate) spent: Decimal,
    pub(crate) budget: Decimal,
    pub(crate) percentage: Decimal,
}

impl BudgetAlert {
    pub(crate) fn message(&self) -> String {
        format!(
            "{}: {:.1}% of budget used",
            self.category,
            self.percentage.round_dp(1)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct AlertSummary {
    pub(crate) warnings: usize,
    pub(crate) critical: usize,
    pub(crate) alerts: Vec<BudgetAlert>,
}

impl AlertSummary {
    pub(crate) fn total(&self) -> usize {
        self.alerts.len()
    }
}

/// Budgets whose usage ratio reached `threshold`. At or above 100% an alert
/// is critical, otherwise it is a warning. Zero budgets never alert.
pub(crate) fn check_alerts(status: &[BudgetStatus], threshold: Decimal) -> Vec<BudgetAlert> {
    status
        .iter()
        .filter(|s| !s.budget.is_zero())
        .filter_map(|s| {
            // a ratio too large to represent is over budget either way
            let ratio = s.spent.checked_div(s.budget).unwrap_or(Decimal::MAX);
            if ratio < threshold {
                return None;
            }
            let severity = if ratio >= Decimal::ONE {
                Severity::Critical
            } else {
                Severity::Warning
            };
            Some(BudgetAlert {
                category: s.category.clone(),
                severity,
                spent: s.spent,
                budget: s.budget,
                percentage: s.percentage,
            })
        })
        .collect()
}

pub(crate) fn alert_summary(status: &[BudgetStatus], threshold: Decimal) -> AlertSummary {
    let alerts = check_alerts(status, threshold);
    let critical = alerts
        .iter()
        .filter(|a| a.severity == Severity::Critical)
        .count();
    AlertSummary {
        warnings: alerts.len() - critical,
        critical,
        alerts,
    }
}

// ── Spending analytics ────────────────────────────────────────

/// Share of income left after expenses, as a percentage to 2 dp. Zero when
/// there is no income.
pub(crate) fn savings_rate(income: Decimal, expenses: Decimal) -> Result<Decimal> {
    let saved = income
        .checked_sub(expenses)
        .ok_or(TrackerError::Overflow("savings rate"))?;
    Ok(percentage_of(saved, income)?.round_dp(2))
}

/// Share of total expenses spent in `category`, as a percentage to 2 dp.
pub(crate) fn category_percentage(category: &str, summary: &[CategoryTotal]) -> Result<Decimal> {
    let total = checked_sum(summary.iter().map(|c| c.amount), "expense total")?;
    let in_category = find_total(summary, category).map_or(Decimal::ZERO, |c| c.amount);
    Ok(percentage_of(in_category, total)?.round_dp(2))
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryTrends {
    pub(crate) total_categories: usize,
    pub(crate) top_category: Option<CategoryTotal>,
    pub(crate) average_monthly_expense: Decimal,
}

/// `summary` is expected largest first, as `category_summary` returns it.
pub(crate) fn category_trends(
    summary: &[CategoryTotal],
    monthly: &[MonthlyTotal],
) -> Result<CategoryTrends> {
    Ok(CategoryTrends {
        total_categories: summary.len(),
        top_category: summary.first().cloned(),
        average_monthly_expense: average_expenses(monthly)?.round_dp(2),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Forecast {
    /// "YYYY-MM"
    pub(crate) month: String,
    pub(crate) amount: Decimal,
}

/// Average of the trailing months' expenses, repeated for each of the next
/// `months` calendar months after `today`'s month. Empty without history.
pub(crate) fn forecast(
    monthly: &[MonthlyTotal],
    months: u32,
    today: NaiveDate,
) -> Result<Vec<Forecast>> {
    if monthly.is_empty() {
        return Ok(Vec::new());
    }
    let recent = &monthly[monthly.len().saturating_sub(FORECAST_WINDOW)..];
    let amount = average_expenses(recent)?.round_dp(2);

    let first_of_month = today.with_day(1).unwrap_or(today);
    Ok((1..=months)
        .map_while(|i| first_of_month.checked_add_months(Months::new(i)))
        .map(|date| Forecast {
            month: date.format("%Y-%m").to_string(),
            amount,
        })
        .collect())
}

fn average_expenses(monthly: &[MonthlyTotal]) -> Result<Decimal> {
    if monthly.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let total = checked_sum(monthly.iter().map(|m| m.expenses), "average expense")?;
    Ok(total / Decimal::from(monthly.len()))
}
