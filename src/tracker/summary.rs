//! Pure aggregation over transaction slices. Nothing here touches the store.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use crate::error::{Result, TrackerError};
use crate::models::{Budget, Transaction, TransactionKind};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryTotal {
    pub(crate) category: String,
    pub(crate) amount: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthlyTotal {
    /// "YYYY-MM"
    pub(crate) month: String,
    pub(crate) income: Decimal,
    pub(crate) expenses: Decimal,
}

impl MonthlyTotal {
    pub(crate) fn balance(&self) -> Decimal {
        self.income - self.expenses
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BudgetStatus {
    pub(crate) category: String,
    pub(crate) budget: Decimal,
    pub(crate) spent: Decimal,
    pub(crate) remaining: Decimal,
    /// spent / budget * 100, or 0 for a zero budget.
    pub(crate) percentage: Decimal,
}

/// Overflow-checked sum. `what` names the figure in the error.
pub(crate) fn checked_sum(
    amounts: impl IntoIterator<Item = Decimal>,
    what: &'static str,
) -> Result<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount).ok_or(TrackerError::Overflow(what))
    })
}

pub(crate) fn total_for(transactions: &[Transaction], kind: TransactionKind) -> Result<Decimal> {
    checked_sum(
        transactions
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount),
        "total",
    )
}

/// Expense totals per category, largest first. Equal totals keep the order in
/// which their category was first seen.
pub(crate) fn category_summary(transactions: &[Transaction]) -> Result<Vec<CategoryTotal>> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for txn in transactions.iter().filter(|t| t.is_expense()) {
        match index.get(txn.category.as_str()) {
            Some(&i) => {
                totals[i].amount = totals[i]
                    .amount
                    .checked_add(txn.amount)
                    .ok_or(TrackerError::Overflow("category total"))?;
            }
            None => {
                index.insert(&txn.category, totals.len());
                totals.push(CategoryTotal {
                    category: txn.category.clone(),
                    amount: txn.amount,
                });
            }
        }
    }

    // sort_by is stable
    totals.sort_by(|a, b| b.amount.cmp(&a.amount));
    Ok(totals)
}

/// Income and expense sums per year-month, oldest month first.
pub(crate) fn monthly_summary(transactions: &[Transaction]) -> Result<Vec<MonthlyTotal>> {
    let mut months: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();

    for txn in transactions {
        let entry = months.entry(txn.month_key()).or_default();
        let slot = match txn.kind {
            TransactionKind::Income => &mut entry.0,
            TransactionKind::Expense => &mut entry.1,
        };
        *slot = slot
            .checked_add(txn.amount)
            .ok_or(TrackerError::Overflow("monthly total"))?;
    }

    Ok(months
        .into_iter()
        .map(|(month, (income, expenses))| MonthlyTotal {
            month,
            income,
            expenses,
        })
        .collect())
}

/// One entry per budget, in budget order. Categories without a budget are
/// left out; budgets without spending report `spent = 0`.
pub(crate) fn budget_status(
    budgets: &[Budget],
    spending: &[CategoryTotal],
) -> Result<Vec<BudgetStatus>> {
    budgets
        .iter()
        .map(|budget| {
            let spent = find_total(spending, &budget.category).map_or(Decimal::ZERO, |c| c.amount);
            Ok(BudgetStatus {
                category: budget.category.clone(),
                budget: budget.amount,
                spent,
                remaining: budget
                    .amount
                    .checked_sub(spent)
                    .ok_or(TrackerError::Overflow("budget remaining"))?,
                percentage: percentage_of(spent, budget.amount)?,
            })
        })
        .collect()
}

pub(crate) fn find_total<'a>(totals: &'a [CategoryTotal], category: &str) -> Option<&'a CategoryTotal> {
    totals.iter().find(|c| c.category == category)
}

/// `part / whole * 100`, or zero when `whole` is zero.
pub(crate) fn percentage_of(part: Decimal, whole: Decimal) -> Result<Decimal> {
    if whole.is_zero() {
        return Ok(Decimal::ZERO);
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .ok_or(TrackerError::Overflow("percentage"))
}
