mod summary;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::db::Database;
use crate::error::{Result, TrackerError};
use crate::models::{Budget, ExpenseCategory, Transaction, TransactionKind, INCOME_CATEGORY};

pub(crate) use summary::{
    budget_status, category_summary, checked_sum, find_total, monthly_summary, percentage_of,
    total_for, BudgetStatus, CategoryTotal, MonthlyTotal,
};

/// Records income, expenses and budgets, and derives the summaries every
/// report is built from. Owns the store handle for the life of the process.
pub(crate) struct ExpenseManager {
    db: Database,
}

impl ExpenseManager {
    pub(crate) fn new(db: Database) -> Self {
        Self { db }
    }

    pub(crate) fn db(&self) -> &Database {
        &self.db
    }

    pub(crate) fn db_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    pub(crate) fn close(self) -> Result<()> {
        self.db.close()
    }

    // ── Recording ─────────────────────────────────────────────

    pub(crate) fn add_income(
        &self,
        amount: Decimal,
        description: &str,
        date: Option<NaiveDate>,
    ) -> Result<i64> {
        ensure_valid_amount(amount, "Amount")?;
        let txn = Transaction::new_income(amount, description.to_string(), date);
        let id = self.db.insert_transaction(&txn)?;
        info!(id, %amount, "income added");
        Ok(id)
    }

    pub(crate) fn add_expense(
        &self,
        amount: Decimal,
        category: &str,
        description: &str,
        date: Option<NaiveDate>,
    ) -> Result<i64> {
        ensure_valid_amount(amount, "Amount")?;
        let category = parse_category(category)?;
        let txn = Transaction::new_expense(amount, category, description.to_string(), date);
        let id = self.db.insert_transaction(&txn)?;
        info!(id, %amount, %category, "expense added");
        Ok(id)
    }

    /// Insert previously exported rows as new transactions. Every row is
    /// validated first; one bad row rejects the whole batch.
    pub(crate) fn import_transactions(&mut self, rows: Vec<Transaction>) -> Result<usize> {
        let mut checked = Vec::with_capacity(rows.len());
        for row in rows {
            ensure_valid_amount(row.amount, "Amount")?;
            let category = match row.kind {
                TransactionKind::Income => INCOME_CATEGORY.to_string(),
                TransactionKind::Expense => parse_category(&row.category)?.as_str().to_string(),
            };
            checked.push(Transaction::new(
                row.kind,
                row.amount,
                category,
                row.description,
                Some(row.date),
            ));
        }
        let count = self.db.insert_transactions_batch(&checked)?;
        info!(count, "transactions imported");
        Ok(count)
    }

    /// Fails with `NotFound` when the id does not exist; nothing is changed.
    pub(crate) fn delete_transaction(&self, id: i64) -> Result<()> {
        if self.db.delete_transaction(id)? {
            info!(id, "transaction deleted");
            Ok(())
        } else {
            warn!(id, "delete of unknown transaction");
            Err(TrackerError::transaction_not_found(id))
        }
    }

    pub(crate) fn set_budget(&self, category: &str, amount: Decimal) -> Result<()> {
        ensure_valid_amount(amount, "Budget amount")?;
        let category = parse_category(category)?;
        self.db
            .upsert_budget(&Budget::new(category.as_str().to_string(), amount))?;
        info!(%category, %amount, "budget set");
        Ok(())
    }

    pub(crate) fn get_budget(&self, category: &str) -> Result<Option<Decimal>> {
        let name = ExpenseCategory::parse(category)
            .map(|c| c.as_str().to_string())
            .unwrap_or_else(|| category.to_string());
        self.db.get_budget(&name)
    }

    // ── Queries ───────────────────────────────────────────────

    pub(crate) fn all_transactions(&self) -> Result<Vec<Transaction>> {
        self.db.list_all()
    }

    pub(crate) fn income(&self) -> Result<Vec<Transaction>> {
        self.db.list_by_kind(TransactionKind::Income)
    }

    pub(crate) fn expenses(&self) -> Result<Vec<Transaction>> {
        self.db.list_by_kind(TransactionKind::Expense)
    }

    pub(crate) fn transactions_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        if start > end {
            return Err(TrackerError::validation(format!(
                "Start date {start} is after end date {end}"
            )));
        }
        self.db.list_by_date_range(start, end)
    }

    pub(crate) fn expenses_in_category(&self, category: &str) -> Result<Vec<Transaction>> {
        let category = parse_category(category)?;
        Ok(self
            .db
            .list_by_category(category.as_str())?
            .into_iter()
            .filter(|t| t.is_expense())
            .collect())
    }

    // ── Aggregates ────────────────────────────────────────────

    pub(crate) fn total_income(&self) -> Result<Decimal> {
        total_for(&self.income()?, TransactionKind::Income)
    }

    pub(crate) fn total_expenses(&self) -> Result<Decimal> {
        total_for(&self.expenses()?, TransactionKind::Expense)
    }

    pub(crate) fn balance(&self) -> Result<Decimal> {
        self.total_income()?
            .checked_sub(self.total_expenses()?)
            .ok_or(TrackerError::Overflow("balance"))
    }

    pub(crate) fn category_summary(&self) -> Result<Vec<CategoryTotal>> {
        category_summary(&self.expenses()?)
    }

    pub(crate) fn monthly_summary(&self) -> Result<Vec<MonthlyTotal>> {
        monthly_summary(&self.all_transactions()?)
    }

    pub(crate) fn budget_status(&self) -> Result<Vec<BudgetStatus>> {
        let budgets = self.db.get_budgets()?;
        budget_status(&budgets, &self.category_summary()?)
    }
}

/// Largest amount accepted for a transaction, budget or recurring template.
pub(crate) const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Amounts must be positive, at most [`MAX_AMOUNT`], and whole cents.
pub(crate) fn ensure_valid_amount(amount: Decimal, what: &str) -> Result<()> {
    if amount <= Decimal::ZERO {
        warn!(%amount, "rejected non-positive amount");
        return Err(TrackerError::validation(format!(
            "{what} must be greater than 0"
        )));
    }
    if amount > MAX_AMOUNT {
        warn!(%amount, "rejected oversized amount");
        return Err(TrackerError::validation(format!(
            "{what} must not exceed {MAX_AMOUNT}"
        )));
    }
    if amount.round_dp(2) != amount {
        warn!(%amount, "rejected sub-cent amount");
        return Err(TrackerError::validation(format!(
            "{what} must have at most 2 decimal places"
        )));
    }
    Ok(())
}

pub(crate) fn parse_category(category: &str) -> Result<ExpenseCategory> {
    ExpenseCategory::parse(category).ok_or_else(|| {
        warn!(category, "rejected unknown category");
        TrackerError::InvalidCategory {
            category: category.to_string(),
            valid: ExpenseCategory::names(),
        }
    })
}

#[cfg(test)]
mod tests;
