//! Recurring income and expense templates, materialised into dated
//! transactions on demand.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::{Result, TrackerError};
use crate::models::{
    today, Frequency, RecurringTransaction, Transaction, TransactionKind, INCOME_CATEGORY,
};
use crate::tracker::{ensure_valid_amount, parse_category};

pub(crate) const RECURRING_PREFIX: &str = "[Recurring] ";

pub(crate) struct RecurringManager<'a> {
    db: &'a mut Database,
}

impl<'a> RecurringManager<'a> {
    pub(crate) fn new(db: &'a mut Database) -> Self {
        Self { db }
    }

    /// Validates like `add_income` / `add_expense`. Income templates always
    /// use the income category; `start` defaults to today.
    pub(crate) fn add(
        &self,
        kind: TransactionKind,
        amount: Decimal,
        category: &str,
        description: &str,
        frequency: Frequency,
        start: Option<NaiveDate>,
    ) -> Result<i64> {
        ensure_valid_amount(amount, "Amount")?;
        let category = match kind {
            TransactionKind::Income => INCOME_CATEGORY.to_string(),
            TransactionKind::Expense => parse_category(category)?.as_str().to_string(),
        };
        let recurring = RecurringTransaction::new(
            kind,
            amount,
            category,
            description.to_string(),
            frequency,
            start.unwrap_or_else(today),
        );
        let id = self.db.insert_recurring(&recurring)?;
        info!(id, %frequency, %amount, "recurring transaction added");
        Ok(id)
    }

    pub(crate) fn list(&self) -> Result<Vec<RecurringTransaction>> {
        self.db.get_recurring()
    }

    pub(crate) fn delete(&self, id: i64) -> Result<()> {
        if self.db.delete_recurring(id)? {
            info!(id, "recurring transaction deleted");
            Ok(())
        } else {
            warn!(id, "delete of unknown recurring transaction");
            Err(TrackerError::recurring_not_found(id))
        }
    }

    /// Insert one transaction for every occurrence that fell due since the
    /// template was last applied, up to and including `today`. Returns how
    /// many were inserted; a second call on the same day inserts none.
    pub(crate) fn apply_due(&mut self, today: NaiveDate) -> Result<usize> {
        let mut applied = 0;
        for recurring in self.db.get_recurring()? {
            let Some(id) = recurring.id else { continue };
            let dates = recurring.due_dates(today);
            let Some(&last) = dates.last() else {
                debug!(id, "nothing due");
                continue;
            };

            let txns: Vec<Transaction> = dates
                .iter()
                .map(|&date| occurrence(&recurring, date))
                .collect();
            applied += self.db.record_recurring_occurrences(id, &txns, last)?;
            info!(id, count = txns.len(), %last, "recurring transaction applied");
        }
        Ok(applied)
    }
}

fn occurrence(recurring: &RecurringTransaction, date: NaiveDate) -> Transaction {
    Transaction::new(
        recurring.kind,
        recurring.amount,
        recurring.category.clone(),
        format!("{RECURRING_PREFIX}{}", recurring.description),
        Some(date),
    )
}
