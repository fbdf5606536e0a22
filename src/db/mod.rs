mod schema;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{Result, TrackerError};
use crate::models::*;

/// Optional restrictions for `Database::get_transactions`. Empty means "all".
#[derive(Debug, Clone, Default)]
pub(crate) struct TransactionFilter {
    pub(crate) kind: Option<TransactionKind>,
    pub(crate) start: Option<NaiveDate>,
    pub(crate) end: Option<NaiveDate>,
    pub(crate) category: Option<String>,
}

/// Handle to the SQLite store. Opened once per process and closed with
/// [`Database::close`] (or on drop).
pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let mut db = Self { conn };
        db.migrate()?;
        info!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    pub(crate) fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e)?;
        info!("database closed");
        Ok(())
    }

    /// Create the schema on a fresh file; refuse files written by a newer build.
    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            debug!(version = schema::CURRENT_VERSION, "schema created");
            return Ok(());
        }

        let found: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })?;
        if found > schema::CURRENT_VERSION {
            return Err(TrackerError::SchemaVersion {
                found,
                supported: schema::CURRENT_VERSION,
            });
        }
        Ok(())
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn insert_transaction(&self, txn: &Transaction) -> Result<i64> {
        insert_into(&self.conn, txn)?;
        let id = self.conn.last_insert_rowid();
        debug!(id, kind = %txn.kind, amount = %txn.amount, "transaction inserted");
        Ok(id)
    }

    /// Insert all rows in one SQL transaction; either every row lands or none.
    pub(crate) fn insert_transactions_batch(&mut self, txns: &[Transaction]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for txn in txns {
            insert_into(&tx, txn)?;
        }
        tx.commit()?;
        debug!(count = txns.len(), "transaction batch inserted");
        Ok(txns.len())
    }

    pub(crate) fn get_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut sql = String::from(
            "SELECT id, date, type, CAST(amount AS TEXT), category, description, created_at
             FROM transactions WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(kind) = filter.kind {
            sql.push_str(&format!(" AND type = ?{}", param_values.len() + 1));
            param_values.push(Box::new(kind.as_str()));
        }
        if let Some(start) = filter.start {
            sql.push_str(&format!(" AND date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(start.format(DATE_FORMAT).to_string()));
        }
        if let Some(end) = filter.end {
            sql.push_str(&format!(" AND date <= ?{}", param_values.len() + 1));
            param_values.push(Box::new(end.format(DATE_FORMAT).to_string()));
        }
        if let Some(category) = &filter.category {
            sql.push_str(&format!(" AND category = ?{}", param_values.len() + 1));
            param_values.push(Box::new(category.clone()));
        }

        sql.push_str(" ORDER BY date DESC, id DESC");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), row_to_transaction)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn list_all(&self) -> Result<Vec<Transaction>> {
        self.get_transactions(&TransactionFilter::default())
    }

    pub(crate) fn list_by_kind(&self, kind: TransactionKind) -> Result<Vec<Transaction>> {
        self.get_transactions(&TransactionFilter {
            kind: Some(kind),
            ..Default::default()
        })
    }

    /// Inclusive on both ends.
    pub(crate) fn list_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        self.get_transactions(&TransactionFilter {
            start: Some(start),
            end: Some(end),
            ..Default::default()
        })
    }

    pub(crate) fn list_by_category(&self, category: &str) -> Result<Vec<Transaction>> {
        self.get_transactions(&TransactionFilter {
            category: Some(category.to_string()),
            ..Default::default()
        })
    }

    pub(crate) fn transaction_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?)
    }

    /// Returns `false` when no row had that id.
    pub(crate) fn delete_transaction(&self, id: i64) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
        debug!(id, removed, "transaction delete");
        Ok(removed > 0)
    }

    // ── Budgets ───────────────────────────────────────────────

    /// Insert or replace the limit for `category`. `created_at` survives a
    /// replace; `updated_at` is bumped.
    pub(crate) fn upsert_budget(&self, budget: &Budget) -> Result<()> {
        self.conn.execute(
            "INSERT INTO budgets (category, amount, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(category) DO UPDATE SET amount = excluded.amount, updated_at = excluded.updated_at",
            params![
                budget.category,
                budget.amount.to_string(),
                budget.created_at,
                budget.updated_at,
            ],
        )?;
        debug!(category = %budget.category, amount = %budget.amount, "budget upserted");
        Ok(())
    }

    pub(crate) fn get_budgets(&self) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, CAST(amount AS TEXT), created_at, updated_at
             FROM budgets ORDER BY category",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Budget {
                category: row.get(0)?,
                amount: decimal_column(row, 1)?,
                created_at: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                updated_at: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_budget(&self, category: &str) -> Result<Option<Decimal>> {
        let result = self.conn.query_row(
            "SELECT CAST(amount AS TEXT) FROM budgets WHERE category = ?1",
            params![category],
            |row| decimal_column(row, 0),
        );
        match result {
            Ok(amount) => Ok(Some(amount)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ── Recurring ─────────────────────────────────────────────

    pub(crate) fn insert_recurring(&self, recurring: &RecurringTransaction) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO recurring (type, amount, category, description, frequency, start_date, last_applied, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                recurring.kind.as_str(),
                recurring.amount.to_string(),
                recurring.category,
                recurring.description,
                recurring.frequency.as_str(),
                recurring.start_date.format(DATE_FORMAT).to_string(),
                recurring
                    .last_applied
                    .map(|d| d.format(DATE_FORMAT).to_string()),
                recurring.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_recurring(&self) -> Result<Vec<RecurringTransaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, CAST(amount AS TEXT), category, description, frequency,
                    start_date, last_applied, created_at
             FROM recurring ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            let kind: String = row.get(1)?;
            let frequency: String = row.get(5)?;
            Ok(RecurringTransaction {
                id: Some(row.get(0)?),
                kind: TransactionKind::parse(&kind)
                    .ok_or_else(|| conversion_error(1, format!("unknown type '{kind}'")))?,
                amount: decimal_column(row, 2)?,
                category: row.get(3)?,
                description: row.get(4)?,
                frequency: Frequency::parse(&frequency).ok_or_else(|| {
                    conversion_error(5, format!("unknown frequency '{frequency}'"))
                })?,
                start_date: date_column(row, 6)?,
                last_applied: match row.get::<_, Option<String>>(7)? {
                    Some(s) => Some(
                        parse_date(&s)
                            .ok_or_else(|| conversion_error(7, format!("bad date '{s}'")))?,
                    ),
                    None => None,
                },
                created_at: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn delete_recurring(&self, id: i64) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM recurring WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Insert the generated occurrences and advance `last_applied` atomically.
    pub(crate) fn record_recurring_occurrences(
        &mut self,
        recurring_id: i64,
        txns: &[Transaction],
        last_applied: NaiveDate,
    ) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for txn in txns {
            insert_into(&tx, txn)?;
        }
        tx.execute(
            "UPDATE recurring SET last_applied = ?1 WHERE id = ?2",
            params![last_applied.format(DATE_FORMAT).to_string(), recurring_id],
        )?;
        tx.commit()?;
        Ok(txns.len())
    }
}

fn insert_into(conn: &Connection, txn: &Transaction) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO transactions (date, type, amount, category, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            txn.date.format(DATE_FORMAT).to_string(),
            txn.kind.as_str(),
            txn.amount.to_string(),
            txn.category,
            txn.description,
            txn.created_at,
        ],
    )
}

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let kind: String = row.get(2)?;
    Ok(Transaction {
        id: Some(row.get(0)?),
        date: date_column(row, 1)?,
        kind: TransactionKind::parse(&kind)
            .ok_or_else(|| conversion_error(2, format!("unknown type '{kind}'")))?,
        amount: decimal_column(row, 3)?,
        category: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        description: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        created_at: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
    })
}

/// Amounts live in REAL columns and are selected through `CAST(.. AS TEXT)`
/// so they can be parsed straight into a `Decimal`.
fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    parse_date(&raw).ok_or_else(|| conversion_error(idx, format!("bad date '{raw}'")))
}

fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}
