use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::info;

use crate::error::{Result, TrackerError};
use crate::models::{parse_date, Transaction, TransactionKind, DATE_FORMAT};

pub(crate) const CSV_HEADER: [&str; 6] = ["ID", "Date", "Type", "Category", "Amount", "Description"];

/// Write `transactions` in the order given, amounts at two decimals.
/// Refuses to create a file when there is nothing to write.
pub(crate) fn export_csv(path: &Path, transactions: &[Transaction]) -> Result<usize> {
    if transactions.is_empty() {
        return Err(TrackerError::validation("No transactions to export"));
    }

    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(CSV_HEADER)?;
    for txn in transactions {
        wtr.write_record([
            txn.id.map(|id| id.to_string()).unwrap_or_default(),
            txn.date.format(DATE_FORMAT).to_string(),
            txn.kind.as_str().to_string(),
            txn.category.clone(),
            format!("{:.2}", txn.amount.round_dp(2)),
            txn.description.clone(),
        ])?;
    }
    wtr.flush()?;

    info!(path = %path.display(), count = transactions.len(), "exported CSV");
    Ok(transactions.len())
}

/// Parse a file written by `export_csv`. Ids are dropped so the rows can be
/// inserted as new transactions.
pub(crate) fn read_csv(path: &Path) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;

    let headers = rdr.headers()?.clone();
    let matches_header = headers.len() == CSV_HEADER.len()
        && headers
            .iter()
            .zip(CSV_HEADER)
            .all(|(got, want)| got.eq_ignore_ascii_case(want));
    if !matches_header {
        return Err(TrackerError::validation(format!(
            "Unrecognised CSV header; expected {}",
            CSV_HEADER.join(",")
        )));
    }

    let mut transactions = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        // header is line 1
        let line = i + 2;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let date = parse_date(field(1)).ok_or_else(|| {
            TrackerError::validation(format!("Line {line}: invalid date '{}'", field(1)))
        })?;
        let kind = TransactionKind::parse(field(2)).ok_or_else(|| {
            TrackerError::validation(format!("Line {line}: invalid type '{}'", field(2)))
        })?;
        let amount = Decimal::from_str(field(4).trim()).map_err(|_| {
            TrackerError::validation(format!("Line {line}: invalid amount '{}'", field(4)))
        })?;

        transactions.push(Transaction::new(
            kind,
            amount,
            field(3).to_string(),
            field(5).to_string(),
            Some(date),
        ));
    }

    info!(path = %path.display(), count = transactions.len(), "read CSV");
    Ok(transactions)
}

pub(crate) fn export_pdf(_path: &Path) -> Result<()> {
    Err(TrackerError::Unsupported("PDF export"))
}
