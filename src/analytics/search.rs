use chrono::NaiveDate;
use regex::RegexBuilder;
use rust_decimal::Decimal;

use crate::error::{Result, TrackerError};
use crate::models::Transaction;

/// Case-insensitive substring match on the description.
pub(crate) fn search_by_description(transactions: &[Transaction], query: &str) -> Vec<Transaction> {
    let query = query.to_lowercase();
    transactions
        .iter()
        .filter(|t| t.description.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// Case-insensitive regex match on the description or the category.
pub(crate) fn search_by_pattern(transactions: &[Transaction], pattern: &str) -> Result<Vec<Transaction>> {
    let re = RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| TrackerError::validation(format!("Invalid pattern '{pattern}': {e}")))?;

    Ok(transactions
        .iter()
        .filter(|t| re.is_match(&t.description) || re.is_match(&t.category))
        .cloned()
        .collect())
}

/// Both bounds inclusive.
pub(crate) fn search_by_amount_range(
    transactions: &[Transaction],
    min: Decimal,
    max: Decimal,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| min <= t.amount && t.amount <= max)
        .cloned()
        .collect()
}

pub(crate) fn search_by_category_and_date(
    transactions: &[Transaction],
    category: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| t.category.eq_ignore_ascii_case(category))
        .filter(|t| start <= t.date && t.date <= end)
        .cloned()
        .collect()
}
