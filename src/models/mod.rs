mod budget;
mod category;
mod recurring;
mod transaction;

pub use budget::Budget;
pub use category::{ExpenseCategory, INCOME_CATEGORY};
pub use recurring::{Frequency, RecurringTransaction};
pub use transaction::{parse_date, today, Transaction, TransactionKind, DATE_FORMAT};
