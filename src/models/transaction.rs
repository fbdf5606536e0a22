use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::category::{ExpenseCategory, INCOME_CATEGORY};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    pub fn all() -> &'static [TransactionKind] {
        &[Self::Income, Self::Expense]
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Option<i64>,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: String,
}

impl Transaction {
    pub fn new_income(amount: Decimal, description: String, date: Option<NaiveDate>) -> Self {
        Self::new(
            TransactionKind::Income,
            amount,
            INCOME_CATEGORY.to_string(),
            description,
            date,
        )
    }

    pub fn new_expense(
        amount: Decimal,
        category: ExpenseCategory,
        description: String,
        date: Option<NaiveDate>,
    ) -> Self {
        Self::new(
            TransactionKind::Expense,
            amount,
            category.as_str().to_string(),
            description,
            date,
        )
    }

    pub fn new(
        kind: TransactionKind,
        amount: Decimal,
        category: String,
        description: String,
        date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: None,
            kind,
            amount,
            category,
            description,
            date: date.unwrap_or_else(today),
            created_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Year-month bucket, e.g. "2024-01".
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    /// Amount with income positive and expenses negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}
