use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;

use super::transaction::TransactionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Some(Self::Daily),
            "weekly" | "week" => Some(Self::Weekly),
            "monthly" | "month" => Some(Self::Monthly),
            "yearly" | "year" | "annual" => Some(Self::Yearly),
            _ => None,
        }
    }

    pub fn all() -> &'static [Frequency] {
        &[Self::Daily, Self::Weekly, Self::Monthly, Self::Yearly]
    }

    /// The `n`th occurrence counted from `start` (occurrence 0 is `start`).
    /// Month arithmetic is always taken from `start`, so a series anchored on
    /// the 31st lands on each month's last day without drifting.
    pub fn nth(&self, start: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Self::Daily => start.checked_add_days(Days::new(u64::from(n))),
            Self::Weekly => start.checked_add_days(Days::new(7 * u64::from(n))),
            Self::Monthly => start.checked_add_months(Months::new(n)),
            Self::Yearly => start.checked_add_months(Months::new(n.checked_mul(12)?)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecurringTransaction {
    pub id: Option<i64>,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub last_applied: Option<NaiveDate>,
    pub created_at: String,
}

impl RecurringTransaction {
    pub fn new(
        kind: TransactionKind,
        amount: Decimal,
        category: String,
        description: String,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            kind,
            amount,
            category,
            description,
            frequency,
            start_date,
            last_applied: None,
            created_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Occurrences after `last_applied` up to and including `until`.
    pub fn due_dates(&self, until: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut n = 0;
        while let Some(date) = self.frequency.nth(self.start_date, n) {
            if date > until {
                break;
            }
            if self.last_applied.is_none_or(|last| date > last) {
                dates.push(date);
            }
            n += 1;
        }
        dates
    }

    pub fn next_due(&self) -> Option<NaiveDate> {
        let mut n = 0;
        while let Some(date) = self.frequency.nth(self.start_date, n) {
            if self.last_applied.is_none_or(|last| date > last) {
                return Some(date);
            }
            n += 1;
        }
        None
    }
}
