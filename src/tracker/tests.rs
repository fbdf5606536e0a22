#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

fn manager() -> ExpenseManager {
    ExpenseManager::new(Database::open_in_memory().unwrap())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn count(em: &ExpenseManager) -> i64 {
    em.db().transaction_count().unwrap()
}

fn find_status<'a>(status: &'a [BudgetStatus], category: &str) -> Option<&'a BudgetStatus> {
    status.iter().find(|s| s.category == category)
}

// ── Recording ─────────────────────────────────────────────────

#[test]
fn test_add_income() {
    let em = manager();
    em.add_income(dec!(3000), "Monthly salary", None).unwrap();

    let income = em.income().unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].amount, dec!(3000));
    assert_eq!(income[0].category, "Salary/Income");
}

#[test]
fn test_add_expense() {
    let em = manager();
    em.add_expense(dec!(50), "Food", "Groceries", None).unwrap();

    let expenses = em.expenses().unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, dec!(50));
    assert_eq!(expenses[0].category, "Food");
}

#[test]
fn test_add_expense_normalises_category_case() {
    let em = manager();
    em.add_expense(dec!(9.99), "shopping", "Socks", None).unwrap();
    assert_eq!(em.expenses().unwrap()[0].category, "Shopping");
}

#[test]
fn test_non_positive_amounts_are_rejected() {
    let em = manager();
    for amount in [Decimal::ZERO, dec!(-5)] {
        let err = em.add_expense(amount, "Food", "bad", None).unwrap_err();
        assert!(err.is_validation());
        let err = em.add_income(amount, "bad", None).unwrap_err();
        assert!(err.is_validation());
    }
    assert_eq!(count(&em), 0);
}

#[test]
fn test_amount_limits() {
    let em = manager();
    assert!(em.add_expense(MAX_AMOUNT, "Rent", "ceiling", None).is_ok());

    let too_big = MAX_AMOUNT + dec!(0.01);
    assert!(em.add_expense(too_big, "Rent", "x", None).unwrap_err().is_validation());
    assert!(em.add_income(Decimal::MAX, "x", None).unwrap_err().is_validation());
    assert!(em.set_budget("Food", too_big).unwrap_err().is_validation());

    let err = em.add_expense(dec!(10.005), "Food", "x", None).unwrap_err();
    assert!(err.to_string().contains("2 decimal places"));
    assert!(em.set_budget("Food", Decimal::new(1, 25)).unwrap_err().is_validation());
    // trailing zeros are still whole cents
    assert!(em.add_income(dec!(10.500), "pay", None).is_ok());
    assert_eq!(count(&em), 2);
}

#[test]
fn test_invalid_category_is_rejected() {
    let em = manager();
    em.add_expense(dec!(10), "Food", "ok", None).unwrap();

    let err = em
        .add_expense(dec!(50), "InvalidCategory", "Test", None)
        .unwrap_err();
    assert!(matches!(err, TrackerError::InvalidCategory { .. }));
    assert!(err.to_string().contains("Invalid category"));
    assert_eq!(count(&em), 1);
}

#[test]
fn test_delete_twice() {
    let em = manager();
    let id = em.add_expense(dec!(50), "Food", "Test", None).unwrap();
    em.add_expense(dec!(20), "Food", "Keep", None).unwrap();

    em.delete_transaction(id).unwrap();
    assert_eq!(count(&em), 1);

    let err = em.delete_transaction(id).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(count(&em), 1);
}

#[test]
fn test_set_budget_validation() {
    let em = manager();
    assert!(em.set_budget("Food", Decimal::ZERO).unwrap_err().is_validation());
    assert!(em.set_budget("Food", dec!(-1)).unwrap_err().is_validation());
    assert!(em.set_budget("Groceries", dec!(100)).unwrap_err().is_validation());
    assert!(em.db().get_budgets().unwrap().is_empty());
}

#[test]
fn test_set_budget_upserts() {
    let em = manager();
    em.set_budget("Food", dec!(400)).unwrap();
    em.set_budget("food", dec!(500)).unwrap();
    assert_eq!(em.get_budget("Food").unwrap(), Some(dec!(500)));
    assert_eq!(em.db().get_budgets().unwrap().len(), 1);
}

#[test]
fn test_import_transactions_validates_whole_batch() {
    let mut em = manager();
    let good = vec![
        Transaction::new(
            TransactionKind::Expense,
            dec!(12.5),
            "food".into(),
            "Lunch".into(),
            Some(date(2024, 1, 3)),
        ),
        Transaction::new_income(dec!(100), "Gift".into(), Some(date(2024, 1, 4))),
    ];
    assert_eq!(em.import_transactions(good).unwrap(), 2);
    assert_eq!(em.expenses().unwrap()[0].category, "Food");

    let bad = vec![
        Transaction::new_income(dec!(5), "ok".into(), None),
        Transaction::new(
            TransactionKind::Expense,
            dec!(5),
            "Snacks".into(),
            "nope".into(),
            None,
        ),
    ];
    assert!(em.import_transactions(bad).unwrap_err().is_validation());
    assert_eq!(count(&em), 2);
}

// ── Queries ───────────────────────────────────────────────────

#[test]
fn test_transactions_between() {
    let em = manager();
    em.add_income(dec!(100), "a", Some(date(2024, 1, 5))).unwrap();
    em.add_expense(dec!(10), "Food", "b", Some(date(2024, 2, 5)))
        .unwrap();
    em.add_expense(dec!(10), "Food", "c", Some(date(2024, 3, 5)))
        .unwrap();

    let hits = em
        .transactions_between(date(2024, 1, 1), date(2024, 2, 5))
        .unwrap();
    assert_eq!(hits.len(), 2);

    assert!(em
        .transactions_between(date(2024, 3, 1), date(2024, 1, 1))
        .unwrap_err()
        .is_validation());
}

#[test]
fn test_expenses_in_category() {
    let em = manager();
    em.add_expense(dec!(10), "Food", "a", None).unwrap();
    em.add_expense(dec!(20), "Rent", "b", None).unwrap();
    let food = em.expenses_in_category("food").unwrap();
    assert_eq!(food.len(), 1);
    assert_eq!(food[0].amount, dec!(10));
}

// ── Aggregates ────────────────────────────────────────────────

#[test]
fn test_reference_scenario() {
    let em = manager();
    em.add_income(dec!(5000), "Salary", None).unwrap();
    em.add_expense(dec!(1200), "Rent", "Monthly rent", None).unwrap();
    em.add_expense(dec!(300), "Food", "Groceries", None).unwrap();
    em.add_expense(dec!(50), "Food", "Restaurant lunch", None).unwrap();

    assert_eq!(em.total_income().unwrap(), dec!(5000));
    assert_eq!(em.total_expenses().unwrap(), dec!(1550));
    assert_eq!(em.balance().unwrap(), dec!(3450));

    let summary = em.category_summary().unwrap();
    assert_eq!(
        summary,
        vec![
            CategoryTotal {
                category: "Rent".into(),
                amount: dec!(1200)
            },
            CategoryTotal {
                category: "Food".into(),
                amount: dec!(350)
            },
        ]
    );
}

#[test]
fn test_balance_identity_and_summary_sum() {
    let em = manager();
    em.add_income(dec!(0.10), "a", None).unwrap();
    em.add_income(dec!(0.20), "b", None).unwrap();
    for _ in 0..10 {
        em.add_expense(dec!(0.01), "Other", "penny", None).unwrap();
    }
    em.add_expense(dec!(19.99), "Shopping", "thing", None).unwrap();

    let income = em.total_income().unwrap();
    let expenses = em.total_expenses().unwrap();
    assert_eq!(income, dec!(0.30));
    assert_eq!(em.balance().unwrap(), income - expenses);

    let summed: Decimal = em.category_summary().unwrap().iter().map(|c| c.amount).sum();
    assert_eq!(summed, expenses);
}

#[test]
fn test_empty_aggregates() {
    let em = manager();
    assert_eq!(em.total_income().unwrap(), Decimal::ZERO);
    assert_eq!(em.balance().unwrap(), Decimal::ZERO);
    assert!(em.category_summary().unwrap().is_empty());
    assert!(em.monthly_summary().unwrap().is_empty());
    assert!(em.budget_status().unwrap().is_empty());
}

#[test]
fn test_monthly_summary_sorted_ascending() {
    let em = manager();
    em.add_expense(dec!(40), "Food", "mar", Some(date(2024, 3, 2)))
        .unwrap();
    em.add_income(dec!(1000), "jan", Some(date(2024, 1, 31)))
        .unwrap();
    em.add_expense(dec!(60), "Food", "jan", Some(date(2024, 1, 1)))
        .unwrap();
    em.add_income(dec!(500), "dec", Some(date(2023, 12, 15)))
        .unwrap();

    let monthly = em.monthly_summary().unwrap();
    let months: Vec<&str> = monthly.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(months, vec!["2023-12", "2024-01", "2024-03"]);
    assert_eq!(monthly[1].income, dec!(1000));
    assert_eq!(monthly[1].expenses, dec!(60));
    assert_eq!(monthly[1].balance(), dec!(940));
    assert_eq!(monthly[2].income, Decimal::ZERO);
}

#[test]
fn test_budget_status_reference_scenario() {
    let em = manager();
    em.set_budget("Food", dec!(400)).unwrap();
    em.add_expense(dec!(300), "Food", "Groceries", None).unwrap();

    let status = em.budget_status().unwrap();
    let food = find_status(&status, "Food").unwrap();
    assert_eq!(food.budget, dec!(400));
    assert_eq!(food.spent, dec!(300));
    assert_eq!(food.remaining, dec!(100));
    assert_eq!(food.percentage, dec!(75.0));
}

#[test]
fn test_budget_status_membership() {
    let em = manager();
    em.set_budget("Transport", dec!(150)).unwrap();
    em.add_expense(dec!(80), "Entertainment", "Movies", None).unwrap();

    let status = em.budget_status().unwrap();
    assert_eq!(status.len(), 1);
    let transport = find_status(&status, "Transport").unwrap();
    assert_eq!(transport.spent, Decimal::ZERO);
    assert_eq!(transport.remaining, dec!(150));
    assert_eq!(transport.percentage, Decimal::ZERO);
    assert!(find_status(&status, "Entertainment").is_none());
}

#[test]
fn test_over_budget_goes_negative() {
    let em = manager();
    em.set_budget("Entertainment", dec!(100)).unwrap();
    em.add_expense(dec!(150), "Entertainment", "Concert", None)
        .unwrap();

    let status = em.budget_status().unwrap();
    let ent = find_status(&status, "Entertainment").unwrap();
    assert_eq!(ent.remaining, dec!(-50));
    assert_eq!(ent.percentage, dec!(150));
}

// ── Pure summary functions ────────────────────────────────────

fn expense(amount: Decimal, category: &str) -> Transaction {
    Transaction::new(
        TransactionKind::Expense,
        amount,
        category.into(),
        String::new(),
        Some(date(2024, 1, 1)),
    )
}

#[test]
fn test_category_summary_ties_keep_first_seen_order() {
    let txns = vec![
        expense(dec!(10), "Transport"),
        expense(dec!(25), "Food"),
        expense(dec!(10), "Other"),
        expense(dec!(10), "Rent"),
    ];
    let names: Vec<String> = category_summary(&txns)
        .unwrap()
        .into_iter()
        .map(|c| c.category)
        .collect();
    assert_eq!(names, vec!["Food", "Transport", "Other", "Rent"]);
}

#[test]
fn test_category_summary_ignores_income() {
    let mut txns = vec![expense(dec!(10), "Food")];
    txns.push(Transaction::new_income(dec!(999), "pay".into(), None));
    let summary = category_summary(&txns).unwrap();
    assert_eq!(summary.len(), 1);
    assert!(find_total(&summary, "Salary/Income").is_none());
}

#[test]
fn test_budget_status_zero_budget() {
    let budgets = vec![Budget::new("Food".into(), Decimal::ZERO)];
    let spending = vec![CategoryTotal {
        category: "Food".into(),
        amount: dec!(30),
    }];
    let status = budget_status(&budgets, &spending).unwrap();
    assert_eq!(status[0].percentage, Decimal::ZERO);
    assert_eq!(status[0].remaining, dec!(-30));
}

#[test]
fn test_percentage_of() {
    assert_eq!(percentage_of(dec!(1), dec!(3)).unwrap().round_dp(2), dec!(33.33));
    assert_eq!(percentage_of(dec!(5), Decimal::ZERO).unwrap(), Decimal::ZERO);
}

#[test]
fn test_percentage_of_overflow_is_an_error() {
    let err = percentage_of(dec!(1000), Decimal::new(1, 25)).unwrap_err();
    assert!(matches!(err, TrackerError::Overflow(_)));
}

#[test]
fn test_totals_report_overflow_instead_of_panicking() {
    let huge = Decimal::from_parts(0, 0, 2_710_505_431, false, 0); // ~5e28
    let txns = vec![expense(huge, "Food"), expense(huge, "Food")];
    assert!(matches!(
        total_for(&txns, TransactionKind::Expense),
        Err(TrackerError::Overflow(_))
    ));
    assert!(category_summary(&txns).is_err());
    assert!(monthly_summary(&txns).is_err());
}

#[test]
fn test_oversized_rows_in_store_do_not_crash_aggregates() {
    let em = manager();
    let huge = Decimal::from_parts(0, 0, 2_710_505_431, false, 0);
    for _ in 0..2 {
        em.db()
            .insert_transaction(&Transaction::new_expense(
                huge,
                ExpenseCategory::Food,
                "legacy".into(),
                None,
            ))
            .unwrap();
    }
    assert!(em.total_expenses().is_err());
    assert!(em.balance().is_err());
    assert!(em.category_summary().is_err());
}

#[test]
fn test_tiny_stored_budget_does_not_crash_status() {
    let em = manager();
    em.db()
        .upsert_budget(&Budget::new("Food".into(), Decimal::new(1, 25)))
        .unwrap();
    em.add_expense(dec!(1000), "Food", "Feast", None).unwrap();
    assert!(matches!(
        em.budget_status().unwrap_err(),
        TrackerError::Overflow(_)
    ));
}
