#![allow(clippy::unwrap_used, clippy::panic)]

use rust_decimal_macros::dec;

use super::*;
use crate::db::Database;
use crate::tracker::ExpenseManager;

fn session() -> Session {
    Session::new(
        ExpenseManager::new(Database::open_in_memory().unwrap()),
        dec!(0.80),
    )
}

fn run(session: &mut Session, line: &str) -> Result<Reply> {
    dispatch(&shell_words::split(line).unwrap(), session)
}

fn text(reply: Reply) -> String {
    match reply {
        Reply::Text(t) | Reply::Success(t) | Reply::Warning(t) => t,
        other => panic!("expected text, got {other:?}"),
    }
}

// ── Registry ──────────────────────────────────────────────────

#[test]
fn test_every_listed_command_is_registered() {
    for name in [
        "add-income",
        "add-expense",
        "list-all",
        "list-income",
        "list-expenses",
        "delete",
        "summary",
        "detailed-report",
        "category-report",
        "monthly-report",
        "filter-date",
        "set-budget",
        "budget-report",
        "export-csv",
        "export-pdf",
        "visualize",
        "categories",
        "help",
        "exit",
        "quit",
        "alerts",
        "analytics",
        "forecast",
        "search",
        "search-regex",
        "search-amount",
        "add-recurring",
        "list-recurring",
        "delete-recurring",
        "apply-recurring",
        "import-csv",
        "list-category",
        "filter-category",
        "clear",
    ] {
        assert!(COMMANDS.contains_key(name), "{name} missing");
    }
}

#[test]
fn test_every_command_belongs_to_a_help_group() {
    for cmd in COMMANDS.values() {
        assert!(GROUPS.contains(&cmd.group), "{} has no group", cmd.usage);
    }
}

#[test]
fn test_levenshtein() {
    assert_eq!(levenshtein("summary", "summary"), 0);
    assert_eq!(levenshtein("sumary", "summary"), 1);
    assert_eq!(levenshtein("", "abc"), 3);
}

#[test]
fn test_unknown_command_suggests_closest() {
    let mut s = session();
    let err = run(&mut s, "sumary").unwrap_err();
    assert!(err.to_string().contains("Did you mean 'summary'"));
}

#[test]
fn test_command_names_are_case_insensitive() {
    let mut s = session();
    assert_eq!(run(&mut s, "EXIT").unwrap(), Reply::Exit);
}

// ── Transactions ──────────────────────────────────────────────

#[test]
fn test_add_commands_join_description_words() {
    let mut s = session();
    let reply = run(&mut s, "add-income 3000 Monthly salary").unwrap();
    assert_eq!(text(reply), "Income of $3,000.00 added (ID 1)");
    run(&mut s, "add-expense 50 food \"Weekly groceries\" at market").unwrap();

    let expenses = s.manager.expenses().unwrap();
    assert_eq!(expenses[0].description, "Weekly groceries at market");
    assert_eq!(expenses[0].category, "Food");
    assert_eq!(s.manager.income().unwrap()[0].description, "Monthly salary");
}

#[test]
fn test_missing_arguments_print_usage() {
    let mut s = session();
    let err = run(&mut s, "add-expense 50 Food").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Usage: add-expense <amount> <category> <description>"
    );
}

#[test]
fn test_amounts_are_parsed_strictly() {
    let mut s = session();
    for line in ["add-income 12abc pay", "add-income 1e3 pay", "add-income $5 pay"] {
        let err = run(&mut s, line).unwrap_err();
        assert!(err.to_string().starts_with("Invalid amount"), "{line}");
    }
    assert_eq!(s.manager.db().transaction_count().unwrap(), 0);
}

#[test]
fn test_argument_errors_are_validation_errors() {
    let mut s = session();
    for line in [
        "sumary",
        "add-expense 50 Food",
        "add-income 12abc pay",
        "add-expense 10.005 Food Lunch",
        "delete one",
        "filter-date 2024-01-01 soon",
        "filter-date 2024-02-01 2024-01-01",
        "search-amount 10 1",
        "forecast 0",
        "add-recurring 10 Food fortnightly Bread",
        "import-csv /no/such/file.csv",
    ] {
        let err = run(&mut s, line).unwrap_err();
        let tracker = err.downcast_ref::<TrackerError>();
        assert!(tracker.is_some_and(TrackerError::is_validation), "{line}");
    }
}

#[test]
fn test_validation_errors_surface() {
    let mut s = session();
    let err = run(&mut s, "add-expense -5 Food refund").unwrap_err();
    assert!(err.to_string().contains("greater than 0"));
    let err = run(&mut s, "add-expense 5 Snacks chips").unwrap_err();
    assert!(err.to_string().contains("Invalid category"));
}

#[test]
fn test_delete_then_delete_again() {
    let mut s = session();
    run(&mut s, "add-expense 50 Food Test").unwrap();
    assert_eq!(
        text(run(&mut s, "delete 1").unwrap()),
        "Transaction 1 deleted"
    );
    let err = run(&mut s, "delete 1").unwrap_err();
    assert_eq!(err.to_string(), "Transaction 1 not found");
    assert!(run(&mut s, "delete one").is_err());
}

#[test]
fn test_list_and_filter() {
    let mut s = session();
    s.manager
        .add_expense(dec!(10), "Food", "January", chrono::NaiveDate::from_ymd_opt(2024, 1, 5))
        .unwrap();
    s.manager
        .add_expense(dec!(20), "Food", "March", chrono::NaiveDate::from_ymd_opt(2024, 3, 5))
        .unwrap();

    let listed = text(run(&mut s, "list-expenses").unwrap());
    assert!(listed.contains("January") && listed.contains("March"));

    let filtered = text(run(&mut s, "filter-date 2024-01-01 2024-01-31").unwrap());
    assert!(filtered.contains("January"));
    assert!(!filtered.contains("March"));

    assert!(run(&mut s, "filter-date 2024-01-01 soon").is_err());
    assert!(run(&mut s, "filter-date 2024-02-01 2024-01-01").is_err());
}

#[test]
fn test_category_listing_and_filter() {
    let mut s = session();
    s.manager
        .add_expense(dec!(10), "Food", "Bakery", chrono::NaiveDate::from_ymd_opt(2024, 1, 5))
        .unwrap();
    s.manager
        .add_expense(dec!(20), "Food", "Market", chrono::NaiveDate::from_ymd_opt(2024, 3, 5))
        .unwrap();
    s.manager
        .add_expense(dec!(30), "Transport", "Bus pass", chrono::NaiveDate::from_ymd_opt(2024, 1, 9))
        .unwrap();

    let food = text(run(&mut s, "list-category FOOD").unwrap());
    assert!(food.contains("Bakery") && food.contains("Market"));
    assert!(!food.contains("Bus pass"));

    let january = text(run(&mut s, "filter-category food 2024-01-01 2024-01-31").unwrap());
    assert!(january.contains("Bakery"));
    assert!(!january.contains("Market"));
    assert!(!january.contains("Bus pass"));

    assert!(run(&mut s, "list-category Snacks").is_err());
    assert!(run(&mut s, "filter-category Food 2024-02-01 2024-01-01").is_err());
}

// ── Reports & budgets ─────────────────────────────────────────

#[test]
fn test_reports_render() {
    let mut s = session();
    run(&mut s, "add-income 5000 Salary").unwrap();
    run(&mut s, "add-expense 1200 Rent \"Monthly rent\"").unwrap();

    assert!(text(run(&mut s, "summary").unwrap()).contains("$3,800.00"));
    assert!(text(run(&mut s, "category-report").unwrap()).contains("100.0%"));
    assert!(text(run(&mut s, "monthly-report").unwrap()).contains("$3,800.00"));
    assert!(text(run(&mut s, "detailed-report").unwrap()).contains("Monthly rent"));
}

#[test]
fn test_budget_and_alerts() {
    let mut s = session();
    assert_eq!(
        text(run(&mut s, "set-budget food 400").unwrap()),
        "Budget for Food set to $400.00"
    );
    assert!(run(&mut s, "set-budget Food 0").is_err());
    assert_eq!(
        text(run(&mut s, "set-budget Food 400").unwrap()),
        "Budget for Food set to $400.00 (was $400.00)"
    );

    run(&mut s, "add-expense 300 Food Groceries").unwrap();
    let report = text(run(&mut s, "budget-report").unwrap());
    assert!(report.contains("75.0%"));
    assert!(matches!(run(&mut s, "alerts").unwrap(), Reply::Success(_)));

    run(&mut s, "add-expense 30 Food Snacks").unwrap();
    let alerts = text(run(&mut s, "alerts").unwrap());
    assert!(alerts.contains("[WARNING]"));
}

#[test]
fn test_export_and_import_csv() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out.csv");
    let file = file.to_str().unwrap();

    let mut s = session();
    assert!(run(&mut s, &format!("export-csv {file}")).is_err());

    run(&mut s, "add-income 5000 Salary").unwrap();
    run(&mut s, "add-expense 300 Food Groceries").unwrap();
    assert_eq!(
        text(run(&mut s, &format!("export-csv {file}")).unwrap()),
        format!("Exported 2 transaction(s) to {file}")
    );

    let mut other = session();
    run(&mut other, &format!("import-csv {file}")).unwrap();
    assert_eq!(other.manager.total_expenses().unwrap(), dec!(300));
    assert_eq!(other.manager.total_income().unwrap(), dec!(5000));

    assert!(run(&mut other, "import-csv /no/such/file.csv").is_err());
}

#[test]
fn test_export_pdf_reports_unsupported() {
    let mut s = session();
    let err = run(&mut s, "export-pdf report.pdf").unwrap_err();
    assert!(err.to_string().contains("not supported"));
}

// ── Recurring, search, analytics ──────────────────────────────

#[test]
fn test_recurring_commands() {
    let mut s = session();
    let added = text(run(&mut s, "add-recurring 15.99 Entertainment monthly Streaming service").unwrap());
    assert!(added.contains("every month"));
    run(&mut s, "add-recurring 2500 income monthly Pay").unwrap();
    assert!(run(&mut s, "add-recurring 10 Food fortnightly Bread").is_err());

    let listed = text(run(&mut s, "list-recurring").unwrap());
    assert!(listed.contains("Streaming service"));
    assert!(listed.contains("Salary/Income"));

    // both start today, so exactly one occurrence each is due
    assert_eq!(
        text(run(&mut s, "apply-recurring").unwrap()),
        "Applied 2 recurring transaction(s)"
    );
    assert!(matches!(run(&mut s, "apply-recurring").unwrap(), Reply::Warning(_)));
    assert_eq!(s.manager.db().transaction_count().unwrap(), 2);

    run(&mut s, "delete-recurring 1").unwrap();
    assert!(run(&mut s, "delete-recurring 1").is_err());
}

#[test]
fn test_search_commands() {
    let mut s = session();
    run(&mut s, "add-expense 4.50 Food Morning coffee").unwrap();
    run(&mut s, "add-expense 60 Transport Train ticket").unwrap();

    let hits = text(run(&mut s, "search COFFEE").unwrap());
    assert!(hits.contains("Morning coffee"));
    assert!(!hits.contains("Train"));

    let hits = text(run(&mut s, "search-regex ^train").unwrap());
    assert!(hits.contains("Train ticket"));
    assert!(run(&mut s, "search-regex (").is_err());

    let hits = text(run(&mut s, "search-amount 4.50 10").unwrap());
    assert!(hits.contains("Morning coffee"));
    assert!(!hits.contains("Train"));
    assert!(run(&mut s, "search-amount 10 1").is_err());
}

#[test]
fn test_analytics_and_forecast() {
    let mut s = session();
    assert_eq!(
        text(run(&mut s, "forecast").unwrap()),
        "Not enough history to forecast."
    );
    run(&mut s, "add-income 1000 Pay").unwrap();
    run(&mut s, "add-expense 250 Rent Room").unwrap();

    let analytics = text(run(&mut s, "analytics").unwrap());
    assert!(analytics.contains("75.0%"));
    assert!(analytics.contains("Rent ($250.00)"));

    let forecast = text(run(&mut s, "forecast 2").unwrap());
    assert_eq!(forecast.lines().filter(|l| l.contains("$250.00")).count(), 2);
    assert!(run(&mut s, "forecast 0").is_err());
    assert!(run(&mut s, "forecast many").is_err());
}

// ── Utility ───────────────────────────────────────────────────

#[test]
fn test_help_lists_every_command() {
    let mut s = session();
    let help = text(run(&mut s, "help").unwrap());
    for cmd in COMMANDS.values() {
        assert!(help.contains(cmd.usage), "{} missing from help", cmd.usage);
    }
    assert!(help.contains("Food, Transport"));
}

#[test]
fn test_categories_and_control_replies() {
    let mut s = session();
    let cats = text(run(&mut s, "categories").unwrap());
    assert!(cats.contains("1. Food"));
    assert!(cats.contains("9. Other"));
    assert_eq!(run(&mut s, "visualize").unwrap(), Reply::Chart);
    assert_eq!(run(&mut s, "clear").unwrap(), Reply::Clear);
    assert_eq!(run(&mut s, "quit").unwrap(), Reply::Exit);
}
