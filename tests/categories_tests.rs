// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketledger::models::CategoryKind;
use pocketledger::{cli, commands::categories, commands::users, db};
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    users::add_user(&conn, "ana").unwrap();
    users::add_user(&conn, "ben").unwrap();
    conn
}

fn run(conn: &Connection, user: &str, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["pocketledger", "category"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("category", cat_m)) = matches.subcommand() {
        categories::handle(conn, user, cat_m)
    } else {
        panic!("no category subcommand");
    }
}

#[test]
fn duplicate_username_is_rejected() {
    let conn = setup();
    let err = users::add_user(&conn, "ana").unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(users::list_users(&conn).unwrap().len(), 2);
}

#[test]
fn names_are_unique_per_user_only() {
    let conn = setup();
    run(&conn, "ana", &["add", "--name", "Food"]).unwrap();
    run(&conn, "ben", &["add", "--name", "Food"]).unwrap();

    let err = run(&conn, "ana", &["add", "--name", "Food", "--type", "income"]).unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[test]
fn list_puts_income_before_expenses() {
    let conn = setup();
    run(&conn, "ana", &["add", "--name", "Rent"]).unwrap();
    run(&conn, "ana", &["add", "--name", "Wages", "--type", "income"]).unwrap();
    run(&conn, "ana", &["add", "--name", "Bonus", "--type", "income"]).unwrap();

    let cats = categories::list_categories(&conn, 1).unwrap();
    let listed: Vec<(String, CategoryKind)> = cats.into_iter().map(|c| (c.name, c.kind)).collect();
    assert_eq!(
        listed,
        vec![
            ("Bonus".to_string(), CategoryKind::Income),
            ("Wages".to_string(), CategoryKind::Income),
            ("Rent".to_string(), CategoryKind::Expense),
        ]
    );
}

#[test]
fn category_in_use_cannot_be_removed() {
    let conn = setup();
    let cat_id = categories::add_category(&conn, 1, "Rent", CategoryKind::Expense).unwrap();
    conn.execute(
        "INSERT INTO recurring_transactions(description, amount, frequency, start_date, next_date, category_id, user_id)
         VALUES ('Rent', '-900.00', 'monthly', '2025-01-01', '2025-01-01', ?1, 1)",
        [cat_id],
    )
    .unwrap();

    let err = run(&conn, "ana", &["rm", "--name", "Rent"]).unwrap_err();
    assert!(err.to_string().contains("cannot be removed"));

    conn.execute("DELETE FROM recurring_transactions", []).unwrap();
    run(&conn, "ana", &["rm", "--name", "Rent"]).unwrap();
    assert!(categories::list_categories(&conn, 1).unwrap().is_empty());
}
