// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketledger::{cli, commands::transactions, db};
use rusqlite::{Connection, params};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO users(id, username) VALUES (1, 'ana'), (2, 'ben');
        INSERT INTO categories(id, name, type, user_id) VALUES
            (1, 'Groceries', 'expense', 1),
            (2, 'Salary', 'income', 1),
            (3, 'Groceries', 'expense', 2);
        "#,
    )
    .unwrap();
    for i in 1..=3 {
        conn.execute(
            "INSERT INTO transactions(description, amount, date, category_id, user_id) VALUES ('Shop', '-10.00', ?1, 1, 1)",
            params![format!("2025-01-0{} 00:00:00", i)],
        )
        .unwrap();
    }
    conn.execute(
        "INSERT INTO transactions(description, amount, date, category_id, user_id) VALUES ('Other', '-99.00', '2025-01-05 00:00:00', 3, 2)",
        [],
    )
    .unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["pocketledger", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(conn, "ana", tx_m)
    } else {
        panic!("no tx subcommand");
    }
}

fn amount_of(conn: &Connection, description: &str) -> String {
    conn.query_row(
        "SELECT amount FROM transactions WHERE description=?1",
        params![description],
        |r| r.get(0),
    )
    .unwrap()
}

#[test]
fn list_limit_respected() {
    let conn = setup();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["pocketledger", "tx", "list", "--limit", "2"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&conn, 1, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].date, "2025-01-03");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn list_only_shows_own_transactions() {
    let conn = setup();
    let matches = cli::build_cli().get_matches_from(["pocketledger", "tx", "list"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&conn, 2, list_m).unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].description, "Other");
            assert_eq!(rows[0].amount, "-99.00");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn add_signs_amount_from_category_type() {
    let conn = setup();
    run(&conn, &["add", "--description", "Bread", "--amount", "2.5", "--category", "Groceries", "--date", "2025-02-01"]).unwrap();
    run(&conn, &["add", "--description", "Payday", "--amount", "-1500", "--category", "Salary", "--date", "2025-02-01"]).unwrap();

    assert_eq!(amount_of(&conn, "Bread"), "-2.50");
    assert_eq!(amount_of(&conn, "Payday"), "1500.00");
    let date: String = conn
        .query_row("SELECT date FROM transactions WHERE description='Bread'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(date, "2025-02-01 00:00:00");
}

#[test]
fn add_rejects_other_users_category() {
    let conn = setup();
    conn.execute(
        "INSERT INTO categories(id, name, type, user_id) VALUES (4, 'Boat', 'expense', 2)",
        [],
    )
    .unwrap();
    let err = run(&conn, &["add", "--description", "Fuel", "--amount", "50", "--category", "Boat"]).unwrap_err();
    assert!(err.to_string().contains("Category 'Boat' not found"));
}

#[test]
fn edit_reapplies_sign_when_category_changes() {
    let conn = setup();
    let id: i64 = conn
        .query_row("SELECT id FROM transactions WHERE user_id=1 ORDER BY id LIMIT 1", [], |r| r.get(0))
        .unwrap();
    let id_s = id.to_string();

    run(&conn, &["edit", "--id", &id_s, "--description", "Refund", "--category", "Salary"]).unwrap();

    assert_eq!(amount_of(&conn, "Refund"), "10.00");
}

#[test]
fn edit_and_rm_ignore_other_users_rows() {
    let conn = setup();
    let other: i64 = conn
        .query_row("SELECT id FROM transactions WHERE user_id=2", [], |r| r.get(0))
        .unwrap();
    let other_s = other.to_string();

    assert!(run(&conn, &["edit", "--id", &other_s, "--amount", "1"]).is_err());
    assert!(run(&conn, &["rm", "--id", &other_s]).is_err());
    assert_eq!(amount_of(&conn, "Other"), "-99.00");
}

#[test]
fn rm_deletes_own_transaction() {
    let conn = setup();
    let id: i64 = conn
        .query_row("SELECT id FROM transactions WHERE user_id=1 ORDER BY id LIMIT 1", [], |r| r.get(0))
        .unwrap();
    run(&conn, &["rm", "--id", &id.to_string()]).unwrap();
    let left: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions WHERE user_id=1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(left, 2);
}
