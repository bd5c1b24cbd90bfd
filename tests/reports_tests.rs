// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pocketledger::{commands::budgets, commands::reports, db};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO users(id, username) VALUES (1, 'ana'), (2, 'ben');
        INSERT INTO categories(id, name, type, user_id) VALUES
            (1, 'Dining', 'expense', 1),
            (2, 'Salary', 'income', 1),
            (3, 'Rent', 'expense', 1),
            (4, 'Dining', 'expense', 2);
        INSERT INTO transactions(description, amount, date, category_id, user_id) VALUES
            ('Pay', '2000.00', '2025-07-01 00:00:00', 2, 1),
            ('Rent', '-800.00', '2025-07-02 00:00:00', 3, 1),
            ('Pay', '2000.00', '2025-08-01 00:00:00', 2, 1),
            ('Rent', '-800.00', '2025-08-02 00:00:00', 3, 1),
            ('Lunch', '-20.25', '2025-08-15 13:00:00', 1, 1),
            ('Other user', '-500.00', '2025-08-15 13:00:00', 4, 2);
        "#,
    )
    .unwrap();
    conn
}

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn totals_for_all_time_and_single_month() {
    let conn = setup();

    let all = reports::period_totals(&conn, 1, None, None).unwrap();
    assert_eq!(all.transactions, 5);
    assert_eq!(all.income, d("4000.00"));
    assert_eq!(all.expenses, d("-1620.25"));
    assert_eq!(all.net, d("2379.75"));

    let august = reports::period_totals(&conn, 1, Some(2025), Some(8)).unwrap();
    assert_eq!(august.transactions, 3);
    assert_eq!(august.net, d("1179.75"));

    // 0 means "all"
    let year_only = reports::period_totals(&conn, 1, Some(2025), Some(0)).unwrap();
    assert_eq!(year_only.transactions, 5);
}

#[test]
fn dashboard_groups_month_spending_and_budgets() {
    let conn = setup();
    budgets::set_budget(&conn, 1, "Dining", 2025, 8, d("50")).unwrap();

    let dash =
        reports::dashboard_data(&conn, 1, NaiveDate::from_ymd_opt(2025, 8, 20).unwrap()).unwrap();

    assert_eq!(dash.balance, d("2379.75"));
    let spending: Vec<(String, Decimal)> = dash
        .spending
        .iter()
        .map(|s| (s.category.clone(), s.spent))
        .collect();
    assert_eq!(
        spending,
        vec![("Rent".to_string(), d("800.00")), ("Dining".to_string(), d("20.25"))]
    );
    assert_eq!(dash.budgets.len(), 1);
    assert_eq!(dash.budgets[0].category, "Dining");
    assert_eq!(dash.budgets[0].remaining, d("29.75"));
}
