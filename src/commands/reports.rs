// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{
    fmt_money, id_for_user, maybe_print_json, month_bounds, parse_date, parse_decimal,
    pretty_table, push_period_filter,
};
use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

pub fn handle(conn: &Connection, user: &str, m: &clap::ArgMatches) -> Result<()> {
    let user_id = id_for_user(conn, user)?;
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, user_id, sub)?,
        Some(("dashboard", sub)) => dashboard(conn, user_id, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PeriodTotals {
    pub transactions: usize,
    pub income: Decimal,
    pub expenses: Decimal, // negative
    pub net: Decimal,
}

/// Income, expense and net totals for the user, optionally narrowed to a year
/// and/or month (0 = all).
pub fn period_totals(
    conn: &Connection,
    user_id: i64,
    year: Option<i32>,
    month: Option<u32>,
) -> Result<PeriodTotals> {
    let mut sql = String::from("SELECT amount FROM transactions WHERE user_id=?");
    let mut params_vec = vec![user_id.to_string()];
    push_period_filter(&mut sql, &mut params_vec, "date", year, month);

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut totals = PeriodTotals {
        transactions: 0,
        income: Decimal::ZERO,
        expenses: Decimal::ZERO,
        net: Decimal::ZERO,
    };
    while let Some(r) = rows.next()? {
        let amount = parse_decimal(&r.get::<_, String>(0)?)?;
        totals.transactions += 1;
        if amount > Decimal::ZERO {
            totals.income += amount;
        } else {
            totals.expenses += amount;
        }
    }
    totals.net = totals.income + totals.expenses;
    Ok(totals)
}

fn summary(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let totals = period_totals(
        conn,
        user_id,
        sub.get_one::<i32>("year").copied(),
        sub.get_one::<u32>("month").copied(),
    )?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
        println!(
            "{}",
            pretty_table(
                &["Transactions", "Income", "Expenses", "Net savings"],
                vec![vec![
                    totals.transactions.to_string(),
                    fmt_money(&totals.income),
                    fmt_money(&totals.expenses),
                    fmt_money(&totals.net),
                ]],
            )
        );
    }
    Ok(())
}

/// Money spent per category id in `[start, end)`, as positive amounts.
pub fn expenses_by_category(
    conn: &Connection,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<HashMap<i64, Decimal>> {
    let mut stmt = conn.prepare(
        "SELECT category_id, amount FROM transactions
         WHERE user_id=?1 AND date>=?2 AND date<?3",
    )?;
    let mut rows = stmt.query(params![user_id, start.to_string(), end.to_string()])?;
    let mut spent: HashMap<i64, Decimal> = HashMap::new();
    while let Some(r) = rows.next()? {
        let cat: i64 = r.get(0)?;
        let amount = parse_decimal(&r.get::<_, String>(1)?)?;
        if amount < Decimal::ZERO {
            *spent.entry(cat).or_insert(Decimal::ZERO) += -amount;
        }
    }
    Ok(spent)
}

#[derive(Debug, Serialize)]
pub struct CategorySpend {
    pub category: String,
    pub spent: Decimal,
}

#[derive(Debug, Serialize)]
pub struct BudgetProgress {
    pub category: String,
    pub budget: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub as_of: NaiveDate,
    pub balance: Decimal,
    pub spending: Vec<CategorySpend>,
    pub budgets: Vec<BudgetProgress>,
}

pub fn dashboard_data(conn: &Connection, user_id: i64, as_of: NaiveDate) -> Result<Dashboard> {
    let balance = period_totals(conn, user_id, None, None)?.net;

    let (start, end) = month_bounds(as_of.year(), as_of.month())?;
    let spent = expenses_by_category(conn, user_id, start, end)?;

    let mut names: HashMap<i64, String> = HashMap::new();
    {
        let mut stmt = conn.prepare("SELECT id, name FROM categories WHERE user_id=?1")?;
        let rows = stmt.query_map(params![user_id], |r| {
            Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (id, name) = row?;
            names.insert(id, name);
        }
    }

    let mut spending: Vec<CategorySpend> = spent
        .iter()
        .map(|(id, amount)| CategorySpend {
            category: names.get(id).cloned().unwrap_or_default(),
            spent: *amount,
        })
        .collect();
    spending.sort_by(|a, b| b.spent.cmp(&a.spent).then_with(|| a.category.cmp(&b.category)));

    let mut budgets = Vec::new();
    let mut stmt = conn.prepare(
        "SELECT category_id, amount FROM budgets WHERE user_id=?1 AND year=?2 AND month=?3",
    )?;
    let mut rows = stmt.query(params![user_id, as_of.year(), as_of.month()])?;
    while let Some(r) = rows.next()? {
        let cat: i64 = r.get(0)?;
        let budget = parse_decimal(&r.get::<_, String>(1)?)?;
        let used = spent.get(&cat).copied().unwrap_or(Decimal::ZERO);
        budgets.push(BudgetProgress {
            category: names.get(&cat).cloned().unwrap_or_default(),
            budget,
            spent: used,
            remaining: budget - used,
        });
    }
    budgets.sort_by(|a, b| a.category.cmp(&b.category));

    Ok(Dashboard {
        as_of,
        balance,
        spending,
        budgets,
    })
}

fn dashboard(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let as_of = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Local::now().date_naive(),
    };
    let data = dashboard_data(conn, user_id, as_of)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }

    println!("Balance: {}", fmt_money(&data.balance));
    println!();
    println!("Spending in {}", as_of.format("%Y-%m"));
    let rows = data
        .spending
        .iter()
        .map(|s| vec![s.category.clone(), fmt_money(&s.spent)])
        .collect();
    println!("{}", pretty_table(&["Category", "Spent"], rows));

    if !data.budgets.is_empty() {
        let rows = data
            .budgets
            .iter()
            .map(|b| {
                vec![
                    b.category.clone(),
                    fmt_money(&b.budget),
                    fmt_money(&b.spent),
                    fmt_money(&b.remaining),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Budget", "Spent", "Remaining"], rows)
        );
    }
    Ok(())
}
