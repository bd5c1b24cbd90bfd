// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::reports::expenses_by_category;
use crate::models::CategoryKind;
use crate::utils::{
    category_for_user, fmt_money, id_for_user, maybe_print_json, month_bounds, parse_decimal,
    pretty_table, required,
};
use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, user: &str, m: &clap::ArgMatches) -> Result<()> {
    let user_id = id_for_user(conn, user)?;
    match m.subcommand() {
        Some(("set", sub)) => set(conn, user_id, sub)?,
        Some(("list", sub)) => list(conn, user_id, sub)?,
        _ => {}
    }
    Ok(())
}

fn period(sub: &clap::ArgMatches) -> Result<(i32, u32)> {
    let year = *sub.get_one::<i32>("year").context("--year is required")?;
    let month = *sub.get_one::<u32>("month").context("--month is required")?;
    Ok((year, month))
}

fn set(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = period(sub)?;
    let cat = required(sub, "category")?.trim();
    let amount = parse_decimal(required(sub, "amount")?)?;
    let amount = set_budget(conn, user_id, cat, year, month, amount)?;
    println!(
        "Budget set for {}-{:02} / {} = {}",
        year,
        month,
        cat,
        fmt_money(&amount)
    );
    Ok(())
}

/// Create or replace the budget for one expense category and month.
pub fn set_budget(
    conn: &Connection,
    user_id: i64,
    category: &str,
    year: i32,
    month: u32,
    amount: Decimal,
) -> Result<Decimal> {
    let (cat_id, kind) = category_for_user(conn, user_id, category)?;
    if kind != CategoryKind::Expense {
        bail!("Budgets can only be set on expense categories ('{}' is {})", category, kind);
    }
    if amount < Decimal::ZERO {
        bail!("Budget amount must not be negative");
    }
    let mut amount = amount.round_dp(2);
    amount.rescale(2);
    conn.execute(
        "INSERT INTO budgets(user_id, category_id, year, month, amount) VALUES (?1,?2,?3,?4,?5)
         ON CONFLICT(user_id, category_id, year, month) DO UPDATE SET amount=excluded.amount",
        params![user_id, cat_id, year, month, amount.to_string()],
    )?;
    Ok(amount)
}

#[derive(Debug, Serialize)]
pub struct BudgetRow {
    pub category: String,
    pub budget: Option<Decimal>,
    pub spent: Decimal,
}

/// Every expense category of the user with its budget (if any) and what was
/// spent in that month.
pub fn budget_rows(conn: &Connection, user_id: i64, year: i32, month: u32) -> Result<Vec<BudgetRow>> {
    let (start, end) = month_bounds(year, month)?;
    let spent = expenses_by_category(conn, user_id, start, end)?;

    let mut cats_stmt = conn.prepare(
        "SELECT id, name FROM categories WHERE user_id=?1 AND type='expense' ORDER BY name",
    )?;
    let cats = cats_stmt.query_map(params![user_id], |r| {
        Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
    })?;

    let mut data = Vec::new();
    for c in cats {
        let (cid, cname) = c?;
        let budget_s: Option<String> = conn
            .query_row(
                "SELECT amount FROM budgets WHERE user_id=?1 AND category_id=?2 AND year=?3 AND month=?4",
                params![user_id, cid, year, month],
                |r| r.get(0),
            )
            .optional()?;
        let budget = match budget_s {
            Some(s) => Some(
                s.parse::<Decimal>()
                    .with_context(|| format!("Invalid budget amount '{}' for {}", s, cname))?,
            ),
            None => None,
        };
        data.push(BudgetRow {
            category: cname,
            budget,
            spent: spent.get(&cid).copied().unwrap_or(Decimal::ZERO),
        });
    }
    Ok(data)
}

fn list(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = period(sub)?;
    let data = budget_rows(conn, user_id, year, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|b| {
                vec![
                    b.category.clone(),
                    b.budget.as_ref().map(fmt_money).unwrap_or_else(|| "-".into()),
                    fmt_money(&b.spent),
                ]
            })
            .collect();
        println!("{}-{:02}", year, month);
        println!("{}", pretty_table(&["Category", "Budget", "Spent"], rows));
    }
    Ok(())
}
