// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::DATETIME_FORMAT;
use crate::utils::{
    category_for_user, fmt_money, id_for_user, maybe_print_json, parse_date, parse_decimal,
    pretty_table, push_period_filter, required,
};
use anyhow::{Result, bail};
use chrono::{NaiveDateTime, NaiveTime, Utc};
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, user: &str, m: &clap::ArgMatches) -> Result<()> {
    let user_id = id_for_user(conn, user)?;
    match m.subcommand() {
        Some(("add", sub)) => add(conn, user_id, sub)?,
        Some(("edit", sub)) => edit(conn, user_id, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap_or(&0);
            let n = conn.execute(
                "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
                params![id, user_id],
            )?;
            if n == 0 {
                bail!("Transaction #{} not found", id);
            }
            println!("Removed transaction #{}", id);
        }
        Some(("list", sub)) => list(conn, user_id, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let description = required(sub, "description")?.trim();
    let amount = parse_decimal(required(sub, "amount")?)?;
    let category = required(sub, "category")?.trim();
    let date: NaiveDateTime = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?.and_time(NaiveTime::MIN),
        None => Utc::now().naive_utc(),
    };

    let (category_id, kind) = category_for_user(conn, user_id, category)?;
    let amount = kind.signed(amount);

    conn.execute(
        "INSERT INTO transactions(description, amount, date, category_id, user_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            description,
            amount.to_string(),
            date.format(DATETIME_FORMAT).to_string(),
            category_id,
            user_id
        ],
    )?;
    println!(
        "Recorded {} on {} for '{}' ({})",
        fmt_money(&amount),
        date.date(),
        description,
        category
    );
    Ok(())
}

fn edit(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap_or(&0);
    let current: Option<(String, String, i64)> = {
        let mut stmt = conn.prepare(
            "SELECT description, amount, category_id FROM transactions WHERE id=?1 AND user_id=?2",
        )?;
        let mut rows = stmt.query(params![id, user_id])?;
        match rows.next()? {
            Some(r) => Some((r.get(0)?, r.get(1)?, r.get(2)?)),
            None => None,
        }
    };
    let Some((old_description, old_amount, old_category_id)) = current else {
        bail!("Transaction #{} not found", id);
    };

    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim().to_string())
        .unwrap_or(old_description);
    let amount = match sub.get_one::<String>("amount") {
        Some(a) => parse_decimal(a)?,
        None => parse_decimal(&old_amount)?,
    };
    let (category_id, kind) = match sub.get_one::<String>("category") {
        Some(name) => category_for_user(conn, user_id, name.trim())?,
        None => {
            let kind: String = conn.query_row(
                "SELECT type FROM categories WHERE id=?1",
                params![old_category_id],
                |r| r.get(0),
            )?;
            (old_category_id, kind.parse()?)
        }
    };
    let amount = kind.signed(amount);

    conn.execute(
        "UPDATE transactions SET description=?1, amount=?2, category_id=?3 WHERE id=?4 AND user_id=?5",
        params![description, amount.to_string(), category_id, id, user_id],
    )?;
    println!("Updated transaction #{}", id);
    Ok(())
}

fn list(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, user_id, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.description.clone(),
                    r.category.clone(),
                    r.amount.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "Description", "Category", "Amount"], rows)
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub description: String,
    pub category: String,
    pub amount: String,
}

/// The user's transactions, newest first, honouring `--year`, `--month` and
/// `--limit`.
pub fn query_rows(
    conn: &Connection,
    user_id: i64,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let mut sql = String::from(
        "SELECT t.id, t.date, t.description, c.name, t.amount FROM transactions t \
         LEFT JOIN categories c ON t.category_id=c.id WHERE t.user_id=?",
    );
    let mut params_vec: Vec<String> = vec![user_id.to_string()];
    push_period_filter(
        &mut sql,
        &mut params_vec,
        "t.date",
        sub.get_one::<i32>("year").copied(),
        sub.get_one::<u32>("month").copied(),
    );
    sql.push_str(" ORDER BY t.date DESC, t.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let date: String = r.get(1)?;
        let category: Option<String> = r.get(3)?;
        let amount: String = r.get(4)?;
        data.push(TransactionRow {
            id: r.get(0)?,
            date: date.chars().take(10).collect(),
            description: r.get(2)?,
            category: category.unwrap_or_default(),
            amount: fmt_money(&parse_decimal(&amount)?),
        });
    }
    Ok(data)
}
