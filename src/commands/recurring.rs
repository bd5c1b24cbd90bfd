// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{RECURRING_COLUMNS, recurring_from_row};
use crate::models::RecurringTransaction;
use crate::recurring::{Frequency, ProcessingSummary, process_due};
use crate::utils::{
    category_for_user, fmt_money, id_for_user, maybe_print_json, parse_date, parse_decimal,
    pretty_table, required,
};
use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, params};

/// Per-user definition management. `recurring run` is dispatched to [`run`]
/// directly since it spans every user.
pub fn handle(conn: &Connection, user: &str, m: &clap::ArgMatches) -> Result<()> {
    let user_id = id_for_user(conn, user)?;
    match m.subcommand() {
        Some(("add", sub)) => {
            let description = required(sub, "description")?.trim();
            let amount = parse_decimal(required(sub, "amount")?)?;
            let category = required(sub, "category")?.trim();
            let frequency: Frequency = required(sub, "frequency")?.trim().parse()?;
            let start = parse_date(required(sub, "start")?)?;
            let id = add_definition(conn, user_id, description, amount, category, frequency, start)?;
            println!(
                "Scheduled '{}' {} starting {} (#{})",
                description, frequency, start, id
            );
        }
        Some(("list", sub)) => {
            let data = list_definitions(conn, user_id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|d| {
                        vec![
                            d.id.to_string(),
                            d.description,
                            fmt_money(&d.amount),
                            d.frequency,
                            d.start_date.to_string(),
                            d.next_date.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Description", "Amount", "Frequency", "Start", "Next"],
                        rows
                    )
                );
            }
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").context("--id is required")?;
            let n = conn.execute(
                "DELETE FROM recurring_transactions WHERE id=?1 AND user_id=?2",
                params![id, user_id],
            )?;
            if n == 0 {
                bail!("Recurring transaction #{} not found", id);
            }
            println!("Removed recurring transaction #{}", id);
        }
        _ => {}
    }
    Ok(())
}

/// New definitions start with `next_date` equal to `start`.
pub fn add_definition(
    conn: &Connection,
    user_id: i64,
    description: &str,
    amount: rust_decimal::Decimal,
    category: &str,
    frequency: Frequency,
    start: NaiveDate,
) -> Result<i64> {
    if description.is_empty() {
        bail!("Description must not be empty");
    }
    let (category_id, kind) = category_for_user(conn, user_id, category)?;
    let amount = kind.signed(amount);
    conn.execute(
        "INSERT INTO recurring_transactions(description, amount, frequency, start_date, next_date, category_id, user_id)
         VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?6)",
        params![
            description,
            amount.to_string(),
            frequency.as_str(),
            start.to_string(),
            category_id,
            user_id
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_definitions(conn: &Connection, user_id: i64) -> Result<Vec<RecurringTransaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECURRING_COLUMNS} FROM recurring_transactions WHERE user_id=?1 ORDER BY next_date, id"
    ))?;
    let rows = stmt.query_map(params![user_id], recurring_from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

/// The batch trigger: materialize everything due across all users.
pub fn run(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let reference = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Local::now().date_naive(),
    };
    let summary = process_due(conn, reference)
        .with_context(|| format!("Processing recurring transactions due by {}", reference))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summary)? {
        print_summary(&summary);
    }
    Ok(())
}

pub fn print_summary(summary: &ProcessingSummary) {
    println!(
        "Found {} recurring transactions to process.",
        summary.due_count()
    );
    for p in &summary.processed {
        println!("Processed '{}'. Next date: {}", p.description, p.next_date);
    }
    for f in &summary.failed {
        println!("Skipped '{}' (#{}): {}", f.description, f.id, f.reason);
    }
    println!("Done.");
}
