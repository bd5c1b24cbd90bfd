// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{fmt_money, id_for_user, parse_decimal, push_period_filter, required};
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, user, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }
    let user_id = id_for_user(conn, user)?;

    let mut sql = String::from(
        "SELECT t.date, t.description, c.name, t.amount
         FROM transactions t
         LEFT JOIN categories c ON t.category_id=c.id
         WHERE t.user_id=?",
    );
    let mut params_vec = vec![user_id.to_string()];
    push_period_filter(
        &mut sql,
        &mut params_vec,
        "t.date",
        sub.get_one::<i32>("year").copied(),
        sub.get_one::<u32>("month").copied(),
    );
    sql.push_str(" ORDER BY t.date, t.id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (d, desc, cat, amt) = row?;
        records.push((
            d.chars().take(10).collect::<String>(),
            desc,
            cat.unwrap_or_default(),
            fmt_money(&parse_decimal(&amt)?),
        ));
    }

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record(["date", "description", "category", "amount"])?;
        for (d, desc, cat, amt) in &records {
            wtr.write_record([d, desc, cat, amt])?;
        }
        wtr.flush()?;
    } else {
        let items: Vec<_> = records
            .iter()
            .map(|(d, desc, cat, amt)| {
                json!({ "date": d, "description": desc, "category": cat, "amount": amt })
            })
            .collect();
        std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
    }
    println!("Exported {} transactions to {}", records.len(), out);
    Ok(())
}
