// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

use crate::models::CategoryKind;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

/// Value of a required argument. Clap enforces presence, this only turns a
/// wiring mistake into an error instead of a panic.
pub fn required<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a String> {
    m.get_one::<String>(name)
        .ok_or_else(|| anyhow!("Missing required argument --{}", name))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn id_for_user(conn: &Connection, username: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM users WHERE username=?1")?;
    let id: i64 = stmt
        .query_row(params![username], |r| r.get(0))
        .with_context(|| format!("User '{}' not found", username))?;
    Ok(id)
}

/// Look up one of `user_id`'s categories by name.
pub fn category_for_user(
    conn: &Connection,
    user_id: i64,
    name: &str,
) -> Result<(i64, CategoryKind)> {
    let mut stmt = conn.prepare("SELECT id, type FROM categories WHERE user_id=?1 AND name=?2")?;
    let (id, kind): (i64, String) = stmt
        .query_row(params![user_id, name], |r| Ok((r.get(0)?, r.get(1)?)))
        .with_context(|| format!("Category '{}' not found", name))?;
    Ok((id, kind.parse()?))
}

/// Append `year`/`month` filters on `column` (a `YYYY-MM-DD...` text column).
/// A value of 0 or no value at all leaves that part unfiltered.
pub fn push_period_filter(
    sql: &mut String,
    params_vec: &mut Vec<String>,
    column: &str,
    year: Option<i32>,
    month: Option<u32>,
) {
    if let Some(y) = year.filter(|y| *y != 0) {
        sql.push_str(&format!(" AND substr({},1,4)=?", column));
        params_vec.push(format!("{:04}", y));
    }
    if let Some(m) = month.filter(|m| *m != 0) {
        sql.push_str(&format!(" AND substr({},6,2)=?", column));
        params_vec.push(format!("{:02}", m));
    }
}

/// First day of the given month and of the month after it.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow!("Invalid month {}-{:02}", year, month))?;
    let end = start
        .checked_add_months(chrono::Months::new(1))
        .ok_or_else(|| anyhow!("Month {}-{:02} is out of range", year, month))?;
    Ok((start, end))
}
