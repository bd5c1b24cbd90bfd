// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Category, CategoryKind};
use crate::utils::{category_for_user, id_for_user, maybe_print_json, pretty_table, required};
use anyhow::{Result, bail};
use rusqlite::{Connection, OptionalExtension, params};

pub fn handle(conn: &Connection, user: &str, m: &clap::ArgMatches) -> Result<()> {
    let user_id = id_for_user(conn, user)?;
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required(sub, "name")?.trim();
            let kind: CategoryKind = required(sub, "type")?.parse()?;
            add_category(conn, user_id, name, kind)?;
            println!("Added {} category '{}'", kind, name);
        }
        Some(("list", sub)) => {
            let data = list_categories(conn, user_id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|c| vec![c.kind.to_string(), c.name])
                    .collect();
                println!("{}", pretty_table(&["Type", "Category"], rows));
            }
        }
        Some(("rm", sub)) => {
            let name = required(sub, "name")?.trim();
            remove_category(conn, user_id, name)?;
            println!("Removed category '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

pub fn add_category(conn: &Connection, user_id: i64, name: &str, kind: CategoryKind) -> Result<i64> {
    if name.is_empty() {
        bail!("Category name must not be empty");
    }
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM categories WHERE user_id=?1 AND name=?2",
            params![user_id, name],
            |r| r.get(0),
        )
        .optional()?;
    if existing.is_some() {
        bail!("A category named '{}' already exists", name);
    }
    conn.execute(
        "INSERT INTO categories(name, type, user_id) VALUES (?1, ?2, ?3)",
        params![name, kind.as_str(), user_id],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Income categories first, then expenses, each ordered by name.
pub fn list_categories(conn: &Connection, user_id: i64) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, type, user_id FROM categories WHERE user_id=?1 \
         ORDER BY CASE type WHEN 'income' THEN 0 ELSE 1 END, name",
    )?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, i64>(3)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (id, name, kind, user_id) = row?;
        data.push(Category {
            id,
            name,
            kind: kind.parse()?,
            user_id,
        });
    }
    Ok(data)
}

/// Categories still referenced by a transaction or a recurring definition
/// cannot be removed.
pub fn remove_category(conn: &Connection, user_id: i64, name: &str) -> Result<()> {
    let (cat_id, _) = category_for_user(conn, user_id, name)?;
    let in_use: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM transactions WHERE category_id=?1)
              + (SELECT COUNT(*) FROM recurring_transactions WHERE category_id=?1)",
        params![cat_id],
        |r| r.get(0),
    )?;
    if in_use > 0 {
        bail!(
            "Category '{}' is used by {} transaction(s) and cannot be removed",
            name,
            in_use
        );
    }
    conn.execute(
        "DELETE FROM categories WHERE id=?1 AND user_id=?2",
        params![cat_id, user_id],
    )?;
    Ok(())
}
