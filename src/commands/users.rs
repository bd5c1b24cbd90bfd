// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::User;
use crate::utils::{pretty_table, required};
use anyhow::{Result, bail};
use rusqlite::{Connection, OptionalExtension, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required(sub, "name")?.trim();
            let id = add_user(conn, name)?;
            println!("Added user '{}' (#{})", name, id);
        }
        Some(("list", _)) => {
            let data = list_users(conn)?
                .into_iter()
                .map(|u| vec![u.id.to_string(), u.username])
                .collect();
            println!("{}", pretty_table(&["ID", "Username"], data));
        }
        _ => {}
    }
    Ok(())
}

pub fn add_user(conn: &Connection, username: &str) -> Result<i64> {
    if username.is_empty() {
        bail!("Username must not be empty");
    }
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM users WHERE username=?1",
            params![username],
            |r| r.get(0),
        )
        .optional()?;
    if existing.is_some() {
        bail!("User '{}' already exists", username);
    }
    conn.execute("INSERT INTO users(username) VALUES (?1)", params![username])?;
    Ok(conn.last_insert_rowid())
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare("SELECT id, username, password_hash FROM users ORDER BY username")?;
    let rows = stmt.query_map([], |r| {
        Ok(User {
            id: r.get(0)?,
            username: r.get(1)?,
            password_hash: r.get(2)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}
