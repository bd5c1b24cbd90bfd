// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, Row, params, types::Type};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors;
use crate::models::RecurringTransaction;
use crate::recurring::{RecurrenceStore, StagedBatch};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Pocketledger", "pocketledger"));

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("pocketledger.sqlite"))
}

pub fn open_or_init(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS users(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        type TEXT NOT NULL DEFAULT 'expense' CHECK(type IN ('expense','income')),
        user_id INTEGER NOT NULL,
        UNIQUE(user_id, name),
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        description TEXT NOT NULL,
        amount TEXT NOT NULL,
        date TEXT NOT NULL,
        category_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        FOREIGN KEY(category_id) REFERENCES categories(id),
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount TEXT NOT NULL,
        month INTEGER NOT NULL CHECK(month BETWEEN 1 AND 12),
        year INTEGER NOT NULL,
        category_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        UNIQUE(user_id, category_id, year, month),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    -- frequency is free text on purpose: unknown tags are reported per row
    CREATE TABLE IF NOT EXISTS recurring_transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        description TEXT NOT NULL,
        amount TEXT NOT NULL,
        frequency TEXT NOT NULL,
        start_date TEXT NOT NULL,
        next_date TEXT NOT NULL,
        category_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        FOREIGN KEY(category_id) REFERENCES categories(id),
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_recurring_next_date ON recurring_transactions(next_date);
    "#,
    )?;
    Ok(())
}

/// Read a decimal stored as TEXT in column `idx`.
pub fn decimal_column(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = r.get(idx)?;
    raw.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub const RECURRING_COLUMNS: &str =
    "id, description, amount, frequency, start_date, next_date, category_id, user_id";

pub fn recurring_from_row(r: &Row<'_>) -> rusqlite::Result<RecurringTransaction> {
    Ok(RecurringTransaction {
        id: r.get(0)?,
        description: r.get(1)?,
        amount: decimal_column(r, 2)?,
        frequency: r.get(3)?,
        start_date: r.get(4)?,
        next_date: r.get(5)?,
        category_id: r.get(6)?,
        user_id: r.get(7)?,
    })
}

impl RecurrenceStore for Connection {
    fn due_definitions(&self, reference: NaiveDate) -> errors::Result<Vec<RecurringTransaction>> {
        let mut stmt = self.prepare(&format!(
            "SELECT {RECURRING_COLUMNS} FROM recurring_transactions \
             WHERE next_date <= ?1 ORDER BY next_date, id"
        ))?;
        let rows = stmt.query_map(params![reference.to_string()], recurring_from_row)?;
        let mut due = Vec::new();
        for row in rows {
            due.push(row?);
        }
        Ok(due)
    }

    fn commit(&mut self, batch: &StagedBatch) -> errors::Result<()> {
        let tx = self.transaction()?;
        {
            let mut insert = tx.prepare_cached(
                "INSERT INTO transactions(description, amount, date, category_id, user_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for t in &batch.transactions {
                insert.execute(params![
                    t.description,
                    t.amount.to_string(),
                    t.date.format(DATETIME_FORMAT).to_string(),
                    t.category_id,
                    t.user_id
                ])?;
            }

            let mut advance = tx.prepare_cached(
                "UPDATE recurring_transactions SET next_date=?1 WHERE id=?2 AND next_date=?3",
            )?;
            for a in &batch.advances {
                let changed =
                    advance.execute(params![a.next.to_string(), a.id, a.previous.to_string()])?;
                if changed != 1 {
                    return Err(errors::Error::StaleDefinition(a.id));
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}
