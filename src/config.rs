// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

use crate::db;

pub const DB_ENV: &str = "POCKETLEDGER_DB";
pub const USER_ENV: &str = "POCKETLEDGER_USER";

/// Settings resolved from flags, then the environment, then defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub user: Option<String>,
}

impl Config {
    /// Clap already folds `POCKETLEDGER_DB` / `POCKETLEDGER_USER` into the
    /// matches, so only the data-dir default is left to fill in here.
    pub fn from_matches(m: &clap::ArgMatches) -> Result<Self> {
        let db_path = match m.get_one::<String>("db") {
            Some(p) => PathBuf::from(p),
            None => db::default_db_path()?,
        };
        let user = m
            .get_one::<String>("user")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        debug!(db = %db_path.display(), ?user, "resolved configuration");
        Ok(Config { db_path, user })
    }

    pub fn require_user(&self) -> Result<&str> {
        self.user
            .as_deref()
            .with_context(|| format!("No user selected; pass --user or set {}", USER_ENV))
    }
}

/// Load `.env` if present. Missing files are not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}
