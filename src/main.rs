// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing::debug;

use pocketledger::{cli, commands, config, db, logging};

fn main() -> Result<()> {
    let dotenv = config::load_dotenv();
    logging::init();
    if let Some(path) = dotenv {
        debug!(path = %path.display(), "loaded .env");
    }

    let cli = cli::build_cli();
    let matches = cli.get_matches();
    let cfg = config::Config::from_matches(&matches)?;

    let mut conn = db::open_or_init(&cfg.db_path)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", cfg.db_path.display());
        }
        Some(("user", sub)) => commands::users::handle(&conn, sub)?,
        Some(("category", sub)) => commands::categories::handle(&conn, cfg.require_user()?, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&conn, cfg.require_user()?, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&conn, cfg.require_user()?, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, cfg.require_user()?, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, cfg.require_user()?, sub)?,
        Some(("recurring", sub)) => match sub.subcommand() {
            Some(("run", run_m)) => commands::recurring::run(&mut conn, run_m)?,
            _ => commands::recurring::handle(&conn, cfg.require_user()?, sub)?,
        },
        Some(("process-recurring", sub)) => commands::recurring::run(&mut conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
