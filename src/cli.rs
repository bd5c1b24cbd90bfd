// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, command, value_parser};

use crate::config::{DB_ENV, USER_ENV};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn period_filters(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("year")
            .long("year")
            .value_parser(value_parser!(i32))
            .help("Calendar year; 0 means all years"),
    )
    .arg(
        Arg::new("month")
            .long("month")
            .value_parser(value_parser!(u32).range(0..=12))
            .help("Month 1-12; 0 means all months"),
    )
}

fn amount_arg() -> Arg {
    Arg::new("amount")
        .long("amount")
        .required(true)
        .allow_hyphen_values(true)
        .help("Amount; the sign follows the category type")
}

fn date_arg(help: &'static str) -> Arg {
    Arg::new("date").long("date").help(help)
}

pub fn build_cli() -> Command {
    command!()
        .name("pocketledger")
        .about("Income/expense tracking with budgets and recurring transactions")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env(DB_ENV)
                .help("Path to the SQLite database"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .short('u')
                .global(true)
                .env(USER_ENV)
                .help("Username the command acts for"),
        )
        .subcommand(Command::new("init").about("Create the database if needed"))
        .subcommand(
            Command::new("user")
                .about("Manage users")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("expense")
                                .value_parser(["expense", "income"]),
                        ),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("rm").arg(Arg::new("name").long("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and edit transactions")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("description").long("description").required(true))
                        .arg(amount_arg())
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(date_arg("YYYY-MM-DD; defaults to now")),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("description").long("description"))
                        .arg(amount_arg().required(false))
                        .arg(Arg::new("category").long("category")),
                )
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(json_flags(period_filters(
                    Command::new("list").arg(
                        Arg::new("limit")
                            .long("limit")
                            .value_parser(value_parser!(usize)),
                    ),
                ))),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly budgets per expense category")
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("year")
                                .long("year")
                                .required(true)
                                .value_parser(value_parser!(i32)),
                        )
                        .arg(
                            Arg::new("month")
                                .long("month")
                                .required(true)
                                .value_parser(value_parser!(u32).range(1..=12)),
                        )
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(amount_arg().help("Budgeted amount")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(
                            Arg::new("year")
                                .long("year")
                                .required(true)
                                .value_parser(value_parser!(i32)),
                        )
                        .arg(
                            Arg::new("month")
                                .long("month")
                                .required(true)
                                .value_parser(value_parser!(u32).range(1..=12)),
                        ),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Totals and dashboards")
                .subcommand(json_flags(period_filters(Command::new("summary"))))
                .subcommand(json_flags(
                    Command::new("dashboard").arg(date_arg("YYYY-MM-DD; defaults to today")),
                )),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(period_filters(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv or json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            )),
        )
        .subcommand(
            Command::new("recurring")
                .about("Recurring transaction definitions")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("description").long("description").required(true))
                        .arg(amount_arg())
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("frequency").long("frequency").required(true))
                        .arg(
                            Arg::new("start")
                                .long("start")
                                .required(true)
                                .help("First occurrence, YYYY-MM-DD"),
                        ),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .long("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                )
                .subcommand(run_command("run")),
        )
        .subcommand(run_command("process-recurring"))
}

fn run_command(name: &'static str) -> Command {
    json_flags(
        Command::new(name)
            .about("Materialize every recurring transaction that is due")
            .arg(date_arg("Reference date, YYYY-MM-DD; defaults to today")),
    )
}
