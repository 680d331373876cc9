// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn property_arg(required: bool) -> Arg {
    Arg::new("property")
        .long("property")
        .required(required)
        .help("Property name")
}

fn year_arg() -> Arg {
    Arg::new("year")
        .long("year")
        .required(true)
        .value_parser(value_parser!(i32))
        .help("Fiscal year (calendar year)")
}

fn year_report(name: &'static str, about: &'static str) -> Command {
    json_args(
        Command::new(name)
            .about(about)
            .arg(year_arg())
            .arg(property_arg(false)),
    )
}

pub fn build_cli() -> Command {
    Command::new("lmnpbook")
        .about("LMNP bookkeeping: journal, depreciation and 2033 tax forms")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set-owner")
                        .arg(Arg::new("owner").long("owner").required(true)),
                )
                .subcommand(
                    Command::new("set-row-cap").arg(
                        Arg::new("cap")
                            .long("cap")
                            .required(true)
                            .value_parser(value_parser!(usize)),
                    ),
                ),
        )
        .subcommand(
            Command::new("property")
                .about("Manage rental properties")
                .subcommand(
                    Command::new("add").arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("rm").arg(Arg::new("name").long("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("asset")
                .about("Manage depreciable assets")
                .subcommand(
                    Command::new("add")
                        .arg(property_arg(true))
                        .arg(Arg::new("label").long("label").required(true))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .help("Acquisition cost excluding VAT"),
                        )
                        .arg(
                            Arg::new("duration")
                                .long("duration")
                                .value_parser(value_parser!(u32))
                                .help("Duration in years; defaults to the category default"),
                        )
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(
                            Arg::new("account")
                                .long("account")
                                .default_value("2181")
                                .help("Fixed-asset account code"),
                        ),
                )
                .subcommand(json_args(Command::new("list").arg(property_arg(false))))
                .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true)))
                .subcommand(json_args(
                    Command::new("schedule").arg(Arg::new("id").long("id").required(true)),
                )),
        )
        .subcommand(
            Command::new("defaults")
                .about("Default depreciation durations per category")
                .subcommand(
                    Command::new("set")
                        .arg(property_arg(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(
                            Arg::new("months")
                                .long("months")
                                .required(true)
                                .value_parser(value_parser!(u32)),
                        ),
                )
                .subcommand(Command::new("list").arg(property_arg(false))),
        )
        .subcommand(
            Command::new("journal")
                .about("Purchase and sale postings")
                .subcommand(
                    Command::new("add")
                        .arg(property_arg(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(["purchase", "sale"]),
                        )
                        .arg(Arg::new("date").long("date").required(true))
                        .arg(Arg::new("designation").long("designation").required(true))
                        .arg(Arg::new("counterparty").long("counterparty"))
                        .arg(Arg::new("account").long("account").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("deposit")
                                .long("deposit")
                                .action(ArgAction::SetTrue)
                                .help("Security deposit received (sales only)"),
                        ),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(property_arg(false))
                        .arg(
                            Arg::new("year")
                                .long("year")
                                .value_parser(value_parser!(i32)),
                        )
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["purchase", "sale"]),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("import")
                .about("Import postings from CSV")
                .subcommand(
                    Command::new("journal").arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("amortization")
                .about("Monthly depreciation postings")
                .subcommand(json_args(
                    Command::new("post")
                        .arg(property_arg(true))
                        .arg(
                            Arg::new("month")
                                .long("month")
                                .required(true)
                                .help("YYYY-MM"),
                        )
                        .arg(
                            Arg::new("scope")
                                .long("scope")
                                .default_value("property")
                                .value_parser(["property", "asset"]),
                        )
                        .arg(
                            Arg::new("asset")
                                .long("asset")
                                .help("Asset id, required with --scope asset"),
                        ),
                ))
                .subcommand(json_args(
                    Command::new("list").arg(year_arg()).arg(property_arg(false)),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Income statement, balance sheet and rubriques")
                .subcommand(year_report("income", "Revenue, expenses, depreciation, result"))
                .subcommand(year_report("balance", "Simplified balance sheet"))
                .subcommand(year_report("rubriques", "Totals per fiscal rubrique")),
        )
        .subcommand(
            Command::new("form")
                .about("2033 tax form figures")
                .subcommand(year_report("2033a", "Simplified balance sheet (2033-A)"))
                .subcommand(year_report("2033c", "Operating result (2033-C)"))
                .subcommand(year_report("2033e", "Depreciation table (2033-E)")),
        )
        .subcommand(Command::new("doctor").about("Check the books for inconsistencies"))
}
