// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::accounting::forms::{form_2033a, form_2033c, form_2033e};
use crate::commands::reports::load_from_args;
use crate::utils::{fmt_money, get_row_cap, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub)) = m.subcommand() else {
        return Ok(());
    };
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let cap = get_row_cap(conn)?;
    let inputs = load_from_args(conn, sub, Some(cap.saturating_add(1)))?;

    let truncated = match name {
        "2033a" => {
            let f = form_2033a(&inputs.assets, &inputs.postings, inputs.year, cap)?;
            if !maybe_print_json(json_flag, jsonl_flag, &f)? {
                let data = vec![
                    vec!["Immobilisations brutes".into(), fmt_money(&f.gross)],
                    vec!["Amortissements".into(), fmt_money(&f.cumulative)],
                    vec!["Immobilisations nettes".into(), fmt_money(&f.net)],
                    vec!["Disponibilités".into(), fmt_money(&f.cash)],
                    vec!["Total actif".into(), fmt_money(&f.total_actif)],
                    vec!["Dépôts de garantie reçus".into(), fmt_money(&f.deposits)],
                    vec!["Total passif".into(), fmt_money(&f.total_passif)],
                ];
                println!("{}", pretty_table(&["2033-A", "EUR"], data));
            }
            f.truncated
        }
        "2033c" => {
            let f = form_2033c(&inputs.assets, &inputs.postings, inputs.year, cap)?;
            if !maybe_print_json(json_flag, jsonl_flag, &f)? {
                let mut data: Vec<Vec<String>> = f
                    .rubriques
                    .iter()
                    .map(|(name, t)| {
                        vec![
                            format!("{} ({})", t.label, name),
                            fmt_money(&t.total_debit),
                            fmt_money(&t.total_credit),
                        ]
                    })
                    .collect();
                data.push(vec![
                    "Résultat courant".into(),
                    String::new(),
                    fmt_money(&f.resultat_courant),
                ]);
                data.push(vec![
                    "Dotations aux amortissements".into(),
                    fmt_money(&f.dotations),
                    String::new(),
                ]);
                data.push(vec!["Résultat".into(), String::new(), fmt_money(&f.resultat)]);
                println!("{}", pretty_table(&["2033-C", "Debit", "Credit"], data));
            }
            f.truncated
        }
        "2033e" => {
            let f = form_2033e(&inputs.assets, inputs.year, cap)?;
            if !maybe_print_json(json_flag, jsonl_flag, &f)? {
                let mut data: Vec<Vec<String>> = f
                    .lines
                    .iter()
                    .map(|l| {
                        vec![
                            l.label.clone(),
                            l.account_code.clone(),
                            fmt_money(&l.amount_ht),
                            fmt_money(&l.prior_cumulative),
                            fmt_money(&l.dotation),
                            fmt_money(&l.new_cumulative),
                            fmt_money(&l.net_value),
                        ]
                    })
                    .collect();
                data.push(vec![
                    "Total".into(),
                    String::new(),
                    fmt_money(&f.total_amount),
                    String::new(),
                    fmt_money(&f.total_dotation),
                    fmt_money(&f.total_cumulative),
                    fmt_money(&f.total_net),
                ]);
                println!(
                    "{}",
                    pretty_table(
                        &["Asset", "Account", "Cost", "Prior", "Dotation", "Cumulative", "Net"],
                        data
                    )
                );
            }
            f.truncated
        }
        _ => false,
    };
    if truncated && !json_flag && !jsonl_flag {
        println!("Warning: input exceeded {} rows, figures are partial", cap);
    }
    Ok(())
}
