// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::accounting::monthly::{PostOutcome, PostRequest, PostScope, post_for_month};
use crate::models::{AmortizationPosting, month_key};
use crate::store::{AmortizationFilter, LedgerStore, SqliteStore};
use crate::utils::{
    fmt_money, get_owner, id_for_property, maybe_print_json, parse_id, parse_month, pretty_table,
    scope_from_args,
};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("post", sub)) => {
            let outcome = post(conn, sub)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &outcome)? {
                println!(
                    "Created {} amortization postings, skipped {}",
                    outcome.created, outcome.skipped
                );
            }
        }
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn post(conn: &Connection, sub: &clap::ArgMatches) -> Result<PostOutcome> {
    let owner = get_owner(conn)?;
    let property_id = id_for_property(conn, &owner, sub.get_one::<String>("property").unwrap())?;
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let scope: PostScope = sub
        .get_one::<String>("scope")
        .map(|s| s.parse::<PostScope>())
        .transpose()?
        .unwrap_or_default();
    let asset_id = match sub.get_one::<String>("asset") {
        Some(raw) => Some(parse_id(raw)?),
        None => None,
    };
    let store = SqliteStore::new(conn);
    let outcome = post_for_month(
        &store,
        &PostRequest {
            owner_id: owner,
            property_id,
            year,
            month,
            scope,
            asset_id,
        },
    )?;
    Ok(outcome)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let owner = get_owner(conn)?;
    let scope = scope_from_args(conn, &owner, sub)?;
    let year = *sub.get_one::<i32>("year").unwrap();
    let store = SqliteStore::new(conn);
    let rows: Vec<AmortizationPosting> = store.find_amortization_postings(&AmortizationFilter {
        owner_id: owner,
        property_id: scope.property_id(),
        year,
        month: None,
        note_contains: None,
    })?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        let total: Decimal = rows.iter().map(|r| r.amount).sum();
        let mut data: Vec<Vec<String>> = rows
            .iter()
            .map(|r| {
                vec![
                    r.property_id.to_string(),
                    r.month
                        .map(|m| month_key(r.year, m))
                        .unwrap_or_else(|| r.year.to_string()),
                    r.asset_id.map(|a| a.to_string()).unwrap_or_default(),
                    fmt_money(&r.amount),
                    r.note.clone().unwrap_or_default(),
                ]
            })
            .collect();
        data.push(vec![
            String::new(),
            "Total".into(),
            String::new(),
            fmt_money(&total),
            String::new(),
        ]);
        println!(
            "{}",
            pretty_table(&["Property", "Period", "Asset", "Amount", "Note"], data)
        );
    }
    Ok(())
}
