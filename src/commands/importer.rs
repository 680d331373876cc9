// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::journal::{NewPosting, insert_posting};
use crate::models::EntryType;
use crate::utils::{get_owner, id_for_property, parse_date, parse_decimal};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use rusqlite::Connection;
use std::collections::{HashMap, hash_map::Entry};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("journal", sub)) => import_journal(conn, sub),
        _ => Ok(()),
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "n" => Ok(false),
        "1" | "true" | "yes" | "y" => Ok(true),
        other => Err(anyhow!("Invalid deposit flag '{}'", other)),
    }
}

/// Columns: date,type,designation,counterparty,account,amount,property,deposit
fn import_journal(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let owner = get_owner(conn)?;
    let tx = conn.transaction()?;
    let mut property_cache: HashMap<String, i64> = HashMap::new();
    let mut count = 0usize;

    for (line, result) in rdr.records().enumerate() {
        let rec = result?;
        let row = line + 2;
        let date_raw = rec.get(0).context("date missing")?.trim();
        let type_raw = rec.get(1).context("type missing")?.trim();
        let designation = rec.get(2).context("designation missing")?.trim();
        let counterparty = rec.get(3).map(|s| s.trim()).filter(|s| !s.is_empty());
        let account = rec.get(4).context("account missing")?.trim();
        let amount_raw = rec.get(5).context("amount missing")?.trim();
        let property = rec.get(6).context("property missing")?.trim().to_string();
        let deposit = parse_flag(rec.get(7).unwrap_or(""))
            .with_context(|| format!("Row {}", row))?;

        let date = parse_date(date_raw).with_context(|| format!("Row {}", row))?;
        let entry_type = type_raw
            .parse::<EntryType>()
            .with_context(|| format!("Row {}", row))?;
        let amount = parse_decimal(amount_raw)
            .with_context(|| format!("Invalid amount '{}' for {}", amount_raw, designation))?;

        let property_id = match property_cache.entry(property.clone()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let fetched = id_for_property(&tx, &owner, &property)?;
                *entry.insert(fetched)
            }
        };

        insert_posting(
            &tx,
            &owner,
            &NewPosting {
                property_id,
                entry_type,
                date,
                designation,
                counterparty,
                account_code: account,
                amount,
                is_deposit: deposit,
            },
        )
        .with_context(|| format!("Row {}", row))?;
        count += 1;
    }
    tx.commit()?;
    log::info!("imported {} postings from {}", count, path);
    println!("Imported {} postings from {}", count, path);
    Ok(())
}
