// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::accounting::rubriques::classify;
use crate::models::{DateRange, EntryType, JournalPosting};
use crate::store::{LedgerStore, PostingFilter, SqliteStore};
use crate::utils::{
    fmt_money, get_owner, id_for_property, maybe_print_json, parse_date, parse_decimal,
    pretty_table,
};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

pub struct NewPosting<'a> {
    pub property_id: i64,
    pub entry_type: EntryType,
    pub date: NaiveDate,
    pub designation: &'a str,
    pub counterparty: Option<&'a str>,
    pub account_code: &'a str,
    pub amount: Decimal,
    pub is_deposit: bool,
}

/// Checks and inserts one posting; shared by `journal add` and the importer.
pub fn insert_posting(conn: &Connection, owner: &str, p: &NewPosting<'_>) -> Result<i64> {
    if p.amount <= Decimal::ZERO {
        return Err(anyhow!(
            "Amount must be positive, got {} (direction comes from the type)",
            p.amount
        ));
    }
    if p.is_deposit && p.entry_type != EntryType::Sale {
        return Err(anyhow!("Only sales can be flagged as deposits"));
    }
    if p.account_code.trim().is_empty() {
        return Err(anyhow!("Account code must not be empty"));
    }
    if classify(p.account_code).is_none() {
        log::warn!(
            "account {} matches no rubrique; '{}' will be left out of form totals",
            p.account_code,
            p.designation
        );
    }
    conn.execute(
        "INSERT INTO journal_entries(owner_id, property_id, entry_type, date, designation, counterparty, account_code, amount, is_deposit)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
        params![
            owner,
            p.property_id,
            p.entry_type.as_str(),
            p.date,
            p.designation,
            p.counterparty,
            p.account_code.trim(),
            p.amount.to_string(),
            p.is_deposit,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let owner = get_owner(conn)?;
    let property_id = id_for_property(conn, &owner, sub.get_one::<String>("property").unwrap())?;
    let entry_type: EntryType = sub.get_one::<String>("type").unwrap().parse()?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let designation = sub.get_one::<String>("designation").unwrap().trim();
    let counterparty = sub
        .get_one::<String>("counterparty")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());
    let account = sub.get_one::<String>("account").unwrap().trim();

    let id = insert_posting(
        conn,
        &owner,
        &NewPosting {
            property_id,
            entry_type,
            date,
            designation,
            counterparty,
            account_code: account,
            amount,
            is_deposit: sub.get_flag("deposit"),
        },
    )?;
    println!(
        "Recorded {} #{} of {} on {} ({})",
        entry_type, id, amount, date, designation
    );
    Ok(())
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<JournalPosting>> {
    let owner = get_owner(conn)?;
    let property_id = match sub.get_one::<String>("property") {
        Some(name) => Some(id_for_property(conn, &owner, name)?),
        None => None,
    };
    let entry_type = match sub.get_one::<String>("type") {
        Some(t) => Some(t.parse::<EntryType>()?),
        None => None,
    };
    let date_range = match sub.get_one::<i32>("year") {
        Some(y) => Some(DateRange::year(*y).ok_or_else(|| anyhow!("Invalid year {}", y))?),
        None => None,
    };
    let store = SqliteStore::new(conn);
    let mut rows = store.find_postings(&PostingFilter {
        owner_id: owner,
        property_id,
        entry_type,
        date_range,
        is_deposit: None,
        limit: None,
    })?;
    // newest first, like a bank statement
    rows.reverse();
    if let Some(limit) = sub.get_one::<usize>("limit") {
        rows.truncate(*limit);
    }
    Ok(rows)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|p| {
                vec![
                    p.date.to_string(),
                    p.entry_type.to_string(),
                    p.designation.clone(),
                    p.counterparty.clone().unwrap_or_default(),
                    p.account_code.clone(),
                    fmt_money(&p.amount),
                    if p.is_deposit { "yes".into() } else { String::new() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Type", "Designation", "Counterparty", "Account", "Amount", "Deposit"],
                rows,
            )
        );
    }
    Ok(())
}
