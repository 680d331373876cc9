// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::accounting::schedule::asset_schedule;
use crate::error::AccountingError;
use crate::models::Asset;
use crate::store::{AssetFilter, LedgerStore, SqliteStore};
use crate::utils::{
    fmt_money, get_owner, id_for_property, maybe_print_json, parse_date, parse_decimal, parse_id,
    pretty_table,
};
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("schedule", sub)) => schedule(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Explicit duration wins; otherwise the property's default for the category,
/// which must be a whole number of years.
pub fn resolve_duration(
    store: &dyn LedgerStore,
    property_id: i64,
    category: Option<&str>,
    explicit: Option<u32>,
) -> Result<u32, AccountingError> {
    if let Some(years) = explicit {
        return Ok(years);
    }
    let category = category.ok_or(AccountingError::MissingParameter("duration"))?;
    let months = store
        .find_amortization_default(property_id, category)?
        .ok_or_else(|| {
            AccountingError::NotFound(format!("no default duration for category '{}'", category))
        })?;
    if months % 12 != 0 {
        return Err(AccountingError::validation(format!(
            "default duration for '{}' is {} months, not a whole number of years",
            category, months
        )));
    }
    Ok(months / 12)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let owner = get_owner(conn)?;
    let property_id = id_for_property(conn, &owner, sub.get_one::<String>("property").unwrap())?;
    let label = sub.get_one::<String>("label").unwrap().trim().to_string();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let account = sub.get_one::<String>("account").unwrap().trim().to_string();
    let category = sub
        .get_one::<String>("category")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let store = SqliteStore::new(conn);
    let duration = resolve_duration(
        &store,
        property_id,
        category.as_deref(),
        sub.get_one::<u32>("duration").copied(),
    )?;

    let asset = Asset {
        id: 0,
        owner_id: owner,
        property_id,
        label,
        amount_ht: amount,
        duration_years: duration,
        acquisition_date: date,
        account_code: account,
        category,
    };
    asset.validate()?;
    conn.execute(
        "INSERT INTO assets(owner_id, property_id, label, amount_ht, duration_years, acquisition_date, account_code, category)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
        params![
            asset.owner_id,
            asset.property_id,
            asset.label,
            asset.amount_ht.to_string(),
            asset.duration_years,
            asset.acquisition_date,
            asset.account_code,
            asset.category,
        ],
    )?;
    println!(
        "Added asset #{} '{}' ({} over {} years from {})",
        conn.last_insert_rowid(),
        asset.label,
        fmt_money(&asset.amount_ht),
        asset.duration_years,
        asset.acquisition_date
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let owner = get_owner(conn)?;
    let property_id = match sub.get_one::<String>("property") {
        Some(name) => Some(id_for_property(conn, &owner, name)?),
        None => None,
    };
    let store = SqliteStore::new(conn);
    let assets = store.find_assets(&AssetFilter {
        owner_id: owner,
        property_id,
        acquired_on_or_before: None,
        limit: None,
    })?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &assets)? {
        let rows = assets
            .iter()
            .map(|a| {
                vec![
                    a.id.to_string(),
                    a.label.clone(),
                    fmt_money(&a.amount_ht),
                    a.duration_years.to_string(),
                    a.acquisition_date.to_string(),
                    a.account_code.clone(),
                    a.category.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Label", "Amount HT", "Years", "Acquired", "Account", "Category"],
                rows
            )
        );
    }
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let owner = get_owner(conn)?;
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    let n = conn.execute(
        "DELETE FROM assets WHERE id=?1 AND owner_id=?2",
        params![id, owner],
    )?;
    if n == 0 {
        return Err(anyhow!("Asset {} not found", id));
    }
    println!("Removed asset {}", id);
    Ok(())
}

fn schedule(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let owner = get_owner(conn)?;
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    let store = SqliteStore::new(conn);
    let asset = store
        .find_asset(id)?
        .filter(|a| a.owner_id == owner)
        .with_context(|| format!("Asset {} not found", id))?;
    let lines = asset_schedule(&asset)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &lines)? {
        let rows = lines
            .iter()
            .map(|l| {
                vec![
                    l.year.to_string(),
                    fmt_money(&l.dotation),
                    fmt_money(&l.cumulative),
                    fmt_money(&(asset.amount_ht - l.cumulative)),
                ]
            })
            .collect();
        println!("{} ({})", asset.label, fmt_money(&asset.amount_ht));
        println!(
            "{}",
            pretty_table(&["Year", "Dotation", "Cumulative", "Net value"], rows)
        );
    }
    Ok(())
}
