// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::accounting::forms::DEFAULT_ROW_CAP;
use crate::models::ReportScope;

pub const DEFAULT_OWNER: &str = "local";

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Parses `YYYY-MM` into (year, month).
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let s = s.trim();
    let d = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok((d.year(), d.month()))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn parse_id(s: &str) -> Result<i64> {
    s.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid id '{}'", s))
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

// Current user; the identity provider is outside this tool.
pub fn get_owner(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, "owner_id")?.unwrap_or_else(|| DEFAULT_OWNER.to_string()))
}

pub fn set_owner(conn: &Connection, owner: &str) -> Result<()> {
    let owner = owner.trim();
    if owner.is_empty() {
        return Err(anyhow!("Owner id must not be empty"));
    }
    set_setting(conn, "owner_id", owner)
}

pub fn get_row_cap(conn: &Connection) -> Result<usize> {
    match get_setting(conn, "row_cap")? {
        Some(s) => s
            .parse::<usize>()
            .with_context(|| format!("Invalid row_cap setting '{}'", s)),
        None => Ok(DEFAULT_ROW_CAP),
    }
}

pub fn set_row_cap(conn: &Connection, cap: usize) -> Result<()> {
    if cap == 0 {
        return Err(anyhow!("Row cap must be positive"));
    }
    set_setting(conn, "row_cap", &cap.to_string())
}

pub fn id_for_property(conn: &Connection, owner: &str, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM properties WHERE owner_id=?1 AND name=?2")?;
    let id: i64 = stmt
        .query_row(params![owner, name.trim()], |r| r.get(0))
        .with_context(|| format!("Property '{}' not found", name.trim()))?;
    Ok(id)
}

/// `--property NAME` narrows to one property, otherwise the whole owner.
pub fn scope_from_args(conn: &Connection, owner: &str, sub: &clap::ArgMatches) -> Result<ReportScope> {
    match sub.get_one::<String>("property") {
        Some(name) => Ok(ReportScope::Property(id_for_property(conn, owner, name)?)),
        None => Ok(ReportScope::User),
    }
}
