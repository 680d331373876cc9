// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("fr.lmnpbook", "Lmnpbook", "lmnpbook"));

/// Environment variable overriding the platform data directory.
pub const DB_ENV: &str = "LMNPBOOK_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("lmnpbook.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    log::debug!("opened {}", path.display());
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS properties(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(owner_id, name)
    );

    CREATE TABLE IF NOT EXISTS assets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL,
        property_id INTEGER NOT NULL,
        label TEXT NOT NULL,
        amount_ht TEXT NOT NULL,
        duration_years INTEGER NOT NULL CHECK(duration_years BETWEEN 1 AND 50),
        acquisition_date TEXT NOT NULL,
        account_code TEXT NOT NULL,
        category TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(property_id) REFERENCES properties(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_assets_property ON assets(owner_id, property_id);

    CREATE TABLE IF NOT EXISTS journal_entries(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL,
        property_id INTEGER NOT NULL,
        entry_type TEXT NOT NULL CHECK(entry_type IN ('purchase','sale')),
        date TEXT NOT NULL,
        designation TEXT NOT NULL,
        counterparty TEXT,
        account_code TEXT NOT NULL,
        amount TEXT NOT NULL,
        is_deposit INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(property_id) REFERENCES properties(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_journal_date ON journal_entries(owner_id, date);

    -- amount in EUR; note keeps the legacy "month:YYYY-MM;asset:<id>" key
    CREATE TABLE IF NOT EXISTS amortizations(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id TEXT NOT NULL,
        property_id INTEGER NOT NULL,
        year INTEGER NOT NULL,
        month INTEGER CHECK(month BETWEEN 1 AND 12),
        asset_id INTEGER,
        amount TEXT NOT NULL,
        note TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(property_id) REFERENCES properties(id) ON DELETE CASCADE
    );
    CREATE UNIQUE INDEX IF NOT EXISTS uq_amortization_period
        ON amortizations(owner_id, property_id, year, month, IFNULL(asset_id, 0))
        WHERE month IS NOT NULL;

    CREATE TABLE IF NOT EXISTS amortization_defaults(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        property_id INTEGER NOT NULL,
        category TEXT NOT NULL,
        duration_months INTEGER NOT NULL CHECK(duration_months > 0),
        UNIQUE(property_id, category),
        FOREIGN KEY(property_id) REFERENCES properties(id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}
