// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read/write boundary between the accounting engine and the database.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::error::{AccountingError, Result};
use crate::models::{
    AmortizationPosting, Asset, DateRange, EntryType, JournalPosting, Property,
};

#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    pub owner_id: String,
    pub property_id: Option<i64>,
    pub acquired_on_or_before: Option<NaiveDate>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct PostingFilter {
    pub owner_id: String,
    pub property_id: Option<i64>,
    pub entry_type: Option<EntryType>,
    pub date_range: Option<DateRange>,
    pub is_deposit: Option<bool>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct AmortizationFilter {
    pub owner_id: String,
    pub property_id: Option<i64>,
    pub year: i32,
    pub month: Option<u32>,
    pub note_contains: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAmortizationPosting {
    pub owner_id: String,
    pub property_id: i64,
    pub year: i32,
    pub month: Option<u32>,
    pub asset_id: Option<i64>,
    pub amount: Decimal,
    pub note: Option<String>,
}

pub trait LedgerStore {
    fn find_property(&self, id: i64) -> Result<Option<Property>>;
    fn find_asset(&self, id: i64) -> Result<Option<Asset>>;
    fn find_assets(&self, filter: &AssetFilter) -> Result<Vec<Asset>>;
    fn find_postings(&self, filter: &PostingFilter) -> Result<Vec<JournalPosting>>;
    fn find_amortization_postings(
        &self,
        filter: &AmortizationFilter,
    ) -> Result<Vec<AmortizationPosting>>;
    /// Returns `None` when a row already holds the same
    /// (owner, property, year, month, asset) key.
    fn create_amortization_posting(
        &self,
        record: &NewAmortizationPosting,
    ) -> Result<Option<AmortizationPosting>>;
    fn find_amortization_default(&self, property_id: i64, category: &str) -> Result<Option<u32>>;
}

pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        SqliteStore { conn }
    }
}

fn decimal_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.parse::<Decimal>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn entry_type_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<EntryType> {
    let s: String = r.get(idx)?;
    s.parse::<EntryType>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

const ASSET_COLS: &str = "id, owner_id, property_id, label, amount_ht, duration_years, acquisition_date, account_code, category";

fn asset_row(r: &Row<'_>) -> rusqlite::Result<Asset> {
    Ok(Asset {
        id: r.get(0)?,
        owner_id: r.get(1)?,
        property_id: r.get(2)?,
        label: r.get(3)?,
        amount_ht: decimal_col(r, 4)?,
        duration_years: r.get(5)?,
        acquisition_date: r.get(6)?,
        account_code: r.get(7)?,
        category: r.get(8)?,
    })
}

fn posting_row(r: &Row<'_>) -> rusqlite::Result<JournalPosting> {
    Ok(JournalPosting {
        id: r.get(0)?,
        owner_id: r.get(1)?,
        property_id: r.get(2)?,
        entry_type: entry_type_col(r, 3)?,
        date: r.get(4)?,
        designation: r.get(5)?,
        counterparty: r.get(6)?,
        account_code: r.get(7)?,
        amount: decimal_col(r, 8)?,
        is_deposit: r.get(9)?,
    })
}

fn amortization_row(r: &Row<'_>) -> rusqlite::Result<AmortizationPosting> {
    Ok(AmortizationPosting {
        id: r.get(0)?,
        owner_id: r.get(1)?,
        property_id: r.get(2)?,
        year: r.get(3)?,
        month: r.get(4)?,
        asset_id: r.get(5)?,
        amount: decimal_col(r, 6)?,
        note: r.get(7)?,
    })
}

// "WHERE 1=1 AND ..." builder shared by the finders below.
struct Query {
    sql: String,
    params: Vec<Box<dyn rusqlite::ToSql>>,
    limit: Option<usize>,
}

impl Query {
    fn new(base: &str) -> Self {
        Query {
            sql: format!("{} WHERE 1=1", base),
            params: Vec::new(),
            limit: None,
        }
    }

    fn and(&mut self, clause: &str, value: impl rusqlite::ToSql + 'static) {
        self.sql.push_str(" AND ");
        self.sql.push_str(clause);
        self.params.push(Box::new(value));
    }

    fn run<T>(
        mut self,
        conn: &Connection,
        order: &str,
        f: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        self.sql.push_str(" ORDER BY ");
        self.sql.push_str(order);
        if let Some(n) = self.limit {
            self.sql.push_str(" LIMIT ?");
            self.params.push(Box::new(i64::try_from(n).unwrap_or(i64::MAX)));
        }
        let mut stmt = conn.prepare(&self.sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(self.params.iter().map(|p| p.as_ref())),
            f,
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

impl LedgerStore for SqliteStore<'_> {
    fn find_property(&self, id: i64) -> Result<Option<Property>> {
        let p = self
            .conn
            .query_row(
                "SELECT id, owner_id, name FROM properties WHERE id=?1",
                params![id],
                |r| {
                    Ok(Property {
                        id: r.get(0)?,
                        owner_id: r.get(1)?,
                        name: r.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(p)
    }

    fn find_asset(&self, id: i64) -> Result<Option<Asset>> {
        let a = self
            .conn
            .query_row(
                &format!("SELECT {} FROM assets WHERE id=?1", ASSET_COLS),
                params![id],
                asset_row,
            )
            .optional()?;
        Ok(a)
    }

    fn find_assets(&self, filter: &AssetFilter) -> Result<Vec<Asset>> {
        let mut q = Query::new(&format!("SELECT {} FROM assets", ASSET_COLS));
        q.and("owner_id=?", filter.owner_id.clone());
        if let Some(pid) = filter.property_id {
            q.and("property_id=?", pid);
        }
        if let Some(d) = filter.acquired_on_or_before {
            q.and("acquisition_date<=?", d);
        }
        q.limit = filter.limit;
        q.run(self.conn, "acquisition_date, id", asset_row)
    }

    fn find_postings(&self, filter: &PostingFilter) -> Result<Vec<JournalPosting>> {
        let mut q = Query::new(
            "SELECT id, owner_id, property_id, entry_type, date, designation, counterparty, account_code, amount, is_deposit FROM journal_entries",
        );
        q.and("owner_id=?", filter.owner_id.clone());
        if let Some(pid) = filter.property_id {
            q.and("property_id=?", pid);
        }
        if let Some(t) = filter.entry_type {
            q.and("entry_type=?", t.as_str());
        }
        if let Some(range) = filter.date_range {
            q.and("date>=?", range.from);
            q.and("date<=?", range.to);
        }
        if let Some(dep) = filter.is_deposit {
            q.and("is_deposit=?", dep);
        }
        q.limit = filter.limit;
        q.run(self.conn, "date, id", posting_row)
    }

    fn find_amortization_postings(
        &self,
        filter: &AmortizationFilter,
    ) -> Result<Vec<AmortizationPosting>> {
        let mut q = Query::new(
            "SELECT id, owner_id, property_id, year, month, asset_id, amount, note FROM amortizations",
        );
        q.and("owner_id=?", filter.owner_id.clone());
        q.and("year=?", filter.year);
        if let Some(pid) = filter.property_id {
            q.and("property_id=?", pid);
        }
        match (filter.month, &filter.note_contains) {
            (Some(m), Some(needle)) => {
                q.and("(month=? OR instr(IFNULL(note,''), ?) > 0)", m);
                q.params.push(Box::new(needle.clone()));
            }
            (Some(m), None) => q.and("month=?", m),
            (None, Some(needle)) => q.and("instr(IFNULL(note,''), ?) > 0", needle.clone()),
            (None, None) => {}
        }
        q.run(self.conn, "id", amortization_row)
    }

    fn create_amortization_posting(
        &self,
        record: &NewAmortizationPosting,
    ) -> Result<Option<AmortizationPosting>> {
        let changed = self.conn.execute(
            "INSERT INTO amortizations(owner_id, property_id, year, month, asset_id, amount, note)
             VALUES (?1,?2,?3,?4,?5,?6,?7)
             ON CONFLICT DO NOTHING",
            params![
                record.owner_id,
                record.property_id,
                record.year,
                record.month,
                record.asset_id,
                record.amount.to_string(),
                record.note,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Ok(Some(AmortizationPosting {
            id: self.conn.last_insert_rowid(),
            owner_id: record.owner_id.clone(),
            property_id: record.property_id,
            year: record.year,
            month: record.month,
            asset_id: record.asset_id,
            amount: record.amount,
            note: record.note.clone(),
        }))
    }

    fn find_amortization_default(&self, property_id: i64, category: &str) -> Result<Option<u32>> {
        let months: Option<u32> = self
            .conn
            .query_row(
                "SELECT duration_months FROM amortization_defaults WHERE property_id=?1 AND category=?2",
                params![property_id, category],
                |r| r.get(0),
            )
            .optional()?;
        Ok(months)
    }
}

/// Fails with `Forbidden` unless `property_id` exists and belongs to `owner_id`.
pub fn owned_property(
    store: &dyn LedgerStore,
    owner_id: &str,
    property_id: i64,
) -> Result<Property> {
    match store.find_property(property_id)? {
        Some(p) if p.owner_id == owner_id => Ok(p),
        Some(_) => Err(AccountingError::Forbidden(format!(
            "property {} does not belong to {}",
            property_id, owner_id
        ))),
        None => Err(AccountingError::NotFound(format!("property {}", property_id))),
    }
}
