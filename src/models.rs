// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AccountingError;

pub const MAX_DURATION_YEARS: u32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: i64,
    pub owner_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub owner_id: String,
    pub property_id: i64,
    pub label: String,
    pub amount_ht: Decimal,
    pub duration_years: u32,
    pub acquisition_date: NaiveDate,
    pub account_code: String,
    pub category: Option<String>,
}

impl Asset {
    /// Checks the bounds a stored asset must satisfy before it is scheduled.
    pub fn validate(&self) -> Result<(), AccountingError> {
        if self.amount_ht <= Decimal::ZERO {
            return Err(AccountingError::validation(format!(
                "asset '{}': amount must be positive, got {}",
                self.label, self.amount_ht
            )));
        }
        if self.duration_years == 0 || self.duration_years > MAX_DURATION_YEARS {
            return Err(AccountingError::validation(format!(
                "asset '{}': duration must be between 1 and {} years, got {}",
                self.label, MAX_DURATION_YEARS, self.duration_years
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Purchase,
    Sale,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Purchase => "purchase",
            EntryType::Sale => "sale",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = AccountingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "purchase" | "achat" => Ok(EntryType::Purchase),
            "sale" | "vente" => Ok(EntryType::Sale),
            other => Err(AccountingError::validation(format!(
                "unknown entry type '{}', expected purchase|sale",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalPosting {
    pub id: i64,
    pub owner_id: String,
    pub property_id: i64,
    pub entry_type: EntryType,
    pub date: NaiveDate,
    pub designation: String,
    pub counterparty: Option<String>,
    pub account_code: String,
    pub amount: Decimal, // sign-free, direction from entry_type
    pub is_deposit: bool,
}

impl JournalPosting {
    pub fn is_revenue(&self) -> bool {
        self.entry_type == EntryType::Sale && !self.is_deposit
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationPosting {
    pub id: i64,
    pub owner_id: String,
    pub property_id: i64,
    pub year: i32,
    pub month: Option<u32>,
    pub asset_id: Option<i64>,
    pub amount: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationDefault {
    pub property_id: i64,
    pub category: String,
    pub duration_months: u32,
}

/// Inclusive calendar date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn year(year: i32) -> Option<Self> {
        Some(DateRange {
            from: NaiveDate::from_ymd_opt(year, 1, 1)?,
            to: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

/// Whether figures cover one property or every property of the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportScope {
    User,
    Property(i64),
}

impl ReportScope {
    pub fn property_id(&self) -> Option<i64> {
        match self {
            ReportScope::User => None,
            ReportScope::Property(id) => Some(*id),
        }
    }

    pub fn includes(&self, property_id: i64) -> bool {
        match self {
            ReportScope::User => true,
            ReportScope::Property(id) => *id == property_id,
        }
    }
}

/// Key used in amortization notes, e.g. `2025-03`.
pub fn month_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

pub fn year_end(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 12, 31)
}

pub fn acquired_by_year_end(asset: &Asset, year: i32) -> bool {
    asset.acquisition_date.year() <= year
}
