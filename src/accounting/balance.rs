// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Two-sided simplified balance sheet: net book value and cash against
//! deposits held. There is no general ledger behind it, so `other_debts`
//! stays at zero.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;

use super::schedule::{asset_schedule, cumulative_through};
use super::{CENT, round2};
use crate::error::Result;
use crate::models::{Asset, EntryType, JournalPosting, acquired_by_year_end};

/// Net book value (VNC) of every asset acquired by the end of `year`.
pub fn compute_vnc(assets: &[Asset], year: i32) -> Result<Decimal> {
    let mut total = Decimal::ZERO;
    for asset in assets.iter().filter(|a| acquired_by_year_end(a, year)) {
        let schedule = asset_schedule(asset)?;
        let cumulative = cumulative_through(&schedule, year);
        total += (asset.amount_ht - cumulative).max(Decimal::ZERO);
    }
    Ok(round2(total))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CashAndDeposits {
    pub cash: Decimal,
    pub deposits: Decimal,
}

pub fn cash_and_deposits(postings: &[JournalPosting], year: i32) -> CashAndDeposits {
    let mut cash = Decimal::ZERO;
    let mut deposits = Decimal::ZERO;
    for p in postings.iter().filter(|p| p.date.year() == year) {
        match p.entry_type {
            EntryType::Sale if p.is_deposit => deposits += p.amount,
            EntryType::Sale => cash += p.amount,
            EntryType::Purchase => cash -= p.amount,
        }
    }
    CashAndDeposits {
        cash: round2(cash),
        deposits: round2(deposits),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetSide {
    pub vnc: Decimal,
    pub cash: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiabilitySide {
    pub deposits: Decimal,
    pub other_debts: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSheet {
    pub year: i32,
    pub asset: AssetSide,
    pub liability: LiabilitySide,
    pub gap: Decimal,
}

impl BalanceSheet {
    pub fn is_balanced(&self) -> bool {
        self.gap.abs() < CENT
    }
}

pub fn compute_balance(
    assets: &[Asset],
    postings: &[JournalPosting],
    year: i32,
) -> Result<BalanceSheet> {
    let vnc = compute_vnc(assets, year)?;
    let CashAndDeposits { cash, deposits } = cash_and_deposits(postings, year);
    let asset = AssetSide {
        vnc,
        cash,
        total: round2(vnc + cash),
    };
    let other_debts = Decimal::ZERO;
    let liability = LiabilitySide {
        deposits,
        other_debts,
        total: round2(deposits + other_debts),
    };
    let gap = round2(asset.total - liability.total);
    Ok(BalanceSheet {
        year,
        asset,
        liability,
        gap,
    })
}
