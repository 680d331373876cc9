// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use std::str::FromStr;

use super::round2;
use crate::error::{AccountingError, Result};
use crate::models::{Asset, month_key};
use crate::store::{AmortizationFilter, AssetFilter, LedgerStore, NewAmortizationPosting, owned_property};

static NOTE_ASSET: Lazy<Regex> = Lazy::new(|| Regex::new(r"asset:(\d+)").expect("static regex"));

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

/// Depreciation for one calendar month of the asset's life.
///
/// Months outside `[acquisition month, acquisition month + duration*12 - 1]`
/// yield zero. The acquisition month is prorated by days owned, counting the
/// acquisition day itself.
pub fn monthly_amount(
    amount_ht: Decimal,
    duration_years: u32,
    acquisition_date: NaiveDate,
    year: i32,
    month: u32,
) -> Result<Decimal> {
    if amount_ht <= Decimal::ZERO {
        return Err(AccountingError::validation(format!(
            "amount must be positive, got {}",
            amount_ht
        )));
    }
    if duration_years == 0 {
        return Err(AccountingError::validation("duration must be at least one year"));
    }
    let dim = days_in_month(year, month)
        .ok_or_else(|| AccountingError::validation(format!("invalid month {}-{}", year, month)))?;

    let total_months = i64::from(duration_years) * 12;
    let month_index = i64::from(year - acquisition_date.year()) * 12
        + (i64::from(month) - i64::from(acquisition_date.month()))
        + 1;
    if month_index < 1 || month_index > total_months {
        return Ok(Decimal::ZERO);
    }

    let monthly_full = amount_ht / Decimal::from(total_months);
    if month_index == 1 {
        let acq_dim = days_in_month(acquisition_date.year(), acquisition_date.month())
            .unwrap_or(dim);
        let owned = i64::from(acq_dim) - i64::from(acquisition_date.day()) + 1;
        let ratio = (Decimal::from(owned) / Decimal::from(acq_dim))
            .clamp(Decimal::ZERO, Decimal::ONE);
        return Ok(round2(monthly_full * ratio));
    }
    Ok(round2(monthly_full))
}

pub fn asset_monthly_amount(asset: &Asset, year: i32, month: u32) -> Result<Decimal> {
    monthly_amount(
        asset.amount_ht,
        asset.duration_years,
        asset.acquisition_date,
        year,
        month,
    )
}

/// Legacy key stored in the note column: `month:YYYY-MM;asset:<id>`.
pub fn posting_note(year: i32, month: u32, asset_id: i64) -> String {
    format!("month:{};asset:{}", month_key(year, month), asset_id)
}

pub fn note_asset_id(note: &str) -> Option<i64> {
    NOTE_ASSET
        .captures(note)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostScope {
    #[default]
    Property,
    Asset,
}

impl FromStr for PostScope {
    type Err = AccountingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "property" => Ok(PostScope::Property),
            "asset" => Ok(PostScope::Asset),
            other => Err(AccountingError::validation(format!(
                "unknown scope '{}', expected property|asset",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostRequest {
    pub owner_id: String,
    pub property_id: i64,
    pub year: i32,
    pub month: u32,
    pub scope: PostScope,
    pub asset_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PostOutcome {
    pub created: usize,
    pub skipped: usize,
}

/// Posts one month of depreciation for a property (or a single asset of it).
///
/// Assets already posted for the month are skipped, as are assets outside
/// their depreciation window. Re-running with the same request creates nothing.
pub fn post_for_month(store: &dyn LedgerStore, req: &PostRequest) -> Result<PostOutcome> {
    if !(1..=12).contains(&req.month) {
        return Err(AccountingError::validation(format!(
            "month must be between 1 and 12, got {}",
            req.month
        )));
    }
    owned_property(store, &req.owner_id, req.property_id)?;

    let assets = match req.scope {
        PostScope::Asset => {
            let asset_id = req.asset_id.ok_or(AccountingError::MissingParameter("asset_id"))?;
            let asset = store
                .find_asset(asset_id)?
                .ok_or_else(|| AccountingError::NotFound(format!("asset {}", asset_id)))?;
            if asset.owner_id != req.owner_id || asset.property_id != req.property_id {
                return Err(AccountingError::Forbidden(format!(
                    "asset {} does not belong to property {}",
                    asset_id, req.property_id
                )));
            }
            vec![asset]
        }
        PostScope::Property => store.find_assets(&AssetFilter {
            owner_id: req.owner_id.clone(),
            property_id: Some(req.property_id),
            acquired_on_or_before: None,
            limit: None,
        })?,
    };

    let key = month_key(req.year, req.month);
    let existing = store.find_amortization_postings(&AmortizationFilter {
        owner_id: req.owner_id.clone(),
        property_id: Some(req.property_id),
        year: req.year,
        month: Some(req.month),
        note_contains: Some(format!("month:{}", key)),
    })?;
    let posted: HashSet<i64> = existing
        .iter()
        .filter_map(|row| {
            row.asset_id
                .or_else(|| row.note.as_deref().and_then(note_asset_id))
        })
        .collect();

    let mut outcome = PostOutcome::default();
    if assets.is_empty() {
        outcome.skipped = existing.len();
        log::info!(
            "property {} {}: no assets, {} existing rows",
            req.property_id,
            key,
            existing.len()
        );
        return Ok(outcome);
    }

    // Reject bad records before writing anything for the month.
    for asset in &assets {
        asset.validate()?;
    }
    for asset in &assets {
        if posted.contains(&asset.id) {
            log::debug!("asset {} already posted for {}", asset.id, key);
            outcome.skipped += 1;
            continue;
        }
        let amount = asset_monthly_amount(asset, req.year, req.month)?;
        if amount <= Decimal::ZERO {
            log::debug!("asset {} outside depreciation window for {}", asset.id, key);
            outcome.skipped += 1;
            continue;
        }
        let created = store.create_amortization_posting(&NewAmortizationPosting {
            owner_id: req.owner_id.clone(),
            property_id: req.property_id,
            year: req.year,
            month: Some(req.month),
            asset_id: Some(asset.id),
            amount,
            note: Some(posting_note(req.year, req.month, asset.id)),
        })?;
        match created {
            Some(row) => {
                log::debug!("posted {} for asset {} ({}) as row {}", amount, asset.id, key, row.id);
                outcome.created += 1;
            }
            None => {
                log::debug!("asset {} posted concurrently for {}", asset.id, key);
                outcome.skipped += 1;
            }
        }
    }
    log::info!(
        "property {} {}: {} created, {} skipped",
        req.property_id,
        key,
        outcome.created,
        outcome.skipped
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounting::schedule::{dotation_for_year, linear_schedule};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn window_bounds() {
        let acq = d(2024, 4, 1);
        assert_eq!(monthly_amount(dec!(12000), 5, acq, 2024, 3).unwrap(), Decimal::ZERO);
        assert_eq!(monthly_amount(dec!(12000), 5, acq, 2024, 4).unwrap(), dec!(200));
        assert_eq!(monthly_amount(dec!(12000), 5, acq, 2029, 3).unwrap(), dec!(200));
        assert_eq!(monthly_amount(dec!(12000), 5, acq, 2029, 4).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn first_month_is_prorated_by_days_owned() {
        // 16 of 30 April days
        let v = monthly_amount(dec!(12000), 5, d(2024, 4, 15), 2024, 4).unwrap();
        assert_eq!(v, dec!(106.67));
        // last day of a month owns one day
        let v = monthly_amount(dec!(3100), 1, d(2025, 1, 31), 2025, 1).unwrap();
        assert_eq!(v, round2(dec!(3100) / dec!(12) / dec!(31)));
        let v = monthly_amount(dec!(12000), 5, d(2024, 4, 15), 2024, 5).unwrap();
        assert_eq!(v, dec!(200));
    }

    #[test]
    fn twelve_months_match_annual_dotation() {
        let acq = d(2023, 1, 1);
        let schedule = linear_schedule(dec!(10000), 10, acq).unwrap();
        for year in [2023, 2025, 2030] {
            let sum: Decimal = (1..=12)
                .map(|m| monthly_amount(dec!(10000), 10, acq, year, m).unwrap())
                .sum();
            let annual = dotation_for_year(&schedule, year);
            assert!((sum - annual).abs() <= dec!(0.06), "{}: {} vs {}", year, sum, annual);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        // The year after acquisition is fully inside the window once the
        // duration is at least two years, so every month is a full month.
        #[test]
        fn prop_full_year_of_months_tracks_annual_share(
            cents in 1i64..=1_000_000_000i64,
            years in 2u32..=50,
            (y, ordinal) in (1990i32..2100, 1u32..=365),
        ) {
            let amount = Decimal::new(cents, 2);
            let acq = NaiveDate::from_yo_opt(y, ordinal).unwrap();
            let year = acq.year() + 1;
            let full = round2(amount / Decimal::from(years * 12));
            let mut sum = Decimal::ZERO;
            for m in 1..=12 {
                let v = monthly_amount(amount, years, acq, year, m).unwrap();
                prop_assert_eq!(v, full);
                sum += v;
            }
            let exact = amount / Decimal::from(years);
            prop_assert!((sum - exact).abs() <= dec!(0.06), "{} vs {}", sum, exact);
        }

        #[test]
        fn prop_outside_window_is_zero(
            cents in 1i64..=1_000_000_000i64,
            years in 1u32..=50,
            (y, ordinal) in (1990i32..2040, 1u32..=365),
        ) {
            let amount = Decimal::new(cents, 2);
            let acq = NaiveDate::from_yo_opt(y, ordinal).unwrap();
            let before = acq.with_day(1).unwrap().pred_opt().unwrap();
            prop_assert_eq!(
                monthly_amount(amount, years, acq, before.year(), before.month()).unwrap(),
                Decimal::ZERO
            );
            // first month after the window
            let end_year = acq.year() + years as i32;
            prop_assert_eq!(
                monthly_amount(amount, years, acq, end_year, acq.month()).unwrap(),
                Decimal::ZERO
            );
        }
    }

    #[test]
    fn rejects_bad_month() {
        assert!(matches!(
            monthly_amount(dec!(100), 1, d(2024, 1, 1), 2024, 13),
            Err(AccountingError::Validation(_))
        ));
    }

    #[test]
    fn note_round_trip() {
        let note = posting_note(2025, 3, 42);
        assert_eq!(note, "month:2025-03;asset:42");
        assert_eq!(note_asset_id(&note), Some(42));
        assert_eq!(note_asset_id("month:2025-03"), None);
    }

    #[test]
    fn days_in_february() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2025, 2), Some(28));
        assert_eq!(days_in_month(2025, 12), Some(31));
        assert_eq!(days_in_month(2025, 0), None);
    }
}
