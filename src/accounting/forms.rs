// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! 2033-A / 2033-C / 2033-E figures for one fiscal (calendar) year.
//!
//! Each builder bounds the number of assets and postings it looks at; when
//! the cap is hit the partial figures come back with `truncated = true`.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::balance::{cash_and_deposits, compute_vnc};
use super::round2;
use super::rubriques::{RubriqueTotal, aggregate, resultat_courant};
use super::schedule::{asset_schedule, cumulative_through, dotation_for_year};
use crate::error::Result;
use crate::models::{Asset, DateRange, JournalPosting, acquired_by_year_end};

pub const DEFAULT_ROW_CAP: usize = 5000;

fn capped<'a, T>(rows: &'a [T], cap: usize, truncated: &mut bool) -> &'a [T] {
    if rows.len() > cap {
        log::warn!("form input truncated to {} of {} rows", cap, rows.len());
        *truncated = true;
        &rows[..cap]
    } else {
        rows
    }
}

fn year_postings(postings: &[JournalPosting], year: i32) -> Vec<JournalPosting> {
    let Some(range) = DateRange::year(year) else {
        return Vec::new();
    };
    postings
        .iter()
        .filter(|p| range.contains(p.date))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Form2033A {
    pub year: i32,
    pub gross: Decimal,
    pub cumulative: Decimal,
    pub net: Decimal,
    pub cash: Decimal,
    pub total_actif: Decimal,
    pub deposits: Decimal,
    pub total_passif: Decimal,
    pub truncated: bool,
}

/// Simplified balance sheet: fixed assets gross / depreciation / net, plus
/// cash and deposits.
pub fn form_2033a(
    assets: &[Asset],
    postings: &[JournalPosting],
    year: i32,
    cap: usize,
) -> Result<Form2033A> {
    let mut truncated = false;
    let held: Vec<Asset> = assets
        .iter()
        .filter(|a| acquired_by_year_end(a, year))
        .cloned()
        .collect();
    let held = capped(&held, cap, &mut truncated);
    let in_year = year_postings(postings, year);
    let in_year = capped(&in_year, cap, &mut truncated);

    let gross = round2(held.iter().map(|a| a.amount_ht).sum());
    let net = compute_vnc(held, year)?;
    let cumulative = round2(gross - net);
    let cd = cash_and_deposits(in_year, year);
    Ok(Form2033A {
        year,
        gross,
        cumulative,
        net,
        cash: cd.cash,
        total_actif: round2(net + cd.cash),
        deposits: cd.deposits,
        total_passif: cd.deposits,
        truncated,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Form2033C {
    pub year: i32,
    pub rubriques: BTreeMap<String, RubriqueTotal>,
    pub resultat_courant: Decimal,
    pub dotations: Decimal,
    pub resultat: Decimal,
    pub unclassified: usize,
    pub truncated: bool,
}

/// Operating result: rubrique totals, résultat courant, then scheduled
/// dotations added back as a charge.
pub fn form_2033c(
    assets: &[Asset],
    postings: &[JournalPosting],
    year: i32,
    cap: usize,
) -> Result<Form2033C> {
    let mut truncated = false;
    let in_year = year_postings(postings, year);
    let in_year = capped(&in_year, cap, &mut truncated);
    let held: Vec<Asset> = assets
        .iter()
        .filter(|a| acquired_by_year_end(a, year))
        .cloned()
        .collect();
    let held = capped(&held, cap, &mut truncated);

    let agg = aggregate(in_year, DateRange::year(year));
    let courant = resultat_courant(&agg.rubriques);
    let mut dotations = Decimal::ZERO;
    for asset in held {
        dotations += dotation_for_year(&asset_schedule(asset)?, year);
    }
    let dotations = round2(dotations);
    Ok(Form2033C {
        year,
        resultat_courant: courant,
        dotations,
        resultat: round2(courant - dotations),
        unclassified: agg.unclassified,
        rubriques: agg.rubriques,
        truncated,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Form2033ELine {
    pub asset_id: i64,
    pub label: String,
    pub account_code: String,
    pub amount_ht: Decimal,
    pub prior_cumulative: Decimal,
    pub dotation: Decimal,
    pub new_cumulative: Decimal,
    pub net_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Form2033E {
    pub year: i32,
    pub lines: Vec<Form2033ELine>,
    pub total_amount: Decimal,
    pub total_dotation: Decimal,
    pub total_cumulative: Decimal,
    pub total_net: Decimal,
    pub truncated: bool,
}

/// Per-asset depreciation table, each line sliced from the asset's schedule
/// at `year - 1` and `year`.
pub fn form_2033e(assets: &[Asset], year: i32, cap: usize) -> Result<Form2033E> {
    let mut truncated = false;
    let held: Vec<Asset> = assets
        .iter()
        .filter(|a| acquired_by_year_end(a, year))
        .cloned()
        .collect();
    let held = capped(&held, cap, &mut truncated);

    let mut lines = Vec::with_capacity(held.len());
    for asset in held {
        let schedule = asset_schedule(asset)?;
        let prior = cumulative_through(&schedule, year - 1);
        let dotation = dotation_for_year(&schedule, year);
        let new_cumulative = round2(prior + dotation);
        lines.push(Form2033ELine {
            asset_id: asset.id,
            label: asset.label.clone(),
            account_code: asset.account_code.clone(),
            amount_ht: asset.amount_ht,
            prior_cumulative: prior,
            dotation,
            new_cumulative,
            net_value: round2((asset.amount_ht - new_cumulative).max(Decimal::ZERO)),
        });
    }
    Ok(Form2033E {
        year,
        total_amount: round2(lines.iter().map(|l| l.amount_ht).sum()),
        total_dotation: round2(lines.iter().map(|l| l.dotation).sum()),
        total_cumulative: round2(lines.iter().map(|l| l.new_cumulative).sum()),
        total_net: round2(lines.iter().map(|l| l.net_value).sum()),
        lines,
        truncated,
    })
}
