// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::accounting::balance::compute_balance;
use crate::accounting::income::{DepreciationSource, income_statement};
use crate::accounting::rubriques::{aggregate, resultat_courant};
use crate::models::{AmortizationPosting, Asset, DateRange, JournalPosting, ReportScope, year_end};
use crate::store::{AmortizationFilter, AssetFilter, LedgerStore, PostingFilter, SqliteStore};
use crate::utils::{fmt_money, get_owner, maybe_print_json, pretty_table, scope_from_args};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("income", sub)) => income(conn, sub)?,
        Some(("balance", sub)) => balance(conn, sub)?,
        Some(("rubriques", sub)) => rubriques(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Everything a yearly report reads from the store.
pub struct YearInputs {
    pub year: i32,
    pub scope: ReportScope,
    pub assets: Vec<Asset>,
    pub postings: Vec<JournalPosting>,
    pub amortizations: Vec<AmortizationPosting>,
}

/// `row_limit` bounds how many assets and postings are read; the forms pass
/// their cap plus one so truncation stays detectable.
pub fn load_year(
    store: &dyn LedgerStore,
    owner: &str,
    scope: ReportScope,
    year: i32,
    row_limit: Option<usize>,
) -> Result<YearInputs> {
    let range = DateRange::year(year).ok_or_else(|| anyhow!("Invalid year {}", year))?;
    let assets = store.find_assets(&AssetFilter {
        owner_id: owner.to_string(),
        property_id: scope.property_id(),
        acquired_on_or_before: year_end(year),
        limit: row_limit,
    })?;
    let postings = store.find_postings(&PostingFilter {
        owner_id: owner.to_string(),
        property_id: scope.property_id(),
        entry_type: None,
        date_range: Some(range),
        is_deposit: None,
        limit: row_limit,
    })?;
    let amortizations = store.find_amortization_postings(&AmortizationFilter {
        owner_id: owner.to_string(),
        property_id: scope.property_id(),
        year,
        month: None,
        note_contains: None,
    })?;
    log::debug!(
        "{} {:?}: {} assets, {} postings, {} amortization rows",
        year,
        scope,
        assets.len(),
        postings.len(),
        amortizations.len()
    );
    Ok(YearInputs {
        year,
        scope,
        assets,
        postings,
        amortizations,
    })
}

pub fn load_from_args(
    conn: &Connection,
    sub: &clap::ArgMatches,
    row_limit: Option<usize>,
) -> Result<YearInputs> {
    let owner = get_owner(conn)?;
    let scope = scope_from_args(conn, &owner, sub)?;
    let year = *sub.get_one::<i32>("year").unwrap();
    load_year(&SqliteStore::new(conn), &owner, scope, year, row_limit)
}

fn income(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let inputs = load_from_args(conn, sub, None)?;
    let s = income_statement(
        &inputs.postings,
        &inputs.amortizations,
        &inputs.assets,
        inputs.year,
        inputs.scope,
    )?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let data = vec![
            vec!["Revenue".into(), fmt_money(&s.revenue)],
            vec!["Expenses".into(), fmt_money(&s.expense)],
            vec![
                match s.depreciation_source {
                    DepreciationSource::Posted => "Depreciation (posted)".into(),
                    DepreciationSource::Scheduled => "Depreciation (scheduled)".into(),
                },
                fmt_money(&s.depreciation),
            ],
            vec!["Result".into(), fmt_money(&s.result)],
        ];
        let year = s.year.to_string();
        println!("{}", pretty_table(&[year.as_str(), "EUR"], data));
    }
    Ok(())
}

fn balance(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let inputs = load_from_args(conn, sub, None)?;
    let b = compute_balance(&inputs.assets, &inputs.postings, inputs.year)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &b)? {
        let data = vec![
            vec![
                "Net book value".into(),
                fmt_money(&b.asset.vnc),
                "Deposits held".into(),
                fmt_money(&b.liability.deposits),
            ],
            vec![
                "Cash".into(),
                fmt_money(&b.asset.cash),
                "Other debts".into(),
                fmt_money(&b.liability.other_debts),
            ],
            vec![
                "Total".into(),
                fmt_money(&b.asset.total),
                "Total".into(),
                fmt_money(&b.liability.total),
            ],
        ];
        println!(
            "{}",
            pretty_table(&["Assets", "EUR", "Liabilities", "EUR"], data)
        );
        if b.is_balanced() {
            println!("Balanced");
        } else {
            println!("Gap: {}", fmt_money(&b.gap));
        }
    }
    Ok(())
}

fn rubriques(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let inputs = load_from_args(conn, sub, None)?;
    let agg = aggregate(&inputs.postings, DateRange::year(inputs.year));
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &agg)? {
        let mut data: Vec<Vec<String>> = agg
            .rubriques
            .iter()
            .map(|(name, t)| {
                vec![
                    name.clone(),
                    t.label.to_string(),
                    t.form.to_string(),
                    fmt_money(&t.total_debit),
                    fmt_money(&t.total_credit),
                ]
            })
            .collect();
        data.push(vec![
            "Résultat courant".into(),
            String::new(),
            String::new(),
            String::new(),
            fmt_money(&resultat_courant(&agg.rubriques)),
        ]);
        println!(
            "{}",
            pretty_table(&["Rubrique", "Label", "Form", "Debit", "Credit"], data)
        );
        if agg.unclassified > 0 {
            println!("{} postings matched no rubrique", agg.unclassified);
        }
    }
    Ok(())
}
