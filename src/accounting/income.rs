// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;

use super::round2;
use super::schedule::{asset_schedule, dotation_for_year};
use crate::error::Result;
use crate::models::{AmortizationPosting, Asset, EntryType, JournalPosting, ReportScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DepreciationSource {
    Posted,
    Scheduled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeStatement {
    pub year: i32,
    pub revenue: Decimal,
    pub expense: Decimal,
    pub depreciation: Decimal,
    pub result: Decimal,
    pub depreciation_source: DepreciationSource,
}

/// Revenue, expenses and depreciation for one calendar year.
///
/// Depreciation comes from amortization rows already posted for the year when
/// there are any, otherwise from each asset's linear schedule.
pub fn income_statement(
    postings: &[JournalPosting],
    amortizations: &[AmortizationPosting],
    assets: &[Asset],
    year: i32,
    scope: ReportScope,
) -> Result<IncomeStatement> {
    let in_scope = |p: &&JournalPosting| scope.includes(p.property_id) && p.date.year() == year;

    let revenue = round2(
        postings
            .iter()
            .filter(in_scope)
            .filter(|p| p.is_revenue())
            .map(|p| p.amount)
            .sum(),
    );
    let expense = round2(
        postings
            .iter()
            .filter(in_scope)
            .filter(|p| p.entry_type == EntryType::Purchase)
            .map(|p| p.amount)
            .sum(),
    );

    let posted: Vec<&AmortizationPosting> = amortizations
        .iter()
        .filter(|a| a.year == year && scope.includes(a.property_id))
        .collect();
    let (depreciation, depreciation_source) = if !posted.is_empty() {
        (
            round2(posted.iter().map(|a| a.amount).sum()),
            DepreciationSource::Posted,
        )
    } else {
        let mut total = Decimal::ZERO;
        for asset in assets.iter().filter(|a| scope.includes(a.property_id)) {
            total += dotation_for_year(&asset_schedule(asset)?, year);
        }
        (round2(total), DepreciationSource::Scheduled)
    };

    Ok(IncomeStatement {
        year,
        revenue,
        expense,
        depreciation,
        result: round2(revenue - expense - depreciation),
        depreciation_source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn posting(property_id: i64, ty: EntryType, amount: Decimal, date: &str, deposit: bool) -> JournalPosting {
        JournalPosting {
            id: 0,
            owner_id: "u1".into(),
            property_id,
            entry_type: ty,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            designation: String::new(),
            counterparty: None,
            account_code: "706".into(),
            amount,
            is_deposit: deposit,
        }
    }

    fn asset(property_id: i64, amount: Decimal, years: u32, date: &str) -> Asset {
        Asset {
            id: 1,
            owner_id: "u1".into(),
            property_id,
            label: "a".into(),
            amount_ht: amount,
            duration_years: years,
            acquisition_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            account_code: "2184".into(),
            category: None,
        }
    }

    fn postings() -> Vec<JournalPosting> {
        vec![
            posting(1, EntryType::Sale, dec!(1000), "2025-03-10", false),
            posting(1, EntryType::Sale, dec!(200), "2025-04-01", true),
            posting(1, EntryType::Purchase, dec!(300), "2025-02-11", false),
            posting(2, EntryType::Sale, dec!(500), "2025-06-01", false),
            posting(1, EntryType::Purchase, dec!(999), "2026-01-01", false),
        ]
    }

    #[test]
    fn deposits_never_count_as_revenue() {
        let s = income_statement(&postings(), &[], &[], 2025, ReportScope::Property(1)).unwrap();
        assert_eq!(s.revenue, dec!(1000));
        assert_eq!(s.expense, dec!(300));
        assert_eq!(s.result, dec!(700));
    }

    #[test]
    fn user_scope_spans_properties() {
        let s = income_statement(&postings(), &[], &[], 2025, ReportScope::User).unwrap();
        assert_eq!(s.revenue, dec!(1500));
    }

    #[test]
    fn scheduled_depreciation_when_nothing_posted() {
        let assets = vec![asset(1, dec!(12000), 5, "2024-04-15"), asset(2, dec!(3000), 3, "2025-01-15")];
        let s = income_statement(&postings(), &[], &assets, 2025, ReportScope::Property(1)).unwrap();
        assert_eq!(s.depreciation, dec!(2400));
        assert_eq!(s.depreciation_source, DepreciationSource::Scheduled);
        assert_eq!(s.result, dec!(-1700));

        let all = income_statement(&postings(), &[], &assets, 2025, ReportScope::User).unwrap();
        assert_eq!(all.depreciation, dec!(3400));
    }

    #[test]
    fn posted_rows_take_precedence() {
        let assets = vec![asset(1, dec!(12000), 5, "2024-04-15")];
        let rows = vec![AmortizationPosting {
            id: 1,
            owner_id: "u1".into(),
            property_id: 1,
            year: 2025,
            month: Some(1),
            asset_id: Some(1),
            amount: dec!(200),
            note: None,
        }];
        let s = income_statement(&postings(), &rows, &assets, 2025, ReportScope::Property(1)).unwrap();
        assert_eq!(s.depreciation, dec!(200));
        assert_eq!(s.depreciation_source, DepreciationSource::Posted);
        assert_eq!(s.result, dec!(500));
    }

    #[test]
    fn asset_without_line_for_year_contributes_nothing() {
        let assets = vec![asset(1, dec!(1000), 2, "2020-01-01")];
        let s = income_statement(&[], &[], &assets, 2025, ReportScope::User).unwrap();
        assert_eq!(s.depreciation, Decimal::ZERO);
    }
}
