// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Linear (straight-line) depreciation with prorata temporis on the first year.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{CENT, round2};
use crate::error::{AccountingError, Result};
use crate::models::Asset;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleLine {
    pub year: i32,
    pub dotation: Decimal,
    pub cumulative: Decimal,
}

/// Builds the yearly schedule, one line per calendar year from the acquisition
/// year through `acquisition year + duration - 1`.
///
/// The first year is prorated by whole months remaining (the acquisition month
/// counts as owned), middle years get the rounded annual amount and the last
/// year closes the schedule so the final cumulative equals `amount`.
///
/// When the rounded annual amount exceeds the exact share (tiny amounts over
/// long durations), the running cumulative can pass `amount` before the last
/// year, which then carries a negative dotation.
pub fn linear_schedule(
    amount: Decimal,
    duration_years: u32,
    acquisition_date: NaiveDate,
) -> Result<Vec<ScheduleLine>> {
    if amount <= Decimal::ZERO {
        return Err(AccountingError::validation(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    if duration_years == 0 {
        return Err(AccountingError::validation("duration must be at least one year"));
    }

    let n = duration_years as usize;
    let annual = amount / Decimal::from(duration_years);
    let months_first_year = Decimal::from(12 - acquisition_date.month0());
    let start_year = acquisition_date.year();

    let mut lines = Vec::with_capacity(n);
    let mut cumulative = Decimal::ZERO;
    for i in 0..n {
        let dotation = if i == 0 {
            round2(annual * months_first_year / Decimal::from(12))
        } else if i == n - 1 {
            round2(amount - cumulative)
        } else {
            round2(annual)
        };
        cumulative = round2(cumulative + dotation);
        lines.push(ScheduleLine {
            year: start_year + i as i32,
            dotation,
            cumulative,
        });
    }

    if let Some(last) = lines.last_mut() {
        let diff = amount - last.cumulative;
        if diff.abs() >= CENT {
            log::debug!(
                "schedule correction of {} on {} (amount {}, {} years)",
                diff,
                last.year,
                amount,
                duration_years
            );
            let before = last.cumulative - last.dotation;
            last.dotation = round2(last.dotation + diff);
            last.cumulative = round2(before + last.dotation);
        }
    }
    Ok(lines)
}

pub fn asset_schedule(asset: &Asset) -> Result<Vec<ScheduleLine>> {
    asset.validate()?;
    linear_schedule(asset.amount_ht, asset.duration_years, asset.acquisition_date)
}

pub fn dotation_for_year(schedule: &[ScheduleLine], year: i32) -> Decimal {
    schedule
        .iter()
        .find(|l| l.year == year)
        .map(|l| l.dotation)
        .unwrap_or(Decimal::ZERO)
}

/// Cumulative depreciation as of the last line dated on or before `year`.
pub fn cumulative_through(schedule: &[ScheduleLine], year: i32) -> Decimal {
    schedule
        .iter()
        .take_while(|l| l.year <= year)
        .last()
        .map(|l| l.cumulative)
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn january_acquisition_gets_full_first_year() {
        let s = linear_schedule(dec!(10000), 10, d(2023, 1, 10)).unwrap();
        assert_eq!(s.len(), 10);
        assert_eq!(s[0].year, 2023);
        assert_eq!(s[0].dotation, dec!(1000));
        assert_eq!(s[9].year, 2032);
        assert_eq!(s[9].cumulative, dec!(10000));
    }

    #[test]
    fn december_acquisition_gets_one_twelfth() {
        let s = linear_schedule(dec!(12000), 5, d(2024, 12, 31)).unwrap();
        assert_eq!(s[0].dotation, dec!(200));
        assert_eq!(s[1].dotation, dec!(2400));
        // last year absorbs the unprorated part of the first year
        assert_eq!(s[4].dotation, dec!(4600));
        assert_eq!(s[4].cumulative, dec!(12000));
    }

    #[test]
    fn april_acquisition_prorates_nine_months() {
        let s = linear_schedule(dec!(20000), 10, d(2024, 4, 1)).unwrap();
        assert_eq!(s[0].dotation, dec!(1500));
        assert_eq!(s[1].cumulative, dec!(3500));
    }

    #[test]
    fn schedule_sums_to_amount_with_awkward_values() {
        let cases = [
            (dec!(1000), 3, d(2024, 7, 19)),
            (dec!(999.99), 7, d(2021, 2, 28)),
            (dec!(0.05), 4, d(2020, 11, 1)),
            (dec!(123456.78), 50, d(2000, 6, 30)),
            (dec!(5000), 1, d(2025, 9, 1)),
        ];
        for (amount, years, date) in cases {
            let s = linear_schedule(amount, years, date).unwrap();
            assert_eq!(s.len(), years as usize);
            let total: Decimal = s.iter().map(|l| l.dotation).sum();
            assert_eq!(total, amount, "{} over {} years", amount, years);
            assert!((s.last().unwrap().cumulative - amount).abs() < CENT);
        }
    }

    #[test]
    fn rounded_up_annual_share_closes_with_negative_dotation() {
        // 0.25 / 50 = 0.005 rounds up to 0.01 every year
        let s = linear_schedule(dec!(0.25), 50, d(2020, 1, 1)).unwrap();
        assert_eq!(s[48].cumulative, dec!(0.49));
        let last = s.last().unwrap();
        assert_eq!(last.year, 2069);
        assert_eq!(last.dotation, dec!(-0.24));
        assert_eq!(last.cumulative, dec!(0.25));
        let total: Decimal = s.iter().map(|l| l.dotation).sum();
        assert_eq!(total, dec!(0.25));
    }

    #[test]
    fn one_year_schedule_takes_whole_amount() {
        let s = linear_schedule(dec!(5000), 1, d(2025, 9, 1)).unwrap();
        assert_eq!(s, vec![ScheduleLine { year: 2025, dotation: dec!(5000), cumulative: dec!(5000) }]);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(matches!(
            linear_schedule(dec!(0), 5, d(2024, 1, 1)),
            Err(AccountingError::Validation(_))
        ));
        assert!(matches!(
            linear_schedule(dec!(-10), 5, d(2024, 1, 1)),
            Err(AccountingError::Validation(_))
        ));
        assert!(matches!(
            linear_schedule(dec!(100), 0, d(2024, 1, 1)),
            Err(AccountingError::Validation(_))
        ));
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
    }

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (1990i32..2100, 1u32..=365).prop_map(|(y, ordinal)| NaiveDate::from_yo_opt(y, ordinal).unwrap())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_schedule_closes_on_amount(
            amount in amount_strategy(),
            years in 1u32..=50,
            date in date_strategy(),
        ) {
            let s = linear_schedule(amount, years, date).unwrap();
            prop_assert_eq!(s.len(), years as usize);
            prop_assert_eq!(s[0].year, date.year());
            let total: Decimal = s.iter().map(|l| l.dotation).sum();
            prop_assert_eq!(total, amount);
            prop_assert_eq!(s.last().unwrap().cumulative, amount);
            for w in s.windows(2) {
                prop_assert_eq!(w[1].year, w[0].year + 1);
                prop_assert_eq!(w[1].cumulative, w[0].cumulative + w[1].dotation);
            }
        }
    }

    #[test]
    fn slicing_helpers() {
        let s = linear_schedule(dec!(12000), 5, d(2024, 4, 15)).unwrap();
        assert_eq!(dotation_for_year(&s, 2025), dec!(2400));
        assert_eq!(dotation_for_year(&s, 2031), Decimal::ZERO);
        assert_eq!(cumulative_through(&s, 2023), Decimal::ZERO);
        assert_eq!(cumulative_through(&s, 2025), dec!(4200));
        assert_eq!(cumulative_through(&s, 2040), dec!(12000));
    }
}
