// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure accounting computations: schedules, rubriques, statements and forms.
//! Nothing here touches storage except `monthly::post_for_month`, which goes
//! through the `LedgerStore` trait.

pub mod balance;
pub mod forms;
pub mod income;
pub mod monthly;
pub mod rubriques;
pub mod schedule;

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to the cent, half away from zero.
pub fn round2(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Smallest amount treated as a real difference.
pub const CENT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

pub use balance::{BalanceSheet, compute_balance};
pub use income::{IncomeStatement, income_statement};
pub use monthly::{PostOutcome, PostRequest, PostScope, monthly_amount, post_for_month};
pub use rubriques::{RubriqueAggregation, RubriqueRule, aggregate, classify, resultat_courant};
pub use schedule::{ScheduleLine, linear_schedule};
