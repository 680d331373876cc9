// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Account-code prefix rules mapping ledger postings to fiscal rubriques.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::round2;
use crate::models::{DateRange, EntryType, JournalPosting};

pub const CA: &str = "CA";
pub const CA_MOINS: &str = "CA_Moins";
pub const DOTATIONS: &str = "DotationsAmortissements";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RubriqueRule {
    pub prefix: &'static str,
    pub rubrique: &'static str,
    pub form: &'static str,
    pub label: &'static str,
}

const fn rule(
    prefix: &'static str,
    rubrique: &'static str,
    form: &'static str,
    label: &'static str,
) -> RubriqueRule {
    RubriqueRule {
        prefix,
        rubrique,
        form,
        label,
    }
}

pub static RULES: &[RubriqueRule] = &[
    rule("706", CA, "2033-B", "Loyers meublés"),
    rule("708", CA, "2033-B", "Produits des activités annexes"),
    rule("709", CA_MOINS, "2033-B", "Rabais, remises et ristournes accordés"),
    rule("60", "Achats", "2033-B", "Achats de fournitures"),
    rule("606", "AchatsNonStockes", "2033-B", "Eau, énergie, petit équipement"),
    rule("61", "ServicesExterieurs", "2033-B", "Services extérieurs"),
    rule("613", "Locations", "2033-B", "Locations et charges locatives"),
    rule("614", "ChargesCopropriete", "2033-B", "Charges de copropriété"),
    rule("615", "EntretienReparations", "2033-B", "Entretien et réparations"),
    rule("616", "Assurances", "2033-B", "Primes d'assurance"),
    rule("62", "AutresServices", "2033-B", "Autres services extérieurs"),
    rule("622", "Honoraires", "2033-B", "Honoraires (comptable, gestion)"),
    rule("627", "FraisBancaires", "2033-B", "Services bancaires"),
    rule("63", "ImpotsTaxes", "2033-B", "Impôts et taxes"),
    rule("635", "ImpotsTaxes", "2033-B", "Taxe foncière, CFE"),
    rule("64", "ChargesPersonnel", "2033-B", "Charges de personnel"),
    rule("65", "AutresCharges", "2033-B", "Autres charges de gestion courante"),
    rule("66", "ChargesFinancieres", "2033-B", "Charges financières"),
    rule("661", "InteretsEmprunt", "2033-B", "Intérêts d'emprunt"),
    rule("6811", DOTATIONS, "2033-C", "Dotations aux amortissements"),
];

// Scan order: longest prefix first, declaration order among equal lengths.
static BY_LENGTH: Lazy<Vec<&'static RubriqueRule>> = Lazy::new(|| {
    let mut v: Vec<&'static RubriqueRule> = RULES.iter().collect();
    v.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
    v
});

/// Returns the rule with the longest prefix of `account_code`.
pub fn classify(account_code: &str) -> Option<&'static RubriqueRule> {
    let code = account_code.trim();
    BY_LENGTH
        .iter()
        .copied()
        .find(|r| code.starts_with(r.prefix))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RubriqueTotal {
    pub label: &'static str,
    pub form: &'static str,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
}

impl RubriqueTotal {
    pub fn net_debit(&self) -> Decimal {
        self.total_debit - self.total_credit
    }

    pub fn net_credit(&self) -> Decimal {
        self.total_credit - self.total_debit
    }
}

/// A posting booked on a depreciation account, kept for per-asset reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmortizationEntry {
    pub posting_id: i64,
    pub date: NaiveDate,
    pub account_code: String,
    pub designation: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RubriqueAggregation {
    pub rubriques: BTreeMap<String, RubriqueTotal>,
    pub amortizations: Vec<AmortizationEntry>,
    pub unclassified: usize,
}

pub fn aggregate(postings: &[JournalPosting], period: Option<DateRange>) -> RubriqueAggregation {
    let mut out = RubriqueAggregation::default();
    for p in postings {
        if let Some(range) = period {
            if !range.contains(p.date) {
                continue;
            }
        }
        let Some(rule) = classify(&p.account_code) else {
            out.unclassified += 1;
            continue;
        };
        if p.amount.is_zero() {
            continue;
        }
        let entry = out
            .rubriques
            .entry(rule.rubrique.to_string())
            .or_insert(RubriqueTotal {
                label: rule.label,
                form: rule.form,
                total_debit: Decimal::ZERO,
                total_credit: Decimal::ZERO,
            });
        match p.entry_type {
            EntryType::Purchase => entry.total_debit += p.amount,
            EntryType::Sale => entry.total_credit += p.amount,
        }
        if rule.rubrique == DOTATIONS {
            out.amortizations.push(AmortizationEntry {
                posting_id: p.id,
                date: p.date,
                account_code: p.account_code.clone(),
                designation: p.designation.clone(),
                amount: p.amount,
            });
        }
    }
    for total in out.rubriques.values_mut() {
        total.total_debit = round2(total.total_debit);
        total.total_credit = round2(total.total_credit);
    }
    out
}

/// Net revenue minus net charges, depreciation excluded.
pub fn resultat_courant(rubriques: &BTreeMap<String, RubriqueTotal>) -> Decimal {
    let ca = rubriques.get(CA).map(|t| t.net_credit()).unwrap_or_default();
    let ca_moins = rubriques
        .get(CA_MOINS)
        .map(|t| t.net_debit())
        .unwrap_or_default();
    let charges: Decimal = rubriques
        .iter()
        .filter(|(name, _)| !matches!(name.as_str(), CA | CA_MOINS | DOTATIONS))
        .map(|(_, t)| t.net_debit())
        .sum();
    round2(ca - ca_moins - charges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn posting(id: i64, ty: EntryType, code: &str, amount: Decimal, date: &str) -> JournalPosting {
        JournalPosting {
            id,
            owner_id: "u1".into(),
            property_id: 1,
            entry_type: ty,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            designation: format!("p{}", id),
            counterparty: None,
            account_code: code.into(),
            amount,
            is_deposit: false,
        }
    }

    #[test]
    fn longest_prefix_wins() {
        assert_eq!(classify("615").unwrap().prefix, "615");
        assert_eq!(classify("6155").unwrap().rubrique, "EntretienReparations");
        assert_eq!(classify("620").unwrap().prefix, "62");
        assert_eq!(classify("6221").unwrap().rubrique, "Honoraires");
        assert_eq!(classify("611").unwrap().prefix, "61");
        assert_eq!(classify("68110000").unwrap().rubrique, DOTATIONS);
        assert!(classify("512").is_none());
        assert!(classify("").is_none());
    }

    #[test]
    fn scan_order_is_by_descending_length() {
        let lens: Vec<usize> = BY_LENGTH.iter().map(|r| r.prefix.len()).collect();
        assert!(lens.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(BY_LENGTH.len(), RULES.len());
    }

    #[test]
    fn aggregate_splits_debit_credit_and_filters() {
        let postings = vec![
            posting(1, EntryType::Sale, "706", dec!(800), "2025-01-05"),
            posting(2, EntryType::Sale, "706000", dec!(200.005), "2025-02-05"),
            posting(3, EntryType::Purchase, "615", dec!(120), "2025-03-01"),
            posting(4, EntryType::Purchase, "620", dec!(30), "2025-03-02"),
            posting(5, EntryType::Purchase, "615", dec!(999), "2024-12-31"),
            posting(6, EntryType::Purchase, "512", dec!(50), "2025-03-02"),
            posting(7, EntryType::Purchase, "616", dec!(0), "2025-03-02"),
            posting(8, EntryType::Purchase, "6811", dec!(1500), "2025-12-31"),
            posting(9, EntryType::Purchase, "709", dec!(10), "2025-06-30"),
        ];
        let agg = aggregate(&postings, DateRange::year(2025));
        let names: Vec<&str> = agg.rubriques.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["AutresServices", CA, CA_MOINS, DOTATIONS, "EntretienReparations"]
        );
        assert_eq!(agg.rubriques[CA].total_credit, dec!(1000.01));
        assert_eq!(agg.rubriques["EntretienReparations"].total_debit, dec!(120));
        assert_eq!(agg.rubriques["AutresServices"].total_debit, dec!(30));
        assert_eq!(agg.unclassified, 1);
        assert_eq!(agg.amortizations.len(), 1);
        assert_eq!(agg.amortizations[0].amount, dec!(1500));

        // 1000.01 - 10 - (120 + 30), depreciation left out
        assert_eq!(resultat_courant(&agg.rubriques), dec!(840.01));
    }

    #[test]
    fn unclassified_count_respects_period() {
        let postings = vec![
            posting(1, EntryType::Purchase, "512", dec!(50), "2024-06-01"),
            posting(2, EntryType::Purchase, "471", dec!(20), "2025-06-01"),
            posting(3, EntryType::Purchase, "615", dec!(10), "2025-06-01"),
        ];
        assert_eq!(aggregate(&postings, DateRange::year(2025)).unclassified, 1);
        assert_eq!(aggregate(&postings, None).unclassified, 2);
    }

    #[test]
    fn aggregate_without_period_keeps_everything() {
        let postings = vec![
            posting(1, EntryType::Purchase, "615", dec!(120), "2025-03-01"),
            posting(2, EntryType::Purchase, "615", dec!(999), "2024-12-31"),
        ];
        let agg = aggregate(&postings, None);
        assert_eq!(agg.rubriques["EntretienReparations"].total_debit, dec!(1119));
    }
}
