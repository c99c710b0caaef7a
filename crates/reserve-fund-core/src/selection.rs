//! Allocation of a period's planned placements across GIC issuers.
//!
//! Each issuer is capped at its deposit-insurance limit, shared across all
//! terms. Within a term the best-paying insured quotes are filled first and
//! any remainder carries to the next quote. A quote is skipped when the
//! amount it could take falls below its minimum deposit.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ReserveFundError;
use crate::optimizer::OptimizationResult;
use crate::types::{Money, Rate, TERMS};
use crate::ReserveFundResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A posted GIC rate for one issuer and term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GicQuote {
    pub date: NaiveDate,
    pub issuer: String,
    /// Term in years, 1..=5
    pub term: usize,
    pub rate: Rate,
    /// Smallest deposit the issuer accepts at this rate
    #[serde(default)]
    pub minimum_amount: Money,
}

/// Names of member institutions of the two deposit-insurance schemes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsuredRegistry {
    /// Federal scheme members (CDIC)
    #[serde(default)]
    pub primary: Vec<String>,
    /// Provincial scheme members (DICO)
    #[serde(default)]
    pub secondary: Vec<String>,
}

impl InsuredRegistry {
    /// True when the issuer appears within any member name of either scheme.
    pub fn is_insured(&self, issuer: &str) -> bool {
        self.primary
            .iter()
            .chain(&self.secondary)
            .any(|name| name.contains(issuer))
    }

    /// The secondary cap applies only to exact secondary members; every
    /// other insured issuer gets the primary cap.
    pub fn cap_for(&self, issuer: &str, limits: &SelectionLimits) -> Money {
        if self.secondary.iter().any(|name| name == issuer) {
            limits.secondary_cap
        } else {
            limits.primary_cap
        }
    }
}

/// Per-issuer insurance caps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionLimits {
    pub primary_cap: Money,
    pub secondary_cap: Money,
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self {
            primary_cap: dec!(100000),
            secondary_cap: dec!(250000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GicAllocation {
    pub issuer: String,
    pub term: usize,
    pub rate: Rate,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GicSelection {
    pub quote_date: Option<NaiveDate>,
    /// In allocation order
    pub allocations: Vec<GicAllocation>,
    /// Amount per insured issuer and term, 1-year first
    pub by_issuer: BTreeMap<String, [Money; TERMS]>,
    /// Amount per term no insured quote could absorb
    pub unallocated: [Money; TERMS],
}

impl GicSelection {
    pub fn total_allocated(&self) -> Money {
        self.allocations.iter().map(|a| a.amount).sum()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Split `allocation` (amount per term, 1-year first) across insured
/// issuers' quotes.
pub fn select_gics(
    allocation: [Money; TERMS],
    quotes: &[GicQuote],
    registry: &InsuredRegistry,
    limits: &SelectionLimits,
) -> ReserveFundResult<GicSelection> {
    validate(&allocation, quotes)?;

    let insured: Vec<&GicQuote> = quotes
        .iter()
        .filter(|q| registry.is_insured(&q.issuer))
        .collect();
    debug!(
        "{} of {} quotes are from insured issuers",
        insured.len(),
        quotes.len()
    );

    let mut by_issuer: BTreeMap<String, [Money; TERMS]> = insured
        .iter()
        .map(|q| (q.issuer.clone(), [Decimal::ZERO; TERMS]))
        .collect();
    let mut allocations = Vec::new();
    let mut unallocated = [Decimal::ZERO; TERMS];

    for (idx, requested) in allocation.iter().enumerate() {
        let term = idx + 1;
        let mut remaining = *requested;

        let mut candidates: Vec<&&GicQuote> = insured.iter().filter(|q| q.term == term).collect();
        candidates.sort_by(|a, b| b.rate.cmp(&a.rate).then_with(|| a.issuer.cmp(&b.issuer)));

        for quote in candidates {
            if remaining.is_zero() {
                break;
            }
            let cap = registry.cap_for(&quote.issuer, limits);
            let held = by_issuer
                .get_mut(&quote.issuer)
                .ok_or_else(|| ReserveFundError::InvalidInput {
                    field: "quotes".into(),
                    reason: format!("issuer '{}' missing from allocation book", quote.issuer),
                })?;
            let used: Money = held.iter().copied().sum();
            let available = (cap - used).max(Decimal::ZERO);
            let amount = remaining.min(available);
            if amount.is_zero() {
                continue;
            }
            if amount < quote.minimum_amount {
                debug!(
                    "skipping {} term {}: {} is below its minimum of {}",
                    quote.issuer, term, amount, quote.minimum_amount
                );
                continue;
            }
            held[idx] += amount;
            remaining -= amount;
            allocations.push(GicAllocation {
                issuer: quote.issuer.clone(),
                term,
                rate: quote.rate,
                amount,
            });
        }
        unallocated[idx] = remaining;
    }

    Ok(GicSelection {
        quote_date: quotes.first().map(|q| q.date),
        allocations,
        by_issuer,
        unallocated,
    })
}

/// Select GICs for the plan's first-period placements.
pub fn select_for_first_period(
    result: &OptimizationResult,
    quotes: &[GicQuote],
    registry: &InsuredRegistry,
    limits: &SelectionLimits,
) -> ReserveFundResult<GicSelection> {
    let first = result.records().first().ok_or_else(|| ReserveFundError::InvalidInput {
        field: "result".into(),
        reason: "plan has no periods".into(),
    })?;
    select_gics(first.terms(), quotes, registry, limits)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate(allocation: &[Money; TERMS], quotes: &[GicQuote]) -> ReserveFundResult<()> {
    if let Some(pos) = allocation.iter().position(|a| *a < Decimal::ZERO) {
        return Err(ReserveFundError::InvalidInput {
            field: format!("allocation[{pos}]"),
            reason: "must not be negative".into(),
        });
    }
    let dates: BTreeSet<NaiveDate> = quotes.iter().map(|q| q.date).collect();
    if dates.len() > 1 {
        return Err(ReserveFundError::InvalidInput {
            field: "quotes".into(),
            reason: format!("quotes span {} dates; use only the latest quote date", dates.len()),
        });
    }
    if let Some(q) = quotes.iter().find(|q| q.minimum_amount < Decimal::ZERO) {
        return Err(ReserveFundError::InvalidInput {
            field: "quotes.minimum_amount".into(),
            reason: format!("issuer '{}' has a negative minimum amount", q.issuer),
        });
    }
    if let Some(q) = quotes.iter().find(|q| !(1..=TERMS).contains(&q.term)) {
        return Err(ReserveFundError::InvalidInput {
            field: "quotes.term".into(),
            reason: format!("issuer '{}' quotes term {}, expected 1..=5", q.issuer, q.term),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn quote(issuer: &str, term: usize, rate: Rate) -> GicQuote {
        GicQuote {
            date: NaiveDate::from_ymd_opt(2019, 2, 1).unwrap(),
            issuer: issuer.into(),
            term,
            rate,
            minimum_amount: dec!(1000),
        }
    }

    fn registry() -> InsuredRegistry {
        InsuredRegistry {
            primary: vec!["Bank of Montreal".into(), "Hometrust Bank".into()],
            secondary: vec!["Meridian Credit Union Limited".into(), "Alterna Savings".into()],
        }
    }

    #[test]
    fn test_issuer_substring_match() {
        let r = registry();
        assert!(r.is_insured("Hometrust"));
        assert!(r.is_insured("Meridian"));
        assert!(!r.is_insured("Offshore Trust"));
    }

    #[test]
    fn test_best_rate_first_with_caps() {
        let quotes = vec![
            quote("Hometrust", 3, dec!(0.031)),
            quote("Alterna Savings", 3, dec!(0.030)),
            quote("Bank of Montreal", 3, dec!(0.025)),
            quote("Offshore Trust", 3, dec!(0.05)),
        ];
        let alloc = [Decimal::ZERO, Decimal::ZERO, dec!(300000), Decimal::ZERO, Decimal::ZERO];
        let sel = select_gics(alloc, &quotes, &registry(), &SelectionLimits::default()).unwrap();

        let got: Vec<(&str, Money)> = sel.allocations.iter().map(|a| (a.issuer.as_str(), a.amount)).collect();
        assert_eq!(
            got,
            vec![("Hometrust", dec!(100000)), ("Alterna Savings", dec!(200000))]
        );
        assert_eq!(sel.unallocated, [Decimal::ZERO; TERMS]);
        assert!(!sel.by_issuer.contains_key("Offshore Trust"));
        assert_eq!(sel.total_allocated(), dec!(300000));
    }

    #[test]
    fn test_cap_shared_across_terms() {
        let quotes = vec![quote("Hometrust", 1, dec!(0.02)), quote("Hometrust", 5, dec!(0.035))];
        let alloc = [dec!(70000), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, dec!(70000)];
        let sel = select_gics(alloc, &quotes, &registry(), &SelectionLimits::default()).unwrap();
        assert_eq!(sel.by_issuer["Hometrust"][0], dec!(70000));
        assert_eq!(sel.by_issuer["Hometrust"][4], dec!(30000));
        assert_eq!(sel.unallocated[4], dec!(40000));
    }

    #[test]
    fn test_partial_secondary_name_gets_primary_cap() {
        let r = registry();
        let limits = SelectionLimits::default();
        assert!(r.is_insured("Meridian"));
        assert_eq!(r.cap_for("Meridian", &limits), dec!(100000));
        assert_eq!(r.cap_for("Alterna Savings", &limits), dec!(250000));

        let quotes = vec![quote("Meridian", 2, dec!(0.03))];
        let alloc = [Decimal::ZERO, dec!(180000), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO];
        let sel = select_gics(alloc, &quotes, &r, &limits).unwrap();
        assert_eq!(sel.by_issuer["Meridian"][1], dec!(100000));
        assert_eq!(sel.unallocated[1], dec!(80000));
    }

    #[test]
    fn test_quote_below_minimum_is_skipped() {
        let mut big_ticket = quote("Hometrust", 4, dec!(0.04));
        big_ticket.minimum_amount = dec!(50000);
        let quotes = vec![big_ticket, quote("Bank of Montreal", 4, dec!(0.03))];
        let alloc = [Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, dec!(20000), Decimal::ZERO];
        let sel = select_gics(alloc, &quotes, &registry(), &SelectionLimits::default()).unwrap();

        assert_eq!(sel.allocations.len(), 1);
        assert_eq!(sel.allocations[0].issuer, "Bank of Montreal");
        assert_eq!(sel.allocations[0].amount, dec!(20000));
        assert_eq!(sel.by_issuer["Hometrust"][3], Decimal::ZERO);
    }

    #[test]
    fn test_remainder_below_minimum_stays_unallocated() {
        let quotes = vec![
            quote("Hometrust", 1, dec!(0.02)),
            quote("Bank of Montreal", 1, dec!(0.019)),
        ];
        let alloc = [dec!(100500), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO];
        let sel = select_gics(alloc, &quotes, &registry(), &SelectionLimits::default()).unwrap();
        assert_eq!(sel.total_allocated(), dec!(100000));
        assert_eq!(sel.unallocated[0], dec!(500));
    }

    #[test]
    fn test_mixed_quote_dates_rejected() {
        let mut late = quote("Hometrust", 1, dec!(0.02));
        late.date = NaiveDate::from_ymd_opt(2019, 3, 1).unwrap();
        let quotes = vec![quote("Hometrust", 1, dec!(0.02)), late];
        let err = select_gics([Decimal::ZERO; TERMS], &quotes, &registry(), &SelectionLimits::default())
            .unwrap_err();
        assert!(matches!(err, ReserveFundError::InvalidInput { .. }));
    }

    #[test]
    fn test_bad_term_rejected() {
        let quotes = vec![quote("Hometrust", 7, dec!(0.02))];
        assert!(select_gics([Decimal::ZERO; TERMS], &quotes, &registry(), &SelectionLimits::default()).is_err());
    }

    #[test]
    fn test_nothing_insured_leaves_everything_unallocated() {
        let quotes = vec![quote("Offshore Trust", 2, dec!(0.04))];
        let alloc = [Decimal::ZERO, dec!(5000), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO];
        let sel = select_gics(alloc, &quotes, &registry(), &SelectionLimits::default()).unwrap();
        assert!(sel.allocations.is_empty());
        assert_eq!(sel.unallocated[1], dec!(5000));
    }

    #[test]
    fn test_first_period_of_empty_plan() {
        let result = OptimizationResult {
            objective_value: Decimal::ZERO,
            records: Vec::new(),
        };
        assert!(select_for_first_period(&result, &[], &registry(), &SelectionLimits::default()).is_err());
    }
}
