//! Reporting views over a solved plan: outstanding principal by term, a plan
//! summary, and yearly totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::optimizer::{OptimizationResult, PeriodRecord};
use crate::types::{Money, MONTHS_PER_YEAR, TERMS};

/// Principal still outstanding per term, one series per term and one value
/// per period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutstandingByTerm {
    pub term_1: Vec<Money>,
    pub term_2: Vec<Money>,
    pub term_3: Vec<Money>,
    pub term_4: Vec<Money>,
    pub term_5: Vec<Money>,
}

impl OutstandingByTerm {
    /// Sum across terms for each period.
    pub fn totals(&self) -> Vec<Money> {
        (0..self.term_1.len())
            .map(|i| {
                self.term_1[i] + self.term_2[i] + self.term_3[i] + self.term_4[i] + self.term_5[i]
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub periods: usize,
    pub total_interest: Money,
    pub total_contributions: Money,
    pub total_expenditures: Money,
    /// New money placed over the plan, 1-year term first
    pub invested_by_term: [Money; TERMS],
    pub total_invested: Money,
    pub peak_bank_balance: Money,
    pub trough_bank_balance: Money,
    pub final_closing_balance: Money,
    /// Periods with any new placement
    pub investing_periods: Vec<usize>,
}

/// Flows grouped into consecutive 12-period blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualTotals {
    /// 1-based plan year
    pub year: usize,
    pub contributions: Money,
    pub expenditures: Money,
    pub interest: Money,
    pub invested: Money,
    pub closing_balance: Money,
}

/// For each term `j` and period `i`, the sum of term-`j` placements made in
/// periods `max(1, i - 12j + 1)..=i`.
pub fn outstanding_by_term(records: &[PeriodRecord]) -> OutstandingByTerm {
    let series = |term: usize| -> Vec<Money> {
        let window = term * MONTHS_PER_YEAR;
        let placed: Vec<Money> = records.iter().map(|r| r.terms()[term - 1]).collect();
        let mut running = Decimal::ZERO;
        placed
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                running += *amount;
                if i >= window {
                    running -= placed[i - window];
                }
                running
            })
            .collect()
    };
    OutstandingByTerm {
        term_1: series(1),
        term_2: series(2),
        term_3: series(3),
        term_4: series(4),
        term_5: series(5),
    }
}

pub fn summarize(result: &OptimizationResult) -> PlanSummary {
    let records = result.records();

    let mut invested_by_term = [Decimal::ZERO; TERMS];
    for r in records {
        for (slot, amount) in invested_by_term.iter_mut().zip(r.terms()) {
            *slot += amount;
        }
    }

    let peak_bank_balance = records
        .iter()
        .map(|r| r.bank_balance)
        .max()
        .unwrap_or(Decimal::ZERO);
    let trough_bank_balance = records
        .iter()
        .map(|r| r.bank_balance)
        .min()
        .unwrap_or(Decimal::ZERO);

    PlanSummary {
        periods: records.len(),
        total_interest: result.total_interest(),
        total_contributions: records.iter().map(|r| r.contributions).sum(),
        total_expenditures: records.iter().map(|r| r.expenditures).sum(),
        invested_by_term,
        total_invested: invested_by_term.iter().copied().sum(),
        peak_bank_balance,
        trough_bank_balance,
        final_closing_balance: result.final_closing_balance(),
        investing_periods: records
            .iter()
            .filter(|r| r.total_investments > Decimal::ZERO)
            .map(|r| r.period)
            .collect(),
    }
}

/// Totals per plan year; a trailing partial year gets its own block.
pub fn annual_totals(records: &[PeriodRecord]) -> Vec<AnnualTotals> {
    records
        .chunks(MONTHS_PER_YEAR)
        .enumerate()
        .map(|(i, block)| AnnualTotals {
            year: i + 1,
            contributions: block.iter().map(|r| r.contributions).sum(),
            expenditures: block.iter().map(|r| r.expenditures).sum(),
            interest: block.iter().map(|r| r.interest).sum(),
            invested: block.iter().map(|r| r.total_investments).sum(),
            closing_balance: block
                .last()
                .map(|r| r.closing_balance)
                .unwrap_or(Decimal::ZERO),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn record(period: usize, term_1: Money, term_3: Money, bank: Money) -> PeriodRecord {
        PeriodRecord {
            period,
            opening_balance: dec!(200000),
            contributions: dec!(1000),
            expenditures: dec!(400),
            interest: dec!(10),
            closing_balance: dec!(200610),
            bank_balance: bank,
            current_investments: dec!(200610) - bank,
            maturities: Decimal::ZERO,
            term_1,
            term_2: Decimal::ZERO,
            term_3,
            term_4: Decimal::ZERO,
            term_5: Decimal::ZERO,
            total_investments: term_1 + term_3,
        }
    }

    fn records(n: usize) -> Vec<PeriodRecord> {
        (1..=n)
            .map(|i| {
                let t1 = if i == 1 || i == 13 { dec!(1000) } else { Decimal::ZERO };
                let t3 = if i == 2 { dec!(500) } else { Decimal::ZERO };
                record(i, t1, t3, dec!(100000) + Decimal::from(i as u32))
            })
            .collect()
    }

    #[test]
    fn test_outstanding_rolls_off_after_term() {
        let out = outstanding_by_term(&records(40));
        // Term 1 placement in period 1 is outstanding through period 12
        assert_eq!(out.term_1[0], dec!(1000));
        assert_eq!(out.term_1[11], dec!(1000));
        // Period 13: first placement has matured, second just placed
        assert_eq!(out.term_1[12], dec!(1000));
        assert_eq!(out.term_1[24], Decimal::ZERO);
        assert_eq!(out.term_3[0], Decimal::ZERO);
        assert_eq!(out.term_3[36], dec!(500));
        assert_eq!(out.term_3[37], Decimal::ZERO);
        assert_eq!(out.totals()[5], dec!(1500));
    }

    #[test]
    fn test_summarize() {
        let recs = records(24);
        let result = OptimizationResult {
            objective_value: recs.iter().map(|r| r.interest).sum(),
            records: recs,
        };
        let s = summarize(&result);
        assert_eq!(s.periods, 24);
        assert_eq!(s.total_interest, dec!(240));
        assert_eq!(s.total_contributions, dec!(24000));
        assert_eq!(s.invested_by_term, [dec!(2000), Decimal::ZERO, dec!(500), Decimal::ZERO, Decimal::ZERO]);
        assert_eq!(s.total_invested, dec!(2500));
        assert_eq!(s.peak_bank_balance, dec!(100024));
        assert_eq!(s.trough_bank_balance, dec!(100001));
        assert_eq!(s.investing_periods, vec![1, 2, 13]);
    }

    #[test]
    fn test_annual_totals_blocks() {
        let years = annual_totals(&records(30));
        assert_eq!(years.len(), 3);
        assert_eq!(years[0].contributions, dec!(12000));
        assert_eq!(years[0].invested, dec!(1500));
        assert_eq!(years[1].invested, dec!(1000));
        assert_eq!(years[2].year, 3);
        assert_eq!(years[2].expenditures, dec!(2400));
    }

    #[test]
    fn test_empty_plan() {
        let result = OptimizationResult {
            objective_value: Decimal::ZERO,
            records: Vec::new(),
        };
        let s = summarize(&result);
        assert_eq!(s.periods, 0);
        assert_eq!(s.peak_bank_balance, Decimal::ZERO);
        assert!(annual_totals(&[]).is_empty());
        assert!(outstanding_by_term(&[]).term_5.is_empty());
    }
}
