use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::formulation::{VarId, VariableLayout};
use super::input::OptimizerInput;
use super::MINIMUM_BANK_BALANCE;
use crate::error::ReserveFundError;
use crate::types::{from_f64, to_f64, Money, TERMS};
use crate::ReserveFundResult;

/// Decimal places kept from solver output.
const RESULT_SCALE: u32 = 8;

/// Tolerance for post-solve checks, relative to the largest solved value.
const TOLERANCE: f64 = 1e-6;

/// One projected month of the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub period: usize,
    pub opening_balance: Money,
    pub contributions: Money,
    pub expenditures: Money,
    /// Bank interest plus investment coupons plus existing-holding interest
    pub interest: Money,
    pub closing_balance: Money,
    /// Bank account after this period's placements
    pub bank_balance: Money,
    /// Closing balance not held in the bank
    pub current_investments: Money,
    pub maturities: Money,
    pub term_1: Money,
    pub term_2: Money,
    pub term_3: Money,
    pub term_4: Money,
    pub term_5: Money,
    pub total_investments: Money,
}

impl PeriodRecord {
    /// New placements by term, 1-year first.
    pub fn terms(&self) -> [Money; TERMS] {
        [self.term_1, self.term_2, self.term_3, self.term_4, self.term_5]
    }
}

/// Full solved plan, periods 1..=N in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Total interest over the horizon
    pub objective_value: Money,
    pub records: Vec<PeriodRecord>,
}

impl OptimizationResult {
    pub fn records(&self) -> &[PeriodRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_interest(&self) -> Money {
        self.objective_value
    }

    pub fn final_closing_balance(&self) -> Money {
        self.records
            .last()
            .map(|r| r.closing_balance)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Check the raw solution for the invariants every plan must satisfy.
pub fn verify(
    input: &OptimizerInput,
    layout: &VariableLayout,
    values: &[f64],
) -> ReserveFundResult<()> {
    if values.len() != layout.variable_count() {
        return Err(ReserveFundError::SolverFailure(format!(
            "solver returned {} values for {} variables",
            values.len(),
            layout.variable_count()
        )));
    }
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(ReserveFundError::Consistency {
            period: layout.period_of(VarId(pos)),
            reason: format!("variable {pos} is not finite"),
        });
    }

    // Simplex round-off grows with the size of the whole problem, not with
    // any one period's values.
    let slack = TOLERANCE * solution_scale(values);
    let floor = to_f64(MINIMUM_BANK_BALANCE, "minimum_bank_balance")?;
    for i in 1..=input.period_count() {
        let placed: f64 = (1..=TERMS).map(|j| values[layout.investment(i, j).0]).sum();
        let total = values[layout.total_investment(i).0];
        if (total - placed).abs() > slack {
            return Err(ReserveFundError::Consistency {
                period: i,
                reason: format!("total investment {total} differs from sum of terms {placed}"),
            });
        }

        let potential = values[layout.potential_balance(i).0];
        if placed > potential - floor + slack {
            return Err(ReserveFundError::Consistency {
                period: i,
                reason: format!(
                    "placements {placed} draw available cash {potential} below the minimum bank balance"
                ),
            });
        }
    }
    Ok(())
}

/// Turn solver values into period records.
pub fn extract(
    input: &OptimizerInput,
    layout: &VariableLayout,
    values: &[f64],
) -> ReserveFundResult<OptimizationResult> {
    let scale = solution_scale(values);
    let read = |period: usize, id: VarId, what: &str| {
        clean(values[id.0], scale, period, what)
    };

    let mut records = Vec::with_capacity(input.period_count());
    let mut opening = input.opening_reserve_total();

    for i in 1..=input.period_count() {
        let contributions = input.monthly_contributions()[i - 1];
        let expenditures = input.monthly_expenditures()[i - 1];
        let interest = read(i, layout.total_interest(i), "interest")?;
        let closing = opening + contributions - expenditures + interest;
        let bank_balance = read(i, layout.balance(i), "bank balance")?;

        let mut terms = [Decimal::ZERO; TERMS];
        for (j, slot) in terms.iter_mut().enumerate() {
            *slot = read(i, layout.investment(i, j + 1), "investment")?;
        }

        records.push(PeriodRecord {
            period: i,
            opening_balance: opening,
            contributions,
            expenditures,
            interest,
            closing_balance: closing,
            bank_balance,
            current_investments: closing - bank_balance,
            maturities: read(i, layout.maturities(i), "maturities")?,
            term_1: terms[0],
            term_2: terms[1],
            term_3: terms[2],
            term_4: terms[3],
            term_5: terms[4],
            total_investments: terms.iter().copied().sum(),
        });
        opening = closing;
    }

    let objective_value = records.iter().map(|r| r.interest).sum();
    Ok(OptimizationResult {
        objective_value,
        records,
    })
}

/// Largest solved magnitude, at least one.
fn solution_scale(values: &[f64]) -> f64 {
    values.iter().fold(1.0_f64, |m, v| m.max(v.abs()))
}

/// Round to the reporting scale, absorbing simplex round-off below zero.
fn clean(value: f64, scale: f64, period: usize, what: &str) -> ReserveFundResult<Money> {
    let value = if value < 0.0 {
        if value < -TOLERANCE * scale {
            return Err(ReserveFundError::Consistency {
                period,
                reason: format!("{what} is negative ({value})"),
            });
        }
        0.0
    } else {
        value
    };
    Ok(from_f64(value, period, what)?.round_dp(RESULT_SCALE).normalize())
}
