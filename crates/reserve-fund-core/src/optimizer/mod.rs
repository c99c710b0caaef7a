//! Investment-timing optimizer.
//!
//! Allocates idle reserve cash into 1..5 year fixed terms so that total
//! interest over the horizon is maximised, while every period keeps at least
//! [`MINIMUM_BANK_BALANCE`] of available cash in the bank. The problem is a
//! monthly linear program built by [`formulation`], solved through the
//! [`LpSolver`] seam, then checked and flattened into [`PeriodRecord`]s.

pub mod formulation;
pub mod input;
pub mod result;
pub mod solver;

use std::time::Instant;

use log::{debug, info};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{with_metadata, ComputationOutput, Money, MONTHS_PER_YEAR, TERMS};
use crate::ReserveFundResult;

pub use formulation::{build_program, LinearProgram, RateLookup};
pub use input::{OptimizerInput, RawOptimizerInput};
pub use result::{OptimizationResult, PeriodRecord};
pub use solver::{LpSolver, MicroLpSolver};

/// Cash that must remain available in the bank after each period's
/// placements.
pub const MINIMUM_BANK_BALANCE: Money = dec!(100000);

/// Tunable knobs of the optimizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    pub rate_lookup: RateLookup,
}

/// Solve with the default configuration and the bundled solver.
pub fn solve(input: &OptimizerInput) -> ReserveFundResult<OptimizationResult> {
    solve_with(input, &OptimizerConfig::default(), &MicroLpSolver)
}

/// Solve with an explicit configuration and solver backend.
pub fn solve_with<S: LpSolver + ?Sized>(
    input: &OptimizerInput,
    config: &OptimizerConfig,
    solver: &S,
) -> ReserveFundResult<OptimizationResult> {
    let start = Instant::now();
    let program = build_program(input, config.rate_lookup)?;
    debug!(
        "built program: {} periods, {} variables, {} constraints in {}us",
        input.period_count(),
        program.variable_count(),
        program.constraints.len(),
        start.elapsed().as_micros()
    );

    let solve_start = Instant::now();
    let values = solver.solve(&program)?;
    debug!("solver returned in {}us", solve_start.elapsed().as_micros());

    result::verify(input, &program.layout, &values)?;
    let result = result::extract(input, &program.layout, &values)?;
    info!(
        "optimized {} periods: total interest {}, final closing balance {}",
        result.len(),
        result.total_interest(),
        result.final_closing_balance()
    );
    Ok(result)
}

#[derive(Serialize)]
struct PlanAssumptions<'a> {
    period_count: usize,
    opening_bank_balance: Money,
    opening_reserve_total: Money,
    minimum_bank_balance: Money,
    config: &'a OptimizerConfig,
}

/// Solve and wrap the plan in the standard output envelope.
pub fn optimize_plan(
    input: &OptimizerInput,
    config: &OptimizerConfig,
) -> ReserveFundResult<ComputationOutput<OptimizationResult>> {
    let start = Instant::now();
    let warnings = plan_warnings(input);

    let result = solve_with(input, config, &MicroLpSolver)?;

    let assumptions = PlanAssumptions {
        period_count: input.period_count(),
        opening_bank_balance: input.opening_bank_balance(),
        opening_reserve_total: input.opening_reserve_total(),
        minimum_bank_balance: MINIMUM_BANK_BALANCE,
        config,
    };
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Monthly investment-timing linear program (max total interest, 1-5 year terms)",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}

fn plan_warnings(input: &OptimizerInput) -> Vec<String> {
    let mut warnings = Vec::new();

    let longest = TERMS * MONTHS_PER_YEAR;
    if input.period_count() < longest {
        warnings.push(format!(
            "Horizon of {} periods is shorter than the {longest}-month longest term; \
             placements near the end never mature inside the plan",
            input.period_count()
        ));
    }
    if input.opening_reserve_total() < MINIMUM_BANK_BALANCE {
        warnings.push(format!(
            "Opening reserve {} is below the minimum bank balance {MINIMUM_BANK_BALANCE}; \
             nothing can be invested until contributions close the gap",
            input.opening_reserve_total()
        ));
    }
    if input.bank_rates().iter().all(|r| r.is_zero())
        && input.term_rates().iter().flatten().all(|r| r.is_zero())
    {
        warnings.push("Every rate is zero; the plan earns only existing-holding interest".into());
    }
    if input.opening_bank_balance() > input.opening_reserve_total() {
        warnings.push(format!(
            "Opening bank balance {} exceeds the opening reserve total {}",
            input.opening_bank_balance(),
            input.opening_reserve_total()
        ));
    }
    warnings
}
