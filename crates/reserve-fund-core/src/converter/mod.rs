//! Cash-flow converter: turns a study ledger into an [`OptimizerInput`].
//!
//! The converter aligns the study's annual budget with the date of the
//! latest reserve balance, projects the cash thrown off by holdings already
//! on the books, and sources bank and term rates.

pub mod ledger;
pub mod projection;

use std::time::Instant;

use chrono::NaiveDate;
use log::{debug, info};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calendar::{first_period_offset, period_dates};
use crate::error::ReserveFundError;
use crate::optimizer::{self, OptimizationResult, OptimizerConfig, OptimizerInput, RawOptimizerInput};
use crate::rates::RateSource;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, MONTHS_PER_YEAR, TERMS};
use crate::ReserveFundResult;

pub use ledger::{
    AccountBalance, AccountKind, AtMaturityInterest, BankAccount, Holding, InterestFrequency,
    StudyLedger,
};
pub use projection::{monthly_flows, project_holdings, ExistingSchedules};

/// Spread below the reference rate assumed for demo studies.
pub const DEMO_SPREAD: Rate = dec!(0.03);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Optimizer input together with the calendar needed to store its records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedPlan {
    pub input: OptimizerInput,
    /// Month-end date of each plan period, `dates[0]` is period 1
    pub dates: Vec<NaiveDate>,
    /// Study periods dropped before the plan starts
    pub first_period: usize,
}

/// A study planned without any account or holding data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoStudy {
    pub first_year: i32,
    pub years: usize,
    pub opening_balance: Money,
    pub annual_contributions: Vec<Money>,
    pub annual_expenditures: Vec<Money>,
    #[serde(default = "default_demo_spread")]
    pub spread: Rate,
}

fn default_demo_spread() -> Rate {
    DEMO_SPREAD
}

/// A solved plan with its calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPlan {
    pub first_period: usize,
    pub dates: Vec<NaiveDate>,
    pub plan: OptimizationResult,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the optimizer input for a study from its ledger.
pub fn build_optimizer_input(
    ledger: &StudyLedger,
    rates: &RateSource,
) -> ReserveFundResult<ConvertedPlan> {
    validate_horizon(ledger.years)?;

    let account = ledger.reserve_account()?;
    let balance = ledger.latest_reserve_balance()?;

    let study_periods = ledger.years * MONTHS_PER_YEAR;
    let first_period = first_period_offset(ledger.first_year, balance.date)?;
    if first_period >= study_periods {
        return Err(ReserveFundError::DateError(format!(
            "balance date {} falls after the study's last period",
            balance.date
        )));
    }
    let periods = study_periods - first_period;
    let dates = period_dates(ledger.first_year, study_periods)?.split_off(first_period);
    debug!(
        "study {}+{}y: balance {} on {}, dropping {first_period} periods, {periods} remain",
        ledger.first_year, ledger.years, balance.balance, balance.date
    );

    let contributions = monthly_flows(
        "annual_contributions",
        &ledger.annual_contributions,
        ledger.years,
        first_period,
    )?;
    let expenditures = monthly_flows(
        "annual_expenditures",
        &ledger.annual_expenditures,
        ledger.years,
        first_period,
    )?;

    let current: Vec<&Holding> = ledger.current_holdings(balance.date).collect();
    let invested: Money = current.iter().map(|h| h.amount).sum();
    let existing = project_holdings(
        current.iter().copied(),
        ledger.first_year,
        first_period,
        periods,
        ledger.at_maturity_interest,
    );

    let schedule = rates.resolve(periods, account.spread);

    let input = OptimizerInput::new(RawOptimizerInput {
        period_count: periods,
        monthly_contributions: contributions,
        monthly_expenditures: expenditures,
        opening_bank_balance: balance.balance,
        opening_reserve_total: balance.balance + invested,
        bank_rates: schedule.bank_rates,
        term_rates: schedule.term_rates.into_iter().map(|row| row.to_vec()).collect(),
        existing_interest: existing.interest,
        existing_maturities: existing.maturities,
    })?;
    info!(
        "converted ledger: {periods} periods, {} current holdings worth {invested}",
        current.len()
    );

    Ok(ConvertedPlan {
        input,
        dates,
        first_period,
    })
}

/// Build the optimizer input for a demo study over its whole horizon.
pub fn build_demo_input(study: &DemoStudy, rates: &RateSource) -> ReserveFundResult<ConvertedPlan> {
    validate_horizon(study.years)?;

    let periods = study.years * MONTHS_PER_YEAR;
    let dates = period_dates(study.first_year, periods)?;
    let contributions = monthly_flows("annual_contributions", &study.annual_contributions, study.years, 0)?;
    let expenditures = monthly_flows("annual_expenditures", &study.annual_expenditures, study.years, 0)?;
    let schedule = rates.resolve(periods, study.spread);

    let input = OptimizerInput::new(RawOptimizerInput {
        period_count: periods,
        monthly_contributions: contributions,
        monthly_expenditures: expenditures,
        opening_bank_balance: study.opening_balance,
        opening_reserve_total: study.opening_balance,
        bank_rates: schedule.bank_rates,
        term_rates: schedule.term_rates.into_iter().map(|row| row.to_vec()).collect(),
        existing_interest: Default::default(),
        existing_maturities: Default::default(),
    })?;

    Ok(ConvertedPlan {
        input,
        dates,
        first_period: 0,
    })
}

/// Convert a ledger and solve its plan.
pub fn plan_study(
    ledger: &StudyLedger,
    rates: &RateSource,
    config: &OptimizerConfig,
) -> ReserveFundResult<ComputationOutput<StudyPlan>> {
    let converted = build_optimizer_input(ledger, rates)?;
    solve_converted(converted, rates, config)
}

/// Solve a demo study.
pub fn plan_demo(
    study: &DemoStudy,
    rates: &RateSource,
    config: &OptimizerConfig,
) -> ReserveFundResult<ComputationOutput<StudyPlan>> {
    let converted = build_demo_input(study, rates)?;
    solve_converted(converted, rates, config)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_horizon(years: usize) -> ReserveFundResult<()> {
    if years == 0 {
        return Err(ReserveFundError::InvalidInput {
            field: "years".into(),
            reason: "a study must cover at least one year".into(),
        });
    }
    Ok(())
}

#[derive(Serialize)]
struct StudyAssumptions<'a> {
    rate_source: &'static str,
    first_period: usize,
    first_date: Option<NaiveDate>,
    terms: usize,
    config: &'a OptimizerConfig,
}

fn solve_converted(
    converted: ConvertedPlan,
    rates: &RateSource,
    config: &OptimizerConfig,
) -> ReserveFundResult<ComputationOutput<StudyPlan>> {
    let start = Instant::now();
    let solved = optimizer::optimize_plan(&converted.input, config)?;

    let mut warnings = solved.warnings;
    if matches!(rates, RateSource::Naive) {
        warnings.push("Using flat demonstration rates, not a forecast".into());
    }
    if converted.input.bank_rates().iter().all(|r| *r == Decimal::ZERO) {
        warnings.push("Bank rate is zero for every period after the spread".into());
    }

    let assumptions = StudyAssumptions {
        rate_source: match rates {
            RateSource::Naive => "naive",
            RateSource::Given(_) => "given",
            RateSource::Forecast(_) => "forecast",
        },
        first_period: converted.first_period,
        first_date: converted.dates.first().copied(),
        terms: TERMS,
        config,
    };
    let plan = StudyPlan {
        first_period: converted.first_period,
        dates: converted.dates,
        plan: solved.result,
    };

    Ok(with_metadata(
        "Reserve-fund study plan (ledger conversion + investment-timing LP)",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        plan,
    ))
}
