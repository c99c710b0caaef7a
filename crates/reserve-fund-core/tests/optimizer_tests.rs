use std::collections::BTreeMap;
use std::thread;

use pretty_assertions::assert_eq;
use reserve_fund_core::optimizer::{
    self, OptimizationResult, OptimizerConfig, OptimizerInput, RateLookup, RawOptimizerInput,
    MINIMUM_BANK_BALANCE,
};
use reserve_fund_core::rates::naive_rates;
use reserve_fund_core::schedule;
use reserve_fund_core::ReserveFundError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

/// Flat naive rates, quiet first year, then a steady contribution surplus.
fn scenario_a(periods: usize) -> RawOptimizerInput {
    let rates = naive_rates(periods);
    let flow = |after: Decimal| -> Vec<Decimal> {
        (1..=periods)
            .map(|i| if i <= 12 { Decimal::ZERO } else { after })
            .collect()
    };
    RawOptimizerInput {
        period_count: periods,
        monthly_contributions: flow(dec!(5000)),
        monthly_expenditures: flow(dec!(3000)),
        opening_bank_balance: dec!(125000),
        opening_reserve_total: dec!(125000),
        bank_rates: rates.bank_rates,
        term_rates: rates.term_rates.into_iter().map(|r| r.to_vec()).collect(),
        existing_interest: BTreeMap::new(),
        existing_maturities: BTreeMap::new(),
    }
}

fn assert_plan_properties(result: &OptimizationResult) {
    let tol = dec!(0.000001);
    for (idx, r) in result.records().iter().enumerate() {
        assert_eq!(r.period, idx + 1);

        for amount in r.terms() {
            assert!(amount >= Decimal::ZERO, "period {} negative placement", r.period);
        }
        assert!(r.bank_balance >= Decimal::ZERO);
        assert!(r.maturities >= Decimal::ZERO);
        assert!(r.total_investments >= Decimal::ZERO);

        let sum: Decimal = r.terms().iter().copied().sum();
        assert!(
            (r.total_investments - sum).abs() <= tol,
            "period {}: total {} vs terms {}",
            r.period,
            r.total_investments,
            sum
        );

        assert_eq!(
            r.closing_balance,
            r.opening_balance + r.contributions - r.expenditures + r.interest
        );
        assert_eq!(r.current_investments, r.closing_balance - r.bank_balance);

        // Placements never draw available cash below the floor
        let potential = r.bank_balance + r.total_investments;
        assert!(sum <= potential - MINIMUM_BANK_BALANCE + tol * potential.max(Decimal::ONE));
    }
    for pair in result.records().windows(2) {
        assert_eq!(pair[1].opening_balance, pair[0].closing_balance);
    }
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[test]
fn test_scenario_a_long_horizon() {
    let input = OptimizerInput::new(scenario_a(344)).unwrap();
    let result = optimizer::solve(&input).unwrap();

    assert_eq!(result.len(), 344);
    assert_eq!(result.records()[0].opening_balance, dec!(125000));
    assert!(result.total_interest() > Decimal::ZERO);
    assert_plan_properties(&result);

    let summary = schedule::summarize(&result);
    assert_eq!(summary.total_interest, result.total_interest());
    assert_eq!(summary.total_contributions, dec!(5000) * Decimal::from(332));
    assert!(summary.trough_bank_balance >= MINIMUM_BANK_BALANCE - dec!(0.000001));
}

#[test]
fn test_multi_million_reserve_long_horizon() {
    for opening in [dec!(3000000), dec!(8000000), dec!(25000000)] {
        let mut raw = scenario_a(344);
        raw.opening_bank_balance = opening;
        raw.opening_reserve_total = opening;
        raw.monthly_contributions = vec![dec!(100000); 344];
        raw.monthly_expenditures = vec![dec!(70000); 344];
        let input = OptimizerInput::new(raw).unwrap();

        let result = optimizer::solve(&input)
            .unwrap_or_else(|e| panic!("opening {opening}: {e}"));
        assert_eq!(result.len(), 344);
        assert_eq!(result.records()[0].opening_balance, opening);
        assert!(result.total_interest() > Decimal::ZERO);
        assert_plan_properties(&result);
    }
}

#[test]
fn test_scenario_b_length_mismatch_before_solve() {
    let mut raw = scenario_a(344);
    raw.bank_rates.pop();
    let err = OptimizerInput::new(raw).unwrap_err();
    assert!(err.is_validation());
    match err {
        ReserveFundError::LengthMismatch { field, expected, actual } => {
            assert_eq!(field, "bank_rates");
            assert_eq!(expected, 344);
            assert_eq!(actual, 343);
        }
        other => panic!("expected LengthMismatch, got {other:?}"),
    }
}

#[test]
fn test_unknown_key_rejected_from_json() {
    let mut value = serde_json::to_value(scenario_a(3)).unwrap();
    value["surprise"] = serde_json::json!(1);
    let err = OptimizerInput::from_json(&value.to_string()).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("surprise"));
}

#[test]
fn test_solve_is_idempotent() {
    let input = OptimizerInput::new(scenario_a(60)).unwrap();
    let first = optimizer::solve(&input).unwrap();
    let second = optimizer::solve(&input).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_properties_hold_for_every_rate_lookup() {
    let input = OptimizerInput::new(scenario_a(72)).unwrap();
    for lookup in [
        RateLookup::SettlementMonth,
        RateLookup::OriginationMonth,
        RateLookup::PaymentMonth,
    ] {
        let config = OptimizerConfig { rate_lookup: lookup };
        let result = optimizer::solve_with(&input, &config, &optimizer::MicroLpSolver).unwrap();
        assert_eq!(result.len(), 72);
        assert_plan_properties(&result);
    }
}

#[test]
fn test_existing_holdings_and_negative_flows() {
    let mut raw = scenario_a(48);
    raw.monthly_expenditures[30] = dec!(80000);
    raw.existing_maturities.insert(24, dec!(50000));
    raw.existing_interest.insert(12, dec!(1250));
    raw.existing_interest.insert(24, dec!(1250));
    let input = OptimizerInput::new(raw).unwrap();
    let result = optimizer::solve(&input).unwrap();

    assert!(result.records()[23].maturities >= dec!(50000));
    assert!(result.records()[11].interest >= dec!(1250));
    assert_plan_properties(&result);
}

#[test]
fn test_infeasible_is_surfaced() {
    let mut raw = scenario_a(24);
    raw.opening_reserve_total = dec!(60000);
    let input = OptimizerInput::new(raw).unwrap();
    let err = optimizer::solve(&input).unwrap_err();
    assert!(matches!(err, ReserveFundError::Infeasible(_)));
}

#[test]
fn test_optimize_plan_round_trips_through_json() {
    let input = OptimizerInput::new(scenario_a(24)).unwrap();
    let out = optimizer::optimize_plan(&input, &OptimizerConfig::default()).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    let records = json["result"]["records"].as_array().unwrap();
    assert_eq!(records.len(), 24);
    for key in [
        "period",
        "opening_balance",
        "contributions",
        "expenditures",
        "interest",
        "closing_balance",
        "bank_balance",
        "current_investments",
        "maturities",
        "term_1",
        "term_2",
        "term_3",
        "term_4",
        "term_5",
        "total_investments",
    ] {
        assert!(records[0].get(key).is_some(), "missing {key}");
    }
    assert!(json["metadata"]["computation_time_us"].is_u64());
}

// ===========================================================================
// Concurrency
// ===========================================================================

#[test]
fn test_independent_solves_on_threads() {
    let handles: Vec<_> = [24usize, 36, 48, 60]
        .into_iter()
        .map(|n| {
            thread::spawn(move || {
                let input = OptimizerInput::new(scenario_a(n)).unwrap();
                (n, optimizer::solve(&input).unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (n, result) = handle.join().unwrap();
        assert_eq!(result.len(), n);
        let again = optimizer::solve(&OptimizerInput::new(scenario_a(n)).unwrap()).unwrap();
        assert_eq!(result, again);
    }
}
