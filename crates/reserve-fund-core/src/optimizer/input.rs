use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ReserveFundError;
use crate::types::{Money, Rate, TERMS};
use crate::ReserveFundResult;

/// Wire shape of the optimizer input.
///
/// Unknown keys and wrongly typed values are rejected during
/// deserialisation; shape rules are checked by [`OptimizerInput::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawOptimizerInput {
    /// Number of monthly periods to project.
    pub period_count: usize,
    /// Contribution per period.
    pub monthly_contributions: Vec<Money>,
    /// Expenditure per period.
    pub monthly_expenditures: Vec<Money>,
    /// Reserve bank account balance at period 0.
    pub opening_bank_balance: Money,
    /// Bank balance plus the value of investments currently held.
    pub opening_reserve_total: Money,
    /// Annual bank-account rate per period.
    pub bank_rates: Vec<Rate>,
    /// Annual rate of each of the five terms per period.
    pub term_rates: Vec<Vec<Rate>>,
    /// Interest paid by existing holdings, keyed by 1-based period.
    #[serde(default)]
    pub existing_interest: BTreeMap<usize, Money>,
    /// Principal returned by existing holdings, keyed by 1-based period.
    #[serde(default)]
    pub existing_maturities: BTreeMap<usize, Money>,
}

/// Validated, immutable optimizer input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOptimizerInput", into = "RawOptimizerInput")]
pub struct OptimizerInput {
    period_count: usize,
    monthly_contributions: Vec<Money>,
    monthly_expenditures: Vec<Money>,
    opening_bank_balance: Money,
    opening_reserve_total: Money,
    bank_rates: Vec<Rate>,
    term_rates: Vec<[Rate; TERMS]>,
    existing_interest: BTreeMap<usize, Money>,
    existing_maturities: BTreeMap<usize, Money>,
}

impl OptimizerInput {
    /// Validate a raw record. No solve is ever attempted on a record that
    /// fails here.
    pub fn new(raw: RawOptimizerInput) -> ReserveFundResult<Self> {
        let n = raw.period_count;
        if n == 0 {
            return Err(ReserveFundError::InvalidInput {
                field: "period_count".into(),
                reason: "At least one period is required".into(),
            });
        }

        check_length("monthly_contributions", n, raw.monthly_contributions.len())?;
        check_length("monthly_expenditures", n, raw.monthly_expenditures.len())?;
        check_length("bank_rates", n, raw.bank_rates.len())?;
        check_length("term_rates", n, raw.term_rates.len())?;

        for (i, rate) in raw.bank_rates.iter().enumerate() {
            check_rate(&format!("bank_rates[{i}]"), *rate)?;
        }

        let mut term_rates = Vec::with_capacity(n);
        for (i, row) in raw.term_rates.iter().enumerate() {
            let fixed: [Rate; TERMS] =
                row.as_slice()
                    .try_into()
                    .map_err(|_| ReserveFundError::InvalidInput {
                        field: format!("term_rates[{i}]"),
                        reason: format!("Expected {TERMS} term rates, found {}", row.len()),
                    })?;
            for (j, rate) in fixed.iter().enumerate() {
                check_rate(&format!("term_rates[{i}][{j}]"), *rate)?;
            }
            term_rates.push(fixed);
        }

        check_schedule("existing_interest", n, &raw.existing_interest)?;
        check_schedule("existing_maturities", n, &raw.existing_maturities)?;

        Ok(Self {
            period_count: n,
            monthly_contributions: raw.monthly_contributions,
            monthly_expenditures: raw.monthly_expenditures,
            opening_bank_balance: raw.opening_bank_balance,
            opening_reserve_total: raw.opening_reserve_total,
            bank_rates: raw.bank_rates,
            term_rates,
            existing_interest: raw.existing_interest,
            existing_maturities: raw.existing_maturities,
        })
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> ReserveFundResult<Self> {
        let raw: RawOptimizerInput = serde_json::from_str(json)?;
        Self::new(raw)
    }

    pub fn period_count(&self) -> usize {
        self.period_count
    }

    pub fn monthly_contributions(&self) -> &[Money] {
        &self.monthly_contributions
    }

    pub fn monthly_expenditures(&self) -> &[Money] {
        &self.monthly_expenditures
    }

    pub fn opening_bank_balance(&self) -> Money {
        self.opening_bank_balance
    }

    pub fn opening_reserve_total(&self) -> Money {
        self.opening_reserve_total
    }

    pub fn bank_rates(&self) -> &[Rate] {
        &self.bank_rates
    }

    pub fn term_rates(&self) -> &[[Rate; TERMS]] {
        &self.term_rates
    }

    pub fn existing_interest(&self) -> &BTreeMap<usize, Money> {
        &self.existing_interest
    }

    pub fn existing_maturities(&self) -> &BTreeMap<usize, Money> {
        &self.existing_maturities
    }

    /// Existing-holding interest paid in a 1-based period.
    pub fn existing_interest_at(&self, period: usize) -> Money {
        self.existing_interest
            .get(&period)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Existing-holding principal returned in a 1-based period.
    pub fn existing_maturity_at(&self, period: usize) -> Money {
        self.existing_maturities
            .get(&period)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Contribution minus expenditure, per period.
    pub fn net_flows(&self) -> Vec<Money> {
        self.monthly_contributions
            .iter()
            .zip(&self.monthly_expenditures)
            .map(|(c, e)| c - e)
            .collect()
    }
}

impl TryFrom<RawOptimizerInput> for OptimizerInput {
    type Error = ReserveFundError;

    fn try_from(raw: RawOptimizerInput) -> Result<Self, Self::Error> {
        OptimizerInput::new(raw)
    }
}

impl From<OptimizerInput> for RawOptimizerInput {
    fn from(input: OptimizerInput) -> Self {
        RawOptimizerInput {
            period_count: input.period_count,
            monthly_contributions: input.monthly_contributions,
            monthly_expenditures: input.monthly_expenditures,
            opening_bank_balance: input.opening_bank_balance,
            opening_reserve_total: input.opening_reserve_total,
            bank_rates: input.bank_rates,
            term_rates: input.term_rates.into_iter().map(|row| row.to_vec()).collect(),
            existing_interest: input.existing_interest,
            existing_maturities: input.existing_maturities,
        }
    }
}

fn check_length(field: &str, expected: usize, actual: usize) -> ReserveFundResult<()> {
    if expected != actual {
        return Err(ReserveFundError::LengthMismatch {
            field: field.into(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_rate(field: &str, rate: Rate) -> ReserveFundResult<()> {
    if rate < Decimal::ZERO {
        return Err(ReserveFundError::InvalidInput {
            field: field.into(),
            reason: format!("Rate {rate} is negative; rates must be floored at zero first"),
        });
    }
    Ok(())
}

fn check_schedule(
    field: &str,
    period_count: usize,
    schedule: &BTreeMap<usize, Money>,
) -> ReserveFundResult<()> {
    for (period, amount) in schedule {
        if *period == 0 || *period > period_count {
            return Err(ReserveFundError::InvalidInput {
                field: field.into(),
                reason: format!("Period {period} is outside 1..={period_count}"),
            });
        }
        if *amount < Decimal::ZERO {
            return Err(ReserveFundError::InvalidInput {
                field: field.into(),
                reason: format!("Amount {amount} in period {period} is negative"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(periods: usize) -> RawOptimizerInput {
        RawOptimizerInput {
            period_count: periods,
            monthly_contributions: vec![dec!(5000); periods],
            monthly_expenditures: vec![dec!(3000); periods],
            opening_bank_balance: dec!(125000),
            opening_reserve_total: dec!(125000),
            bank_rates: vec![dec!(0.008); periods],
            term_rates: vec![
                vec![dec!(0.01), dec!(0.02), dec!(0.03), dec!(0.04), dec!(0.05)];
                periods
            ],
            existing_interest: BTreeMap::new(),
            existing_maturities: BTreeMap::new(),
        }
    }

    fn expect_length_mismatch(raw: RawOptimizerInput, field: &str) {
        match OptimizerInput::new(raw) {
            Err(ReserveFundError::LengthMismatch { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected length mismatch on {field}, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_input_accepted() {
        let input = OptimizerInput::new(raw(24)).unwrap();
        assert_eq!(input.period_count(), 24);
        assert!(input.existing_interest().is_empty());
        assert_eq!(input.net_flows(), vec![dec!(2000); 24]);
    }

    #[test]
    fn test_every_sequence_length_checked() {
        let mut r = raw(24);
        r.monthly_contributions.pop();
        expect_length_mismatch(r, "monthly_contributions");

        let mut r = raw(24);
        r.monthly_expenditures.push(dec!(1));
        expect_length_mismatch(r, "monthly_expenditures");

        let mut r = raw(24);
        r.bank_rates.pop();
        expect_length_mismatch(r, "bank_rates");

        let mut r = raw(24);
        r.term_rates.pop();
        expect_length_mismatch(r, "term_rates");
    }

    #[test]
    fn test_zero_periods_rejected() {
        assert!(OptimizerInput::new(raw(0)).is_err());
    }

    #[test]
    fn test_short_term_row_rejected() {
        let mut r = raw(3);
        r.term_rates[1] = vec![dec!(0.01), dec!(0.02)];
        let err = OptimizerInput::new(r).unwrap_err();
        assert!(err.to_string().contains("term_rates[1]"));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut r = raw(3);
        r.bank_rates[2] = dec!(-0.001);
        assert!(matches!(
            OptimizerInput::new(r),
            Err(ReserveFundError::InvalidInput { .. })
        ));

        let mut r = raw(3);
        r.term_rates[0][4] = dec!(-0.01);
        assert!(OptimizerInput::new(r).is_err());
    }

    #[test]
    fn test_schedule_keys_must_be_in_range() {
        let mut r = raw(12);
        r.existing_interest.insert(0, dec!(10));
        assert!(OptimizerInput::new(r).is_err());

        let mut r = raw(12);
        r.existing_maturities.insert(13, dec!(10));
        assert!(OptimizerInput::new(r).is_err());

        let mut r = raw(12);
        r.existing_maturities.insert(12, dec!(10));
        assert_eq!(
            OptimizerInput::new(r).unwrap().existing_maturity_at(12),
            dec!(10)
        );
    }

    #[test]
    fn test_unknown_key_rejected_from_json() {
        let json = r#"{
            "period_count": 1,
            "monthly_contributions": [0],
            "monthly_expenditures": [0],
            "opening_bank_balance": 1,
            "opening_reserve_total": 1,
            "bank_rates": [0.01],
            "term_rates": [[0.01, 0.02, 0.03, 0.04, 0.05]],
            "new_key": "some new key"
        }"#;
        let err = OptimizerInput::from_json(json).unwrap_err();
        assert!(matches!(err, ReserveFundError::SerializationError(_)));
        assert!(err.to_string().contains("new_key"));
    }

    #[test]
    fn test_wrong_type_rejected_from_json() {
        let json = r#"{
            "period_count": [1, 2, 3, 4],
            "monthly_contributions": [0],
            "monthly_expenditures": [0],
            "opening_bank_balance": 1,
            "opening_reserve_total": 1,
            "bank_rates": [0.01],
            "term_rates": [[0.01, 0.02, 0.03, 0.04, 0.05]]
        }"#;
        assert!(OptimizerInput::from_json(json).is_err());
    }

    #[test]
    fn test_optional_schedules_default_to_empty() {
        let json = r#"{
            "period_count": 2,
            "monthly_contributions": [0, 0],
            "monthly_expenditures": [0, 0],
            "opening_bank_balance": 1,
            "opening_reserve_total": 1,
            "bank_rates": [0.01, 0.01],
            "term_rates": [[0.01, 0.02, 0.03, 0.04, 0.05], [0.01, 0.02, 0.03, 0.04, 0.05]],
            "existing_maturities": {"2": 500}
        }"#;
        let input = OptimizerInput::from_json(json).unwrap();
        assert!(input.existing_interest().is_empty());
        assert_eq!(input.existing_maturity_at(2), dec!(500));
        assert_eq!(input.existing_maturity_at(1), Decimal::ZERO);
    }

    #[test]
    fn test_deserialising_validated_type_runs_checks() {
        let mut r = raw(4);
        r.bank_rates.pop();
        let value = serde_json::to_value(&r).unwrap();
        let parsed: Result<OptimizerInput, _> = serde_json::from_value(value);
        assert!(parsed.is_err());
    }
}
