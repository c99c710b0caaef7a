use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;

use super::ledger::{AtMaturityInterest, Holding};
use crate::calendar::{month_index, relative_period};
use crate::error::ReserveFundError;
use crate::types::{Money, MONTHS_PER_YEAR};
use crate::ReserveFundResult;

/// Fixed cash inflows from holdings bought before the plan starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExistingSchedules {
    pub interest: BTreeMap<usize, Money>,
    pub maturities: BTreeMap<usize, Money>,
}

/// Spread annual totals evenly over months, then drop the first
/// `first_period` months.
///
/// Exactly `years` annual values are used; a shorter list is a
/// `LengthMismatch` and extra values are ignored.
pub fn monthly_flows(
    field: &str,
    annual: &[Money],
    years: usize,
    first_period: usize,
) -> ReserveFundResult<Vec<Money>> {
    if annual.len() < years {
        return Err(ReserveFundError::LengthMismatch {
            field: field.into(),
            expected: years,
            actual: annual.len(),
        });
    }
    let months = Decimal::from(MONTHS_PER_YEAR as u32);
    let monthly: Vec<Money> = annual[..years]
        .iter()
        .flat_map(|total| std::iter::repeat(*total / months).take(MONTHS_PER_YEAR))
        .skip(first_period)
        .collect();

    let expected = (years * MONTHS_PER_YEAR).saturating_sub(first_period);
    if monthly.len() != expected {
        return Err(ReserveFundError::LengthMismatch {
            field: field.into(),
            expected,
            actual: monthly.len(),
        });
    }
    Ok(monthly)
}

/// Accumulate coupons and returning principal of `holdings` into per-period
/// schedules for a plan of `periods` months.
///
/// Coupons are paid at the maturity period and every coupon interval before
/// it. Payments landing outside `1..=periods` are dropped.
pub fn project_holdings<'a>(
    holdings: impl IntoIterator<Item = &'a Holding>,
    first_year: i32,
    first_period: usize,
    periods: usize,
    at_maturity: AtMaturityInterest,
) -> ExistingSchedules {
    let mut schedules = ExistingSchedules::default();
    let window = 1..=periods as i64;

    for holding in holdings {
        let maturity = relative_period(first_year, first_period, holding.maturity_date);

        for (period, payment) in coupon_payments(holding, maturity, at_maturity) {
            if window.contains(&period) {
                *schedules.interest.entry(period as usize).or_default() += payment;
            }
        }

        if window.contains(&maturity) {
            *schedules.maturities.entry(maturity as usize).or_default() += holding.amount;
        } else {
            warn!(
                "holding '{}' matures in period {maturity}, outside the {periods}-period plan; principal not scheduled",
                holding.label()
            );
        }
    }
    schedules
}

fn coupon_payments(
    holding: &Holding,
    maturity: i64,
    at_maturity: AtMaturityInterest,
) -> Vec<(i64, Money)> {
    match holding.interest_frequency.months() {
        Some(step) => {
            let payment = holding.amount * holding.interest_rate * Decimal::from(step)
                / Decimal::from(MONTHS_PER_YEAR as u32);
            let mut out = Vec::new();
            let mut period = maturity;
            while period >= 1 {
                out.push((period, payment));
                period -= step as i64;
            }
            out
        }
        None => {
            let months = match (at_maturity, holding.issue_date) {
                (AtMaturityInterest::Zero, _) => 0,
                (AtMaturityInterest::Accrued, Some(issued)) => {
                    months_between(issued, holding.maturity_date)
                }
                (AtMaturityInterest::Accrued, None) => {
                    warn!(
                        "holding '{}' pays at maturity but has no issue date; its interest is taken as zero",
                        holding.label()
                    );
                    0
                }
            };
            let payment = holding.amount * holding.interest_rate * Decimal::from(months)
                / Decimal::from(MONTHS_PER_YEAR as u32);
            vec![(maturity, payment)]
        }
    }
}

fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (month_index(to) - month_index(from)).max(0)
}
