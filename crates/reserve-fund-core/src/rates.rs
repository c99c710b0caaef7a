//! Interest-rate schedules consumed by the optimizer.
//!
//! A schedule pairs the reserve bank account's annual rate with the annual
//! rates of the five fixed terms, one row per monthly period. Schedules come
//! from a flat demonstration assumption, a caller-supplied override, or a
//! yield-curve forecast; in every case negative rates are floored at zero.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Rate, TERMS};

/// Flat bank-account rate used when no forecast is available.
pub const NAIVE_BANK_RATE: Rate = dec!(0.008);

/// Flat 1..5 year term rates used when no forecast is available.
pub const NAIVE_TERM_RATES: [Rate; TERMS] =
    [dec!(0.01), dec!(0.02), dec!(0.03), dec!(0.04), dec!(0.05)];

/// Bank and term rates per period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSchedule {
    pub bank_rates: Vec<Rate>,
    pub term_rates: Vec<[Rate; TERMS]>,
}

impl RateSchedule {
    /// Number of periods covered (bank rate count).
    pub fn len(&self) -> usize {
        self.bank_rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bank_rates.is_empty()
    }

    /// Floor every negative rate at zero.
    pub fn clamp_negative(mut self) -> Self {
        for rate in self.bank_rates.iter_mut() {
            *rate = floor_at_zero(*rate);
        }
        for row in self.term_rates.iter_mut() {
            for rate in row.iter_mut() {
                *rate = floor_at_zero(*rate);
            }
        }
        self
    }

    /// Keep at most `length` periods.
    pub fn truncate(mut self, length: usize) -> Self {
        self.bank_rates.truncate(length);
        self.term_rates.truncate(length);
        self
    }

    /// Subtract an account's contractual spread from every bank rate.
    pub fn less_bank_spread(mut self, spread: Rate) -> Self {
        for rate in self.bank_rates.iter_mut() {
            *rate -= spread;
        }
        self
    }
}

fn floor_at_zero(rate: Rate) -> Rate {
    if rate < Decimal::ZERO {
        Decimal::ZERO
    } else {
        rate
    }
}

/// Flat demonstration schedule for `periods` months.
pub fn naive_rates(periods: usize) -> RateSchedule {
    RateSchedule {
        bank_rates: vec![NAIVE_BANK_RATE; periods],
        term_rates: vec![NAIVE_TERM_RATES; periods],
    }
}

/// Anything that can split itself into a bank-rate sequence and a 5-term
/// rate matrix, optionally truncated to the first `length` periods.
pub trait RateForecastProvider {
    fn split_rates(&self, length: Option<usize>) -> RateSchedule;
}

/// One forecast month of the reference (policy) rate and the GIC curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub reference_rate: Rate,
    pub one_year: Rate,
    pub two_year: Rate,
    pub three_year: Rate,
    pub four_year: Rate,
    pub five_year: Rate,
}

impl ForecastRow {
    fn term_rates(&self) -> [Rate; TERMS] {
        [
            self.one_year,
            self.two_year,
            self.three_year,
            self.four_year,
            self.five_year,
        ]
    }
}

/// A monthly yield-curve forecast, ordered by date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateForecast {
    pub rows: Vec<ForecastRow>,
}

impl RateForecastProvider for RateForecast {
    fn split_rates(&self, length: Option<usize>) -> RateSchedule {
        let take = length.unwrap_or(self.rows.len());
        let rows = self.rows.iter().take(take);
        let (bank_rates, term_rates) = rows.map(|r| (r.reference_rate, r.term_rates())).unzip();
        RateSchedule {
            bank_rates,
            term_rates,
        }
    }
}

impl RateForecastProvider for RateSchedule {
    fn split_rates(&self, length: Option<usize>) -> RateSchedule {
        match length {
            Some(n) => self.clone().truncate(n),
            None => self.clone(),
        }
    }
}

/// Where the converter obtains its rate schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "source", content = "data", rename_all = "snake_case")]
pub enum RateSource {
    /// Flat demonstration rates.
    #[default]
    Naive,
    /// A caller-supplied schedule, used as-is apart from zero flooring.
    Given(RateSchedule),
    /// A forecast whose reference rate is reduced by the account spread.
    Forecast(RateForecast),
}

impl RateSource {
    /// Resolve a schedule of (at most) `periods` months for an account with
    /// the given spread below the reference rate. Negative rates are floored.
    pub fn resolve(&self, periods: usize, spread: Rate) -> RateSchedule {
        let schedule = match self {
            RateSource::Naive => naive_rates(periods),
            RateSource::Given(schedule) => schedule.split_rates(Some(periods)),
            RateSource::Forecast(forecast) => {
                forecast.split_rates(Some(periods)).less_bank_spread(spread)
            }
        };
        schedule.clamp_negative()
    }
}
