//! Study calendar arithmetic.
//!
//! A study runs in monthly periods starting with January of its first year.
//! Period `n` (1-based) is identified by the last calendar day of its month,
//! which is the date the storage layer attaches to each projected record.

use chrono::{Datelike, NaiveDate};

use crate::error::ReserveFundError;
use crate::types::MONTHS_PER_YEAR;
use crate::ReserveFundResult;

/// Absolute month number of a date (`year * 12 + zero-based month`).
pub fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * MONTHS_PER_YEAR as i64 + date.month0() as i64
}

/// Last calendar day of the given month.
pub fn month_end(year: i32, month: u32) -> ReserveFundResult<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| ReserveFundError::DateError(format!("no month end for {year}-{month:02}")))
}

/// True when `date` is the last day of its month.
pub fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.month() != date.month())
}

/// Month-end date of study period `period` (1-based) for a study starting in
/// January of `first_year`.
pub fn period_end_date(first_year: i32, period: usize) -> ReserveFundResult<NaiveDate> {
    if period == 0 {
        return Err(ReserveFundError::DateError(
            "Study periods are 1-based; period 0 has no date".into(),
        ));
    }
    let offset = period - 1;
    let year = first_year + (offset / MONTHS_PER_YEAR) as i32;
    let month = (offset % MONTHS_PER_YEAR) as u32 + 1;
    month_end(year, month)
}

/// Month-end dates for periods `1..=count`.
pub fn period_dates(first_year: i32, count: usize) -> ReserveFundResult<Vec<NaiveDate>> {
    (1..=count)
        .map(|period| period_end_date(first_year, period))
        .collect()
}

/// Number of leading study periods that precede the ledger's balance entry.
///
/// The projection starts at the latest study month-end falling on or before
/// `balance_date`; every earlier period is dropped.
pub fn first_period_offset(first_year: i32, balance_date: NaiveDate) -> ReserveFundResult<usize> {
    let study_start = NaiveDate::from_ymd_opt(first_year, 1, 1)
        .ok_or_else(|| ReserveFundError::DateError(format!("invalid study year {first_year}")))?;
    if balance_date < study_start {
        return Err(ReserveFundError::DateError(format!(
            "balance date {balance_date} precedes the study start {study_start}"
        )));
    }

    let whole_months = (month_index(balance_date) - month_index(study_start)) as usize;
    let month_ends_on_or_before = whole_months + usize::from(is_month_end(balance_date));
    Ok(month_ends_on_or_before.saturating_sub(1))
}

/// Period number of `date`'s month relative to a projection that skipped
/// `first_period` study periods. May be zero or negative for earlier months.
pub fn relative_period(first_year: i32, first_period: usize, date: NaiveDate) -> i64 {
    let study_month0 = first_year as i64 * MONTHS_PER_YEAR as i64;
    month_index(date) - study_month0 - first_period as i64 + 1
}
