use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ReserveFundError;
use crate::ReserveFundResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Annual rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Number of fixed investment terms (1 through 5 years).
pub const TERMS: usize = 5;

/// Months in one investment year; also the coupon interval.
pub const MONTHS_PER_YEAR: usize = 12;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "f64 solve, rust_decimal_128bit reporting".to_string(),
        },
    }
}

/// Convert a Decimal into the solver's f64 domain.
pub(crate) fn to_f64(value: Decimal, field: &str) -> ReserveFundResult<f64> {
    value.to_f64().ok_or_else(|| ReserveFundError::InvalidInput {
        field: field.into(),
        reason: format!("{value} cannot be represented as f64"),
    })
}

/// Convert a solver value back into a Decimal.
pub(crate) fn from_f64(value: f64, period: usize, what: &str) -> ReserveFundResult<Decimal> {
    Decimal::from_f64(value).ok_or_else(|| ReserveFundError::Consistency {
        period,
        reason: format!("{what} is not a finite number ({value})"),
    })
}
