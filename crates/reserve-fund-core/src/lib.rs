pub mod calendar;
pub mod error;
pub mod optimizer;
pub mod rates;
pub mod types;

#[cfg(feature = "converter")]
pub mod converter;

#[cfg(feature = "schedule")]
pub mod schedule;

#[cfg(feature = "selection")]
pub mod selection;

pub use error::ReserveFundError;
pub use types::*;

/// Standard result type for all reserve-fund operations
pub type ReserveFundResult<T> = Result<T, ReserveFundError>;
