use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReserveFundError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Length mismatch: {field} has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Missing ledger data: {0}")]
    MissingLedgerData(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Infeasible plan: {0}")]
    Infeasible(String),

    #[error("Unbounded plan: {0}")]
    Unbounded(String),

    #[error("Solver failure: {0}")]
    SolverFailure(String),

    #[error("Inconsistent solution in period {period}: {reason}")]
    Consistency { period: usize, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ReserveFundError {
    fn from(e: serde_json::Error) -> Self {
        ReserveFundError::SerializationError(e.to_string())
    }
}

impl ReserveFundError {
    /// True for errors raised before any solve is attempted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ReserveFundError::InvalidInput { .. }
                | ReserveFundError::LengthMismatch { .. }
                | ReserveFundError::MissingLedgerData(_)
                | ReserveFundError::DateError(_)
                | ReserveFundError::SerializationError(_)
        )
    }
}
