//! Error types for the settlement engine.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, SettleError>;

/// Errors that can occur while building a group or settling it.
#[derive(Error, Debug)]
pub enum SettleError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Report serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed expense entry: non-positive amount, empty split, missing payer
    #[error("Invalid expense: {reason}")]
    InvalidExpense { reason: String },

    /// A member with the same name or email is already in the group
    #[error("Member already exists: {name}")]
    DuplicateMember { name: String },

    /// Blank member name
    #[error("Invalid member: {0}")]
    InvalidMember(String),

    /// No expense with this id in the group
    #[error("Expense {id} not found")]
    UnknownExpense { id: u32 },

    /// Group status label outside `active | settled | archived`
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// Bad value in an environment setting
    #[error("Invalid configuration {key}: {message}")]
    InvalidConfig { key: &'static str, message: String },

    /// Missing input file argument
    #[error("Missing input file argument. Usage: trip-settle <ledger.csv> [--csv]")]
    MissingArgument,
}

impl SettleError {
    pub(crate) fn invalid_expense(reason: impl Into<String>) -> Self {
        SettleError::InvalidExpense {
            reason: reason.into(),
        }
    }
}
