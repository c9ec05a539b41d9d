//! Error types for the loan ledger.

use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur during ledger operation.
///
/// Validation errors carry a specific message naming the failed precondition;
/// callers must correct the input rather than retry. Retry is appropriate
/// only for store-level failures (`ConcurrentModification`, `Io`).
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A creation or reengage precondition failed
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A payment precondition failed
    #[error("invalid payment: {0}")]
    InvalidPayment(String),

    /// Operation referenced a client id absent from the targeted set
    #[error("client {0} not found")]
    NotFound(String),

    /// Optimistic write lost the race; reload the client and retry
    #[error("client {0} was modified concurrently")]
    ConcurrentModification(String),

    /// Sign-in failed; deliberately does not say which field was wrong
    #[error("incorrect email or password")]
    InvalidCredentials,

    /// Sign-up with an email that already has an account
    #[error("an account with this email already exists")]
    AlreadyExists,

    /// Sign-up with a password below the minimum length
    #[error("password must be at least {0} characters")]
    WeakCredential(usize),

    /// Failed to read or write a ledger document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed ledger document
    #[error("ledger document error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV report writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Missing input file argument
    #[error("Missing ledger file argument. Usage: loan-ledger <ledger.json>")]
    MissingArgument,
}
