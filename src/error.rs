// Error taxonomy for reward computation
//
// Both domain errors are terminal for a single request: no retries,
// no partial results.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewardsError {
    /// Unknown customer identifier - checked before any transaction fetch
    #[error("Customer with ID {customer_id} not found.")]
    CustomerNotFound { customer_id: i64 },

    /// Customer exists but has no transactions inside the trailing window
    #[error("No transactions found in the past 90 days.")]
    NoRecentTransactions,

    /// Data-layer failure (surfaced distinctly so callers can map it to 500)
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type RewardsResult<T> = Result<T, RewardsError>;
