// Retail Rewards - Core Library
// Exposes all modules for use in the CLI, API server, and tests

pub mod db;
pub mod error;
pub mod points;
pub mod rewards;
pub mod service;

// Re-export commonly used types
pub use db::{
    count_customers, count_transactions, find_customer, insert_customers, insert_transactions,
    load_customers_csv, load_transactions_csv, setup_database, transactions_since, Customer,
    Transaction,
};
pub use error::{RewardsError, RewardsResult};
pub use points::RewardPolicy;
pub use rewards::{
    aggregate, window_start, MonthlyReward, RewardSummary, TransactionReward, WINDOW_DAYS,
};
pub use service::{RewardStore, RewardsService, SqliteStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
