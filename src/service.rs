// Rewards service - wires the data layer to the aggregator
//
// The data-access collaborator is an explicit trait parameter, so the
// service can run against SQLite in production and an in-memory store
// in tests.

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::db::{self, Customer, Transaction};
use crate::error::{RewardsError, RewardsResult};
use crate::points::RewardPolicy;
use crate::rewards::{self, RewardSummary};

/// Data-access collaborator for reward computation
///
/// `transactions_since` only has to restrict by the cutoff; ordering and
/// window semantics belong to the aggregator.
pub trait RewardStore {
    fn find_customer(&self, customer_id: i64) -> RewardsResult<Option<Customer>>;

    fn transactions_since(
        &self,
        customer_id: i64,
        cutoff: DateTime<Utc>,
    ) -> RewardsResult<Vec<Transaction>>;
}

/// SQLite-backed store over a borrowed connection
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SqliteStore { conn }
    }
}

impl RewardStore for SqliteStore<'_> {
    fn find_customer(&self, customer_id: i64) -> RewardsResult<Option<Customer>> {
        Ok(db::find_customer(self.conn, customer_id)?)
    }

    fn transactions_since(
        &self,
        customer_id: i64,
        cutoff: DateTime<Utc>,
    ) -> RewardsResult<Vec<Transaction>> {
        Ok(db::transactions_since(self.conn, customer_id, cutoff)?)
    }
}

/// Computes reward summaries for customers
pub struct RewardsService<S: RewardStore> {
    store: S,
    policy: RewardPolicy,
}

impl<S: RewardStore> RewardsService<S> {
    pub fn new(store: S, policy: RewardPolicy) -> Self {
        RewardsService { store, policy }
    }

    /// Reward summary for one customer over the trailing 90-day window
    /// ending at `now`.
    ///
    /// The customer lookup happens first: aggregation is never attempted
    /// for an unknown customer.
    pub fn rewards_for_customer(
        &self,
        customer_id: i64,
        now: DateTime<Utc>,
    ) -> RewardsResult<RewardSummary> {
        let customer = self
            .store
            .find_customer(customer_id)?
            .ok_or(RewardsError::CustomerNotFound { customer_id })?;

        log::debug!(
            "Computing rewards for customer {} ({})",
            customer.customer_id,
            customer.customer_name
        );

        let cutoff = rewards::window_start(now);
        let transactions = self.store.transactions_since(customer_id, cutoff)?;

        rewards::aggregate(&customer.customer_name, &transactions, &self.policy, now)
    }
}

// ============================================================================
// TESTS
// ============================================================================
