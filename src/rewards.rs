// Monthly Aggregator - trailing-window reward summary
//
// Filters a customer's transactions to the trailing 90-day window, groups
// them by calendar month name in order of first appearance, applies the
// point policy per transaction and sums per-month and grand totals.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Transaction;
use crate::error::{RewardsError, RewardsResult};
use crate::points::RewardPolicy;

/// Length of the trailing eligibility window, in days
pub const WINDOW_DAYS: i64 = 90;

// ============================================================================
// DERIVED VALUES (wire shape - serialized camelCase)
// ============================================================================

/// Points earned by a single transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReward {
    pub transaction_id: i64,
    pub amount: f64,
    pub reward_points: i64,
}

/// One calendar month's bucket of rewarded transactions
///
/// `transactions` keeps ascending timestamp order; `total_points` is always
/// the sum of their points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReward {
    pub month: String,
    pub total_points: i64,
    pub transactions: Vec<TransactionReward>,
}

/// Full reward summary for one customer
///
/// Months appear in chronological order of first occurrence inside the
/// window, not alphabetically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardSummary {
    pub customer_name: String,
    pub monthly_rewards: Vec<MonthlyReward>,
    pub total_reward_points: i64,
}

// ============================================================================
// WINDOW & GROUPING
// ============================================================================

/// Start of the trailing window: 90 days before the reference instant,
/// truncated to midnight of that calendar day (inclusive lower bound)
pub fn window_start(reference: DateTime<Utc>) -> DateTime<Utc> {
    let day = (reference - Duration::days(WINDOW_DAYS)).date_naive();
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Full English month name, e.g. "June"
///
/// Month name alone is the bucket key, so the same month from different
/// years collapses into one bucket. Known limitation, kept deliberately.
fn month_label(date: DateTime<Utc>) -> String {
    date.format("%B").to_string()
}

/// Group ascending-sorted transactions into month buckets, preserving the
/// order in which each month first appears
fn group_by_month(sorted: &[&Transaction]) -> Vec<(String, Vec<TransactionReward>)> {
    let mut buckets: Vec<(String, Vec<TransactionReward>)> = Vec::new();

    for tx in sorted {
        let label = month_label(tx.transaction_date);
        let reward = TransactionReward {
            transaction_id: tx.transaction_id,
            amount: tx.amount,
            reward_points: 0, // filled in by the caller once the policy is applied
        };

        match buckets.iter_mut().find(|(key, _)| *key == label) {
            Some((_, bucket)) => bucket.push(reward),
            None => buckets.push((label, vec![reward])),
        }
    }

    buckets
}

/// Aggregate a customer's transactions into a `RewardSummary`
///
/// Fails with `NoRecentTransactions` when nothing falls inside the trailing
/// 90-day window. Pure over its inputs: no I/O, no shared state.
pub fn aggregate(
    customer_name: &str,
    transactions: &[Transaction],
    policy: &RewardPolicy,
    reference: DateTime<Utc>,
) -> RewardsResult<RewardSummary> {
    let cutoff = window_start(reference);

    let mut recent: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| tx.transaction_date >= cutoff)
        .collect();

    if recent.is_empty() {
        return Err(RewardsError::NoRecentTransactions);
    }

    // Stable sort: transactions sharing a timestamp keep their input order
    recent.sort_by_key(|tx| tx.transaction_date);

    let monthly_rewards: Vec<MonthlyReward> = group_by_month(&recent)
        .into_iter()
        .map(|(month, mut rewards)| {
            for reward in &mut rewards {
                reward.reward_points = policy.compute_points(reward.amount);
            }
            let total_points = rewards.iter().map(|r| r.reward_points).sum();
            MonthlyReward {
                month,
                total_points,
                transactions: rewards,
            }
        })
        .collect();

    let total_reward_points = monthly_rewards.iter().map(|m| m.total_points).sum();

    Ok(RewardSummary {
        customer_name: customer_name.to_string(),
        monthly_rewards,
        total_reward_points,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tx(id: i64, date: DateTime<Utc>, amount: f64) -> Transaction {
        Transaction {
            transaction_id: id,
            customer_id: 1001,
            transaction_date: date,
            amount,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    // Reference instant used across tests: 2025-07-15 12:00 UTC.
    // Window start = 2025-04-16 00:00 UTC.
    fn reference() -> DateTime<Utc> {
        at(2025, 7, 15, 12)
    }

    #[test]
    fn test_window_start_truncates_to_midnight() {
        let start = window_start(reference());
        assert_eq!(start, at(2025, 4, 16, 0));
    }

    #[test]
    fn test_boundary_transaction_exactly_90_days_included() {
        let policy = RewardPolicy::default();
        let txs = vec![tx(10006, at(2025, 4, 16, 0), 120.0)];

        let summary = aggregate("Kriti Sen", &txs, &policy, reference()).unwrap();

        assert_eq!(summary.total_reward_points, 90);
        assert_eq!(summary.monthly_rewards.len(), 1);
        assert_eq!(summary.monthly_rewards[0].month, "April");
    }

    #[test]
    fn test_transaction_91_days_ago_excluded() {
        let policy = RewardPolicy::default();
        let txs = vec![tx(10007, at(2025, 4, 15, 23), 120.0)];

        let result = aggregate("Kriti Sen", &txs, &policy, reference());

        assert!(matches!(result, Err(RewardsError::NoRecentTransactions)));
    }

    #[test]
    fn test_empty_transaction_set_is_an_error() {
        let policy = RewardPolicy::default();

        let result = aggregate("Kriti Sen", &[], &policy, reference());

        assert!(matches!(result, Err(RewardsError::NoRecentTransactions)));
    }

    #[test]
    fn test_months_ordered_by_first_occurrence() {
        let policy = RewardPolicy::default();
        // Unordered input spanning May, June, July
        let txs = vec![
            tx(3, at(2025, 7, 1, 10), 120.0),
            tx(1, at(2025, 5, 2, 10), 120.0),
            tx(2, at(2025, 6, 10, 10), 120.0),
        ];

        let summary = aggregate("Pawan Sehgal", &txs, &policy, reference()).unwrap();

        let months: Vec<&str> = summary
            .monthly_rewards
            .iter()
            .map(|m| m.month.as_str())
            .collect();
        // Chronological first-appearance order, not alphabetical
        // (alphabetical would be July, June, May)
        assert_eq!(months, vec!["May", "June", "July"]);
    }

    #[test]
    fn test_two_months_have_isolated_totals() {
        let policy = RewardPolicy::default();
        let txs = vec![
            tx(10060, at(2025, 6, 30, 23), 120.0),
            tx(10061, at(2025, 5, 31, 0), 130.0),
        ];

        let summary = aggregate("Priyam Goel", &txs, &policy, reference()).unwrap();

        assert_eq!(summary.monthly_rewards.len(), 2);
        assert_eq!(summary.monthly_rewards[0].month, "May");
        assert_eq!(summary.monthly_rewards[0].total_points, 110); // (130-100)*2+50
        assert_eq!(summary.monthly_rewards[1].month, "June");
        assert_eq!(summary.monthly_rewards[1].total_points, 90);
        assert_eq!(summary.total_reward_points, 200);
    }

    #[test]
    fn test_transactions_within_month_keep_ascending_order() {
        let policy = RewardPolicy::default();
        let txs = vec![
            tx(2, at(2025, 6, 20, 10), 60.0),
            tx(1, at(2025, 6, 5, 10), 70.0),
            tx(3, at(2025, 6, 25, 10), 80.0),
        ];

        let summary = aggregate("Kriti Sen", &txs, &policy, reference()).unwrap();

        let ids: Vec<i64> = summary.monthly_rewards[0]
            .transactions
            .iter()
            .map(|t| t.transaction_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_stable_sort_preserves_tie_order() {
        let policy = RewardPolicy::default();
        let same_instant = at(2025, 6, 5, 10);
        let txs = vec![
            tx(7, same_instant, 60.0),
            tx(3, same_instant, 70.0),
            tx(9, same_instant, 80.0),
        ];

        let summary = aggregate("Kriti Sen", &txs, &policy, reference()).unwrap();

        let ids: Vec<i64> = summary.monthly_rewards[0]
            .transactions
            .iter()
            .map(|t| t.transaction_id)
            .collect();
        assert_eq!(ids, vec![7, 3, 9]);
    }

    #[test]
    fn test_month_totals_sum_to_grand_total() {
        let policy = RewardPolicy::default();
        let txs = vec![
            tx(1, at(2025, 5, 2, 10), 45.0),
            tx(2, at(2025, 5, 20, 10), 75.5),
            tx(3, at(2025, 6, 10, 10), 120.0),
            tx(4, at(2025, 7, 1, 10), 999.0),
        ];

        let summary = aggregate("Kriti Sen", &txs, &policy, reference()).unwrap();

        let tx_sum: i64 = summary
            .monthly_rewards
            .iter()
            .flat_map(|m| m.transactions.iter())
            .map(|t| t.reward_points)
            .sum();
        let month_sum: i64 = summary.monthly_rewards.iter().map(|m| m.total_points).sum();

        assert_eq!(tx_sum, month_sum);
        assert_eq!(month_sum, summary.total_reward_points);

        let per_tx: i64 = txs.iter().map(|t| policy.compute_points(t.amount)).sum();
        assert_eq!(summary.total_reward_points, per_tx);
    }

    #[test]
    fn test_same_month_name_across_years_shares_a_bucket() {
        // Grouping keys on month name only, so June 2024 and June 2025
        // land in the same bucket. Latent cross-year defect, preserved.
        let a = tx(1, at(2024, 6, 10, 10), 120.0);
        let b = tx(2, at(2025, 6, 10, 10), 120.0);
        let sorted = vec![&a, &b];

        let buckets = group_by_month(&sorted);

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].0, "June");
        assert_eq!(buckets[0].1.len(), 2);
    }

    #[test]
    fn test_wire_shape_field_names() {
        let policy = RewardPolicy::default();
        let txs = vec![tx(10006, at(2025, 5, 2, 10), 120.0)];

        let summary = aggregate("Kriti Sen", &txs, &policy, reference()).unwrap();
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["customerName"], "Kriti Sen");
        assert_eq!(json["totalRewardPoints"], 90);
        assert_eq!(json["monthlyRewards"][0]["month"], "May");
        assert_eq!(json["monthlyRewards"][0]["totalPoints"], 90);
        let tx_json = &json["monthlyRewards"][0]["transactions"][0];
        assert_eq!(tx_json["transactionId"], 10006);
        assert_eq!(tx_json["amount"], 120.0);
        assert_eq!(tx_json["rewardPoints"], 90);
    }
}
