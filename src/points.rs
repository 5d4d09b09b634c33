// Point Calculator - tiered marginal reward accrual
//
// Two-tier policy: nothing below the first limit, 1 point per dollar
// between the limits, 2 points per dollar above the second limit.
// Rounding happens once, on the final value.

use serde::{Deserialize, Serialize};

/// Reward accrual policy with two marginal-rate thresholds
///
/// Invariant: `first_limit < second_limit`. The reference policy is 50/100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RewardPolicy {
    pub first_limit: f64,
    pub second_limit: f64,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        RewardPolicy {
            first_limit: 50.0,
            second_limit: 100.0,
        }
    }
}

impl RewardPolicy {
    /// Compute reward points for a single transaction amount
    ///
    /// - `amount > second_limit`: 2 points per dollar above the second limit,
    ///   plus the full first-tier band
    /// - `first_limit < amount <= second_limit`: 1 point per dollar above
    ///   the first limit
    /// - otherwise: 0 (covers zero and negative amounts)
    ///
    /// Half-up rounding applied once to the final value. `i64` leaves ample
    /// headroom for very large amounts (999,999 → 1,999,848 points).
    pub fn compute_points(&self, amount: f64) -> i64 {
        if amount > self.second_limit {
            ((amount - self.second_limit) * 2.0 + (self.second_limit - self.first_limit)).round()
                as i64
        } else if amount > self.first_limit {
            (amount - self.first_limit).round() as i64
        } else {
            0
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_points_at_or_below_first_limit() {
        let policy = RewardPolicy::default();

        assert_eq!(policy.compute_points(0.0), 0);
        assert_eq!(policy.compute_points(10.0), 0);
        assert_eq!(policy.compute_points(49.99), 0);
        assert_eq!(policy.compute_points(50.0), 0);
    }

    #[test]
    fn test_negative_amount_yields_zero() {
        let policy = RewardPolicy::default();

        assert_eq!(policy.compute_points(-25.0), 0);
    }

    #[test]
    fn test_single_rate_band() {
        let policy = RewardPolicy::default();

        assert_eq!(policy.compute_points(50.01), 0); // rounds down
        assert_eq!(policy.compute_points(51.0), 1);
        assert_eq!(policy.compute_points(75.0), 25);
        assert_eq!(policy.compute_points(100.0), 50);
    }

    #[test]
    fn test_double_rate_band() {
        let policy = RewardPolicy::default();

        assert_eq!(policy.compute_points(101.0), 52);
        assert_eq!(policy.compute_points(120.0), 90); // (120-100)*2 + 50
        assert_eq!(policy.compute_points(200.0), 250);
    }

    #[test]
    fn test_very_large_amount() {
        let policy = RewardPolicy::default();

        // (999999 - 100) * 2 + 50
        assert_eq!(policy.compute_points(999_999.0), 1_999_848);
        assert!(policy.compute_points(999_999.0) > 1_000_000);
    }

    #[test]
    fn test_half_up_rounding_on_final_value() {
        let policy = RewardPolicy::default();

        // 50.5 - 50 = 0.5 → rounds up to 1
        assert_eq!(policy.compute_points(50.5), 1);
        // (100.25 - 100)*2 + 50 = 50.5 → rounds up to 51
        assert_eq!(policy.compute_points(100.25), 51);
        // 60.4 - 50 = 10.4 → rounds down to 10
        assert_eq!(policy.compute_points(60.4), 10);
    }

    #[test]
    fn test_monotonic_in_amount() {
        let policy = RewardPolicy::default();

        let mut previous = 0;
        for cents in 0..=20_000 {
            let amount = cents as f64 / 100.0; // 0.00 .. 200.00
            let points = policy.compute_points(amount);
            assert!(
                points >= previous,
                "points decreased at amount {}: {} < {}",
                amount,
                points,
                previous
            );
            previous = points;
        }
    }
}
