//! # Tier Pricing
//!
//! Turns a duration and a [`RateType`] into a cost. The same function
//! prices the running cost of a Free session and the prepaid block of a
//! Fixed session.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cost(duration, rate)                                                   │
//! │                                                                         │
//! │  no rate / duration ≤ 0 ──────────────────────────────► $0              │
//! │                                                                         │
//! │  duration ≤ 60 min ──► scan(duration)                                   │
//! │                                                                         │
//! │  duration > 60 min ──► anchor tier (to == 60)?                          │
//! │        ├── yes: hours × anchor.price + scan(remainder)                  │
//! │        │        (remainder == 0 adds nothing)                           │
//! │        └── no:  scan(duration)                                          │
//! │                                                                         │
//! │  scan(d): tiers ascending by `from`; price of the LAST tier whose       │
//! │           from ≤ d, or $0 when d is below the first tier                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Worked example, tiers `[1–15: $5, 16–30: $10, 31–60: $15]`:
//!
//! | duration | result                         |
//! |----------|--------------------------------|
//! | 10 min   | $5                             |
//! | 45 min   | $15                            |
//! | 90 min   | 1 × $15 + scan(30) = $25       |
//! | 120 min  | 2 × $15 = $30                  |
//!
//! Durations are compared in whole seconds, so 15m30s still falls in the
//! first tier and 16m00s moves to the second.

use chrono::TimeDelta;

use crate::money::Money;
use crate::types::{RateTier, RateType};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;

/// Cost of a session that has lasted (or will last) `duration`.
///
/// Pure: no clock reads, no side effects. A missing rate or a duration
/// below every tier costs nothing.
pub fn cost(duration: TimeDelta, rate: Option<&RateType>) -> Money {
    cost_for_seconds(duration.num_seconds(), rate)
}

/// Cost of a duration given in whole minutes (prepaid blocks).
///
/// ## Example
/// ```rust
/// use lanhouse_core::pricing::cost_for_minutes;
/// use lanhouse_core::types::{RateTier, RateType};
///
/// let rate = RateType::new("console", "Console", vec![RateTier::new(1, 60, 2000)]);
/// assert_eq!(cost_for_minutes(60, Some(&rate)).cents(), 2000);
/// assert_eq!(cost_for_minutes(90, Some(&rate)).cents(), 4000);
/// ```
pub fn cost_for_minutes(minutes: i64, rate: Option<&RateType>) -> Money {
    cost_for_seconds(minutes.saturating_mul(SECONDS_PER_MINUTE), rate)
}

fn cost_for_seconds(seconds: i64, rate: Option<&RateType>) -> Money {
    let Some(rate) = rate else {
        return Money::zero();
    };
    if seconds <= 0 {
        return Money::zero();
    }

    let tiers = rate.sorted_tiers();

    if seconds <= SECONDS_PER_HOUR {
        return scan(&tiers, seconds);
    }

    match rate.hourly_anchor() {
        Some(anchor) => {
            let hours = seconds / SECONDS_PER_HOUR;
            let remainder = seconds % SECONDS_PER_HOUR;
            let whole_hours = anchor.price() * hours;
            if remainder == 0 {
                whole_hours
            } else {
                whole_hours + scan(&tiers, remainder)
            }
        }
        // No anchor configured: price the whole span with the flat scan.
        None => scan(&tiers, seconds),
    }
}

/// Price of the last tier (ascending) whose lower bound has been reached.
fn scan(sorted: &[RateTier], seconds: i64) -> Money {
    sorted
        .iter()
        .take_while(|tier| tier.from_minutes.saturating_mul(SECONDS_PER_MINUTE) <= seconds)
        .last()
        .map(RateTier::price)
        .unwrap_or_default()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stepped_rate() -> RateType {
        RateType::new(
            "pc",
            "PC",
            vec![
                RateTier::new(1, 15, 500),
                RateTier::new(16, 30, 1000),
                RateTier::new(31, 60, 1500),
            ],
        )
    }

    fn anchor_only_rate() -> RateType {
        RateType::new("console", "Console", vec![RateTier::new(1, 60, 2000)])
    }

    #[test]
    fn test_stepped_tiers() {
        let rate = stepped_rate();
        assert_eq!(cost_for_minutes(10, Some(&rate)).cents(), 500);
        assert_eq!(cost_for_minutes(45, Some(&rate)).cents(), 1500);
        assert_eq!(cost_for_minutes(0, Some(&rate)).cents(), 0);
    }

    #[test]
    fn test_tier_boundaries() {
        let rate = stepped_rate();
        assert_eq!(cost_for_minutes(1, Some(&rate)).cents(), 500);
        assert_eq!(cost_for_minutes(15, Some(&rate)).cents(), 500);
        assert_eq!(cost_for_minutes(16, Some(&rate)).cents(), 1000);
        assert_eq!(cost_for_minutes(60, Some(&rate)).cents(), 1500);
    }

    #[test]
    fn test_partial_minutes_stay_in_lower_tier() {
        let rate = stepped_rate();
        let d = TimeDelta::seconds(15 * 60 + 30);
        assert_eq!(cost(d, Some(&rate)).cents(), 500);
        // Under one minute is below the first tier
        assert_eq!(cost(TimeDelta::seconds(59), Some(&rate)).cents(), 0);
    }

    #[test]
    fn test_anchor_multiplies_whole_hours() {
        let rate = anchor_only_rate();
        // 90 = 1 × $20 + cost(30)
        let expected = Money::from_cents(2000) + cost_for_minutes(30, Some(&rate));
        assert_eq!(cost_for_minutes(90, Some(&rate)), expected);
        assert_eq!(cost_for_minutes(120, Some(&rate)).cents(), 4000);
    }

    #[test]
    fn test_long_session_with_stepped_remainder() {
        let rate = stepped_rate();
        assert_eq!(cost_for_minutes(90, Some(&rate)).cents(), 2500);
        assert_eq!(cost_for_minutes(120, Some(&rate)).cents(), 3000);
        assert_eq!(cost_for_minutes(130, Some(&rate)).cents(), 3500);
    }

    #[test]
    fn test_no_anchor_falls_back_to_flat_scan() {
        let rate = RateType::new(
            "odd",
            "Odd",
            vec![RateTier::new(1, 30, 1000), RateTier::new(31, 45, 1800)],
        );
        assert_eq!(cost_for_minutes(200, Some(&rate)).cents(), 1800);
    }

    #[test]
    fn test_missing_rate_costs_nothing() {
        assert_eq!(cost_for_minutes(45, None).cents(), 0);
        assert_eq!(cost(TimeDelta::seconds(-30), Some(&stepped_rate())).cents(), 0);
    }

    #[test]
    fn test_unsorted_tiers_give_same_result() {
        let sorted = stepped_rate();
        let mut shuffled = stepped_rate();
        shuffled.tiers.reverse();
        for minutes in [0, 5, 16, 31, 61, 95, 180] {
            assert_eq!(
                cost_for_minutes(minutes, Some(&sorted)),
                cost_for_minutes(minutes, Some(&shuffled))
            );
        }
    }
}
