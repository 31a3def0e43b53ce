//! Property-based tests for pricing, loyalty and settlement.
//!
//! These check invariants that must hold for any rate table, any sequence
//! of point movements and any subtotal.

use chrono::TimeDelta;
use lanhouse_core::finalize::settle;
use lanhouse_core::loyalty::{ClientBook, LoyaltyLedger};
use lanhouse_core::money::Money;
use lanhouse_core::pricing::{cost, cost_for_minutes};
use lanhouse_core::types::{
    Client, CommissionPolicy, CommissionRate, PaymentMethod, RateTier, RateType,
};
use proptest::prelude::*;

// =============================================================================
// Arbitrary Strategies
// =============================================================================

/// Three stepped tiers ending on the hourly anchor, prices non-decreasing.
fn arb_stepped_rate() -> impl Strategy<Value = RateType> {
    (0i64..=5_000, 0i64..=5_000, 0i64..=5_000).prop_map(|(a, b, c)| {
        let first = a;
        let second = first + b;
        let third = second + c;
        RateType::new(
            "pc",
            "PC",
            vec![
                RateTier::new(1, 15, first),
                RateTier::new(16, 30, second),
                RateTier::new(31, 60, third),
            ],
        )
    })
}

fn arb_method() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::Cash),
        Just(PaymentMethod::Card),
        Just(PaymentMethod::MercadoPago),
        Just(PaymentMethod::Transfer),
    ]
}

fn arb_policy() -> impl Strategy<Value = CommissionPolicy> {
    prop_oneof![Just(CommissionPolicy::Charge), Just(CommissionPolicy::Absorb)]
}

/// A credit (positive) or debit (negative) of up to 50 points.
fn arb_movement() -> impl Strategy<Value = i64> {
    prop_oneof![(1i64..=50), (-50i64..=-1)]
}

// =============================================================================
// Pricing
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Tier order in the table never changes the price.
    #[test]
    fn pricing_ignores_tier_order(
        rate in arb_stepped_rate(),
        minutes in 0i64..=600,
        rotate in 0usize..3,
    ) {
        let mut shuffled = rate.clone();
        shuffled.tiers.rotate_left(rotate);
        shuffled.tiers.reverse();

        prop_assert_eq!(
            cost_for_minutes(minutes, Some(&rate)),
            cost_for_minutes(minutes, Some(&shuffled))
        );
    }

    /// The same inputs always price the same.
    #[test]
    fn pricing_is_deterministic(rate in arb_stepped_rate(), secs in 0i64..=86_400) {
        let d = TimeDelta::seconds(secs);
        prop_assert_eq!(cost(d, Some(&rate)), cost(d, Some(&rate)));
    }

    /// A Free session's running cost never goes down as time passes.
    #[test]
    fn free_cost_never_decreases(
        rate in arb_stepped_rate(),
        start in 0i64..=20_000,
        step in 1i64..=3_600,
    ) {
        let earlier = cost(TimeDelta::seconds(start), Some(&rate));
        let later = cost(TimeDelta::seconds(start + step), Some(&rate));
        prop_assert!(later >= earlier, "{} then {}", earlier, later);
    }

    /// Whole hours cost exactly that many anchor prices.
    #[test]
    fn whole_hours_bill_the_anchor(rate in arb_stepped_rate(), hours in 1i64..=24) {
        let anchor = rate.hourly_anchor().map(|t| t.price()).unwrap_or_default();
        prop_assert_eq!(cost_for_minutes(hours * 60, Some(&rate)), anchor * hours);
    }
}

// =============================================================================
// Loyalty
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// No sequence of credits and debits drives a balance below zero, and
    /// rejected debits change nothing.
    #[test]
    fn balance_never_negative(
        opening in 0i64..=100,
        movements in prop::collection::vec(arb_movement(), 0..30),
    ) {
        let mut book = ClientBook::from_clients([Client::new("c1", "Ana", opening)]);
        let mut expected = opening;

        for m in movements {
            if m > 0 {
                book.credit("c1", m).unwrap();
                expected += m;
            } else {
                match book.debit("c1", -m) {
                    Ok(balance) => {
                        expected += m;
                        prop_assert_eq!(balance, expected);
                    }
                    Err(_) => prop_assert!(expected < -m),
                }
            }

            let balance = book.client("c1").map(|c| c.points).unwrap_or(-1);
            prop_assert!(balance >= 0);
            prop_assert_eq!(balance, expected);
        }
    }
}

// =============================================================================
// Settlement
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// The gap between what the customer pays and what the venue keeps is
    /// the commission for card-type methods and zero otherwise.
    #[test]
    fn settlement_gap_is_the_commission(
        cents in 0i64..=10_000_000,
        method in arb_method(),
        policy in arb_policy(),
        bps in 0u32..=1_000,
    ) {
        let subtotal = Money::from_cents(cents);
        let s = settle(subtotal, method, policy, CommissionRate::from_bps(bps));

        let gap = s.total - s.net_received;
        if method.carries_commission() {
            prop_assert_eq!(gap, s.commission);
            prop_assert_eq!(s.commission, subtotal.apply_rate(CommissionRate::from_bps(bps)));
        } else {
            prop_assert!(gap.is_zero());
            prop_assert!(s.commission.is_zero());
        }

        match policy {
            CommissionPolicy::Charge => prop_assert_eq!(s.net_received, subtotal),
            CommissionPolicy::Absorb => prop_assert_eq!(s.total, subtotal),
        }
    }
}
