//! Price derivation for listings.

use serde::Serialize;

use crate::listing::{Discount, DiscountKind, RoomType};

/// Lowest room price among rooms with a positive price, or 0 when none
/// qualify.
pub fn derive_min_price(room_types: &[RoomType]) -> i64 {
    room_types
        .iter()
        .map(|r| r.price)
        .filter(|&p| p > 0)
        .min()
        .unwrap_or(0)
}

/// Result of picking the best discount for a base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountOutcome {
    pub base_price: i64,
    pub final_price: i64,
    /// The discount that produced `final_price`, if any improved on the base.
    pub applied: Option<Discount>,
}

/// Price after a single discount. May be negative for a percentage above
/// 100; `None` when the arithmetic leaves the `i64` range.
fn discounted_price(base: i64, discount: &Discount) -> Option<i64> {
    match discount.kind {
        DiscountKind::Percentage => {
            // Rounded to the nearest integer, halves away from zero.
            let scaled = base.checked_mul(100_i64.checked_sub(discount.value)?)?;
            let rounded = if scaled >= 0 {
                scaled.checked_add(50)?
            } else {
                scaled.checked_sub(50)?
            };
            Some(rounded / 100)
        }
        DiscountKind::Fixed => Some(base.checked_sub(discount.value)?.max(0)),
    }
}

/// Choose the discount yielding the lowest non-negative price.
///
/// When no discount lowers the price below `base_price`, none is applied.
/// Ties keep the earlier discount.
pub fn apply_best_discount(base_price: i64, discounts: &[Discount]) -> DiscountOutcome {
    let mut best: Option<(i64, &Discount)> = None;
    for discount in discounts {
        let Some(candidate) = discounted_price(base_price, discount) else {
            continue;
        };
        if candidate < 0 || candidate >= base_price {
            continue;
        }
        if best.map_or(true, |(price, _)| candidate < price) {
            best = Some((candidate, discount));
        }
    }

    match best {
        Some((final_price, discount)) => DiscountOutcome {
            base_price,
            final_price,
            applied: Some(discount.clone()),
        },
        None => DiscountOutcome {
            base_price,
            final_price: base_price,
            applied: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(price: i64) -> RoomType {
        RoomType {
            name: format!("room-{price}"),
            price,
            ..Default::default()
        }
    }

    fn pct(value: i64) -> Discount {
        Discount {
            kind: DiscountKind::Percentage,
            value,
            name: None,
        }
    }

    fn fixed(value: i64) -> Discount {
        Discount {
            kind: DiscountKind::Fixed,
            value,
            name: None,
        }
    }

    #[test]
    fn min_price_excludes_zero_prices() {
        assert_eq!(derive_min_price(&[room(100), room(80), room(0)]), 80);
    }

    #[test]
    fn min_price_is_zero_without_priced_rooms() {
        assert_eq!(derive_min_price(&[]), 0);
        assert_eq!(derive_min_price(&[room(0), room(-5)]), 0);
    }

    #[test]
    fn percentage_beats_fixed_when_lower() {
        let outcome = apply_best_discount(1000, &[pct(20), fixed(150)]);
        assert_eq!(outcome.final_price, 800);
        assert_eq!(outcome.applied, Some(pct(20)));
    }

    #[test]
    fn fixed_wins_when_lower() {
        let outcome = apply_best_discount(1000, &[pct(10), fixed(150)]);
        assert_eq!(outcome.final_price, 850);
        assert_eq!(outcome.applied, Some(fixed(150)));
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        // 333 * 0.85 = 283.05
        assert_eq!(apply_best_discount(333, &[pct(15)]).final_price, 283);
        // 5 * 0.9 = 4.5
        assert_eq!(apply_best_discount(5, &[pct(10)]).final_price, 5);
        assert_eq!(apply_best_discount(5, &[pct(10)]).applied, None);
        // 15 * 0.9 = 13.5
        assert_eq!(apply_best_discount(15, &[pct(10)]).final_price, 14);
    }

    #[test]
    fn fixed_discount_floors_at_zero() {
        let outcome = apply_best_discount(100, &[fixed(250)]);
        assert_eq!(outcome.final_price, 0);
        assert!(outcome.applied.is_some());
    }

    #[test]
    fn negative_percentage_result_is_skipped() {
        let outcome = apply_best_discount(100, &[pct(150), pct(10)]);
        assert_eq!(outcome.final_price, 90);
        assert_eq!(outcome.applied, Some(pct(10)));
    }

    #[test]
    fn no_improvement_reports_no_discount() {
        let outcome = apply_best_discount(1000, &[pct(0), fixed(0)]);
        assert_eq!(outcome.final_price, 1000);
        assert!(outcome.applied.is_none());
        assert!(apply_best_discount(1000, &[]).applied.is_none());
    }

    #[test]
    fn overflowing_discounts_are_skipped() {
        let outcome = apply_best_discount(1000, &[pct(-i64::MAX / 10), fixed(i64::MIN), pct(10)]);
        assert_eq!(outcome.final_price, 900);
        assert_eq!(outcome.applied, Some(pct(10)));

        let outcome = apply_best_discount(i64::MAX, &[pct(1)]);
        assert_eq!(outcome.final_price, i64::MAX);
        assert!(outcome.applied.is_none());
    }

    #[test]
    fn ties_keep_first_discount() {
        let first = Discount {
            name: Some("early bird".into()),
            ..pct(10)
        };
        let outcome = apply_best_discount(1000, &[first.clone(), fixed(100)]);
        assert_eq!(outcome.final_price, 900);
        assert_eq!(outcome.applied, Some(first));
    }
}
