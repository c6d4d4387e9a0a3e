//! Tier consistency engine
//!
//! Pure functions over a snapshot of one service's pricing tiers. Every
//! function takes the reference date explicitly and never reads a clock,
//! never panics, and keeps no state between calls.
//!
//! Bands are inclusive on both ends and treated as integer-like ranges:
//! `max = 50` followed by `min = 51` touch, and two bands sharing a single
//! boundary point do not overlap.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::model::{
    parse_tier_date, Gap, GapEnd, NewTierDefaults, Overlap, OverlapRange, PricingTier,
};

/// Whether `tier` is in effect on `today`.
///
/// Requires a parseable `effective_from` on or before `today`, an
/// `effective_until` (when present) that parses and falls on or after
/// `today`, and an `active` flag that is not explicitly `false`. Any
/// unparseable date fails closed.
pub fn is_tier_currently_active(tier: &PricingTier, today: NaiveDate) -> bool {
    if tier.active == Some(false) {
        return false;
    }

    let Some(from) = tier.effective_from.as_deref().and_then(parse_tier_date) else {
        return false;
    };
    if from > today {
        return false;
    }

    match tier.effective_until.as_deref() {
        None => true,
        Some(raw) => parse_tier_date(raw).is_some_and(|until| until >= today),
    }
}

/// The subset of `tiers` active on `today`, in input order.
pub fn active_tiers(tiers: &[PricingTier], today: NaiveDate) -> Vec<&PricingTier> {
    tiers
        .iter()
        .filter(|t| is_tier_currently_active(t, today))
        .collect()
}

/// Uncovered quantity bands among the active tiers.
///
/// Order: internal gaps by ascending `min_quantity`, then the leading gap
/// from 0, then the missing-final-tier gap ending at [`GapEnd::Infinity`].
pub fn detect_gaps(tiers: &[PricingTier], today: NaiveDate) -> Vec<Gap> {
    let mut active = active_tiers(tiers, today);
    if active.is_empty() {
        return Vec::new();
    }
    active.sort_by_key(|t| t.min_or_zero());

    let mut gaps: Vec<Gap> = active
        .windows(2)
        .filter_map(|pair| {
            let (current, next) = (pair[0], pair[1]);
            let current_max = current.max_quantity?;
            let next_min = next.min_or_zero();
            // No quantity lies above Decimal::MAX, so an overflow means no gap.
            let first_uncovered = current_max.checked_add(Decimal::ONE)?;
            (first_uncovered < next_min).then_some(Gap {
                from: current_max,
                to: GapEnd::Finite(next_min),
            })
        })
        .collect();

    let first_min = active[0].min_or_zero();
    if first_min > Decimal::ZERO {
        gaps.push(Gap {
            from: Decimal::ZERO,
            to: GapEnd::Finite(first_min),
        });
    }

    if !active.iter().any(|t| t.is_unbounded()) {
        if let Some(max_max) = max_finite_max(&active) {
            gaps.push(Gap {
                from: max_max,
                to: GapEnd::Infinity,
            });
        }
    }

    gaps
}

/// Pairs of active tiers whose bands intersect in more than one point.
///
/// Pairs are visited in input order (`i < j`), one entry per unordered pair.
pub fn detect_overlaps(tiers: &[PricingTier], today: NaiveDate) -> Vec<Overlap> {
    let active = active_tiers(tiers, today);
    let mut overlaps = Vec::new();

    for (i, t1) in active.iter().enumerate() {
        for t2 in &active[i + 1..] {
            if let Some(range) = band_intersection(t1, t2) {
                overlaps.push(Overlap {
                    tier1: t1.label(),
                    tier2: t2.label(),
                    overlap: range,
                });
            }
        }
    }

    overlaps
}

fn band_intersection(t1: &PricingTier, t2: &PricingTier) -> Option<OverlapRange> {
    let (min1, min2) = (t1.min_or_zero(), t2.min_or_zero());
    let from = min1.max(min2);

    let to = match (t1.max_quantity, t2.max_quantity) {
        (None, None) => None,
        (None, Some(max2)) => {
            if min1 > max2 {
                return None;
            }
            Some(max2)
        }
        (Some(max1), None) => {
            if min2 > max1 {
                return None;
            }
            Some(max1)
        }
        (Some(max1), Some(max2)) => {
            if min1 > max2 || min2 > max1 {
                return None;
            }
            Some(max1.min(max2))
        }
    };

    match to {
        Some(to) if from >= to => None,
        _ => Some(OverlapRange { from, to }),
    }
}

/// Whether any active tier is unbounded.
pub fn has_final_tier(tiers: &[PricingTier], today: NaiveDate) -> bool {
    tiers
        .iter()
        .any(|t| t.is_unbounded() && is_tier_currently_active(t, today))
}

/// Whether `tier` closes the ladder.
///
/// An unbounded tier is always last. A bounded tier is last when no active
/// tier is unbounded and its `max_quantity` equals the highest finite
/// maximum among active tiers; every tier sharing that maximum counts.
pub fn is_last_tier(tier: &PricingTier, tiers: &[PricingTier], today: NaiveDate) -> bool {
    let Some(own_max) = tier.max_quantity else {
        return true;
    };

    let active = active_tiers(tiers, today);
    if active.iter().any(|t| t.is_unbounded()) {
        return false;
    }

    max_finite_max(&active) == Some(own_max)
}

/// Defaults for a tier appended to the current ladder.
///
/// `next_tier_order` looks at every tier, active or not. The quantity and
/// price floor come from the active tiers: after an unbounded tier (the one
/// with the highest `tier_order` when several exist) nothing can be
/// appended, so `min_quantity` is `None`. The same holds when the top tier
/// ends at `Decimal::MAX`. `next_tier_order` saturates at `i32::MAX`.
pub fn compute_new_tier_defaults(tiers: &[PricingTier], today: NaiveDate) -> NewTierDefaults {
    let next_tier_order = tiers
        .iter()
        .map(|t| t.tier_order)
        .max()
        .unwrap_or(0)
        .saturating_add(1);
    let active = active_tiers(tiers, today);

    if active.is_empty() {
        return NewTierDefaults {
            next_tier_order,
            min_quantity: Some(Decimal::ZERO),
            min_unit_price: None,
        };
    }

    if let Some(final_tier) = active
        .iter()
        .filter(|t| t.is_unbounded())
        .max_by_key(|t| t.tier_order)
    {
        return NewTierDefaults {
            next_tier_order,
            min_quantity: None,
            min_unit_price: Some(final_tier.unit_price),
        };
    }

    let top = active
        .iter()
        .filter_map(|t| t.max_quantity.map(|max| (max, *t)))
        .max_by_key(|(max, _)| *max);

    match top {
        Some((max, tier)) => NewTierDefaults {
            next_tier_order,
            min_quantity: max.checked_add(Decimal::ONE),
            min_unit_price: Some(tier.unit_price),
        },
        None => NewTierDefaults {
            next_tier_order,
            min_quantity: Some(Decimal::ZERO),
            min_unit_price: None,
        },
    }
}

/// A new tier must be priced strictly above the current top tier.
pub fn is_valid_new_price(candidate: Decimal, min_unit_price: Option<Decimal>) -> bool {
    match min_unit_price {
        Some(floor) => candidate > floor,
        None => true,
    }
}

pub(crate) fn max_finite_max(active: &[&PricingTier]) -> Option<Decimal> {
    active.iter().filter_map(|t| t.max_quantity).max()
}

// ── Tests ──────────────────────────────────────────────────────
