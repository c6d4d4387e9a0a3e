//! Tier drafts and edit patches, plus the shape rules every stored tier obeys
//!
//! The consistency engine accepts ill-formed tiers; these rules keep them
//! from being stored in the first place.

use rust_decimal::Decimal;

use super::model::{parse_tier_date, PricingTier, ServiceCode};
use crate::shared::{DomainError, DomainResult};

/// A tier about to be appended to a service's ladder.
///
/// `tier_order` and `min_quantity` fall back to the ladder's
/// [`NewTierDefaults`](super::NewTierDefaults) when omitted.
#[derive(Debug, Clone, Default)]
pub struct TierDraft {
    pub tier_order: Option<i32>,
    pub min_quantity: Option<Decimal>,
    pub max_quantity: Option<Decimal>,
    pub unit_price: Decimal,
    pub effective_from: String,
    pub effective_until: Option<String>,
    pub active: Option<bool>,
    pub description: Option<String>,
}

impl TierDraft {
    pub fn into_tier(
        self,
        service_code: ServiceCode,
        tier_order: i32,
        min_quantity: Decimal,
    ) -> PricingTier {
        PricingTier {
            id: None,
            service_code,
            tier_order,
            min_quantity: Some(min_quantity),
            max_quantity: self.max_quantity,
            unit_price: self.unit_price,
            effective_from: Some(self.effective_from),
            effective_until: self.effective_until,
            active: Some(self.active.unwrap_or(true)),
            description: self.description,
        }
    }
}

/// Partial update of a stored tier. Absent fields keep their value.
///
/// `max_quantity` and `effective_until` are doubly optional so a patch can
/// clear them (`Some(None)`) as well as leave them alone (`None`).
#[derive(Debug, Clone, Default)]
pub struct TierPatch {
    pub tier_order: Option<i32>,
    pub min_quantity: Option<Decimal>,
    pub max_quantity: Option<Option<Decimal>>,
    pub unit_price: Option<Decimal>,
    pub effective_from: Option<String>,
    pub effective_until: Option<Option<String>>,
    pub active: Option<bool>,
    pub description: Option<String>,
}

impl TierPatch {
    pub fn apply(self, mut tier: PricingTier) -> PricingTier {
        if let Some(order) = self.tier_order {
            tier.tier_order = order;
        }
        if let Some(min) = self.min_quantity {
            tier.min_quantity = Some(min);
        }
        if let Some(max) = self.max_quantity {
            tier.max_quantity = max;
        }
        if let Some(price) = self.unit_price {
            tier.unit_price = price;
        }
        if let Some(from) = self.effective_from {
            tier.effective_from = Some(from);
        }
        if let Some(until) = self.effective_until {
            tier.effective_until = until;
        }
        if let Some(active) = self.active {
            tier.active = Some(active);
        }
        if let Some(description) = self.description {
            tier.description = Some(description);
        }
        tier
    }
}

/// Reject tiers the engine would have to treat as degenerate.
pub fn validate_tier_shape(tier: &PricingTier) -> DomainResult<()> {
    if tier.tier_order < 1 {
        return Err(DomainError::validation("tierOrder must be at least 1"));
    }
    // Leaves room for the next appended tier.
    if tier.tier_order == i32::MAX {
        return Err(DomainError::Validation(format!(
            "tierOrder must be below {}",
            i32::MAX
        )));
    }
    if tier.unit_price <= Decimal::ZERO {
        return Err(DomainError::validation("unitPrice must be positive"));
    }

    let min = tier.min_or_zero();
    if min < Decimal::ZERO {
        return Err(DomainError::validation("minQuantity must not be negative"));
    }
    if let Some(max) = tier.max_quantity {
        if max <= min {
            return Err(DomainError::Validation(format!(
                "maxQuantity ({}) must be greater than minQuantity ({})",
                max, min
            )));
        }
    }

    let from = tier
        .effective_from
        .as_deref()
        .ok_or_else(|| DomainError::validation("effectiveFrom is required"))?;
    let from = parse_tier_date(from)
        .ok_or_else(|| DomainError::Validation(format!("effectiveFrom '{}' is not a date", from)))?;

    if let Some(until) = tier.effective_until.as_deref() {
        let until = parse_tier_date(until).ok_or_else(|| {
            DomainError::Validation(format!("effectiveUntil '{}' is not a date", until))
        })?;
        if until < from {
            return Err(DomainError::validation(
                "effectiveUntil must not be before effectiveFrom",
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing_tier::consistency::tests::tier;

    fn assert_invalid(tier: &PricingTier, fragment: &str) {
        match validate_tier_shape(tier) {
            Err(DomainError::Validation(msg)) => {
                assert!(msg.contains(fragment), "unexpected message: {}", msg)
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn well_formed_tier_passes() {
        assert!(validate_tier_shape(&tier(1, Some(0), Some(50), 1000)).is_ok());
        assert!(validate_tier_shape(&tier(2, Some(51), None, 1500)).is_ok());
    }

    #[test]
    fn max_must_exceed_min() {
        assert_invalid(&tier(1, Some(50), Some(50), 1000), "maxQuantity");
        assert_invalid(&tier(1, Some(50), Some(10), 1000), "maxQuantity");
    }

    #[test]
    fn price_and_order_must_be_positive() {
        assert_invalid(&tier(1, Some(0), None, 0), "unitPrice");
        assert_invalid(&tier(0, Some(0), None, 100), "tierOrder");
        assert_invalid(&tier(i32::MAX, Some(0), None, 100), "tierOrder");
        assert!(validate_tier_shape(&tier(i32::MAX - 1, Some(0), None, 100)).is_ok());
    }

    #[test]
    fn negative_min_is_rejected() {
        assert_invalid(&tier(1, Some(-5), None, 100), "minQuantity");
    }

    #[test]
    fn dates_must_parse_and_be_ordered() {
        let mut t = tier(1, Some(0), None, 100);
        t.effective_from = None;
        assert_invalid(&t, "required");

        t.effective_from = Some("tomorrow".into());
        assert_invalid(&t, "effectiveFrom");

        t.effective_from = Some("2024-05-01".into());
        t.effective_until = Some("2024-04-30".into());
        assert_invalid(&t, "before");

        t.effective_until = Some("2024-05-01".into());
        assert!(validate_tier_shape(&t).is_ok());
    }

    #[test]
    fn patch_can_clear_optional_bounds() {
        let mut t = tier(1, Some(0), Some(50), 1000);
        t.effective_until = Some("2025-01-01".into());

        let patched = TierPatch {
            max_quantity: Some(None),
            effective_until: Some(None),
            unit_price: Some(Decimal::from(1200)),
            ..Default::default()
        }
        .apply(t);

        assert!(patched.is_unbounded());
        assert_eq!(patched.effective_until, None);
        assert_eq!(patched.unit_price, Decimal::from(1200));
        assert_eq!(patched.min_quantity, Some(Decimal::ZERO));
    }

    #[test]
    fn draft_defaults_to_active() {
        let draft = TierDraft {
            max_quantity: Some(Decimal::from(200)),
            unit_price: Decimal::from(1800),
            effective_from: "2024-01-01".into(),
            ..Default::default()
        };
        let t = draft.into_tier(ServiceCode::new("WATER"), 3, Decimal::from(101));
        assert_eq!(t.active, Some(true));
        assert_eq!(t.tier_order, 3);
        assert_eq!(t.min_quantity, Some(Decimal::from(101)));
    }
}
