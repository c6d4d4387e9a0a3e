//! Pricing tier service: ladder reads, consistency analysis and guarded writes

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::domain::pricing_tier::{
    active_tiers, analyze_tiers, compute_new_tier_defaults, is_tier_currently_active,
    is_valid_new_price, validate_tier_shape, NewTierDefaults, PricingTier, PricingTierRepository,
    ServiceCode, TierConsistencyReport, TierDraft, TierPatch,
};
use crate::domain::{DomainError, DomainResult};
use crate::shared::Clock;

/// Service for pricing tier operations
pub struct PricingTierService {
    repo: Arc<dyn PricingTierRepository>,
    clock: Arc<dyn Clock>,
    service_codes: Vec<ServiceCode>,
}

impl PricingTierService {
    pub fn new(
        repo: Arc<dyn PricingTierRepository>,
        clock: Arc<dyn Clock>,
        service_codes: Vec<ServiceCode>,
    ) -> Self {
        Self {
            repo,
            clock,
            service_codes,
        }
    }

    fn check_service(&self, code: &ServiceCode) -> DomainResult<()> {
        if self.service_codes.contains(code) {
            Ok(())
        } else {
            Err(DomainError::Validation(format!(
                "unknown service code '{}'",
                code
            )))
        }
    }

    /// Tiers of one service ordered by `tier_order`.
    pub async fn list(&self, code: &ServiceCode) -> DomainResult<Vec<PricingTier>> {
        self.check_service(code)?;
        let mut tiers = self.repo.find_by_service(code).await?;
        tiers.sort_by_key(|t| (t.tier_order, t.id));
        Ok(tiers)
    }

    pub async fn get(&self, id: i32) -> DomainResult<PricingTier> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "PricingTier",
                field: "id",
                value: id.to_string(),
            })
    }

    pub async fn analyze(&self, code: &ServiceCode) -> DomainResult<TierConsistencyReport> {
        let tiers = self.list(code).await?;
        let report = analyze_tiers(&tiers, self.clock.today());

        if !report.is_consistent() {
            metrics::counter!("pricing_tier_inconsistencies_total", "service" => code.to_string())
                .increment(1);
            warn!(
                service = %code,
                gaps = report.gaps.len(),
                overlaps = report.overlaps.len(),
                warnings = report.warnings.len(),
                "Pricing tier ladder is inconsistent"
            );
        }

        Ok(report)
    }

    pub async fn draft_defaults(&self, code: &ServiceCode) -> DomainResult<NewTierDefaults> {
        let tiers = self.list(code).await?;
        Ok(compute_new_tier_defaults(&tiers, self.clock.today()))
    }

    /// Append a tier to the service's ladder.
    ///
    /// Fails with [`DomainError::AppendBlocked`] while an unbounded tier is
    /// active, and rejects prices not strictly above the current top tier.
    pub async fn create(&self, code: &ServiceCode, draft: TierDraft) -> DomainResult<PricingTier> {
        let existing = self.list(code).await?;
        let today = self.clock.today();
        let defaults = compute_new_tier_defaults(&existing, today);

        if defaults.append_blocked() {
            let active = active_tiers(&existing, today);
            let blocking = active
                .iter()
                .filter(|t| t.is_unbounded())
                .map(|t| t.tier_order)
                .max()
                .or_else(|| {
                    active
                        .iter()
                        .max_by_key(|t| t.max_quantity)
                        .map(|t| t.tier_order)
                })
                .unwrap_or_default();
            return Err(DomainError::AppendBlocked {
                service_code: code.clone(),
                tier_order: blocking,
            });
        }

        if !is_valid_new_price(draft.unit_price, defaults.min_unit_price) {
            return Err(DomainError::Validation(format!(
                "unitPrice must be greater than {}",
                defaults.min_unit_price.unwrap_or_default()
            )));
        }

        // An explicit minimum may leave a gap but must not reach into the
        // current top tier.
        if let (Some(requested), Some(floor)) = (draft.min_quantity, defaults.min_quantity) {
            if requested < floor {
                return Err(DomainError::Validation(format!(
                    "minQuantity must be at least {}",
                    floor
                )));
            }
        }

        let tier_order = draft.tier_order.unwrap_or(defaults.next_tier_order);
        let min_quantity = draft
            .min_quantity
            .or(defaults.min_quantity)
            .unwrap_or(Decimal::ZERO);
        let tier = draft.into_tier(code.clone(), tier_order, min_quantity);

        validate_tier_shape(&tier)?;
        ensure_unique_order(&tier, &existing, today)?;

        let saved = self.repo.save(tier).await?;

        metrics::counter!("pricing_tier_mutations_total", "operation" => "create").increment(1);
        info!(
            service = %code,
            id = ?saved.id,
            tier_order = saved.tier_order,
            unit_price = %saved.unit_price,
            "Pricing tier created"
        );

        Ok(saved)
    }

    pub async fn update(&self, id: i32, patch: TierPatch) -> DomainResult<PricingTier> {
        let current = self.get(id).await?;
        let updated = patch.apply(current);
        validate_tier_shape(&updated)?;

        let siblings = self.repo.find_by_service(&updated.service_code).await?;
        ensure_unique_order(&updated, &siblings, self.clock.today())?;

        self.repo.update(updated.clone()).await?;

        metrics::counter!("pricing_tier_mutations_total", "operation" => "update").increment(1);
        info!(
            service = %updated.service_code,
            id,
            tier_order = updated.tier_order,
            "Pricing tier updated"
        );

        Ok(updated)
    }

    /// Delete a tier. A tier sharing the highest `max_quantity` with another
    /// bounded tier is only removed with `force`, since either could be the
    /// one meant to close the ladder.
    pub async fn delete(&self, id: i32, force: bool) -> DomainResult<()> {
        let tier = self.get(id).await?;
        let siblings = self.repo.find_by_service(&tier.service_code).await?;
        let report = analyze_tiers(&siblings, self.clock.today());

        if report.is_ambiguous_last(&tier.label()) && !force {
            return Err(DomainError::Conflict(format!(
                "tier {} shares the highest maxQuantity with another tier; retry with force",
                tier.tier_order
            )));
        }

        self.repo.delete(id).await?;

        metrics::counter!("pricing_tier_mutations_total", "operation" => "delete").increment(1);
        info!(service = %tier.service_code, id, force, "Pricing tier deleted");

        Ok(())
    }
}

/// Two tiers active on the same day may not share a `tier_order`.
fn ensure_unique_order(
    tier: &PricingTier,
    siblings: &[PricingTier],
    today: chrono::NaiveDate,
) -> DomainResult<()> {
    if !is_tier_currently_active(tier, today) {
        return Ok(());
    }

    let clash = siblings.iter().any(|other| {
        other.id != tier.id
            && other.tier_order == tier.tier_order
            && is_tier_currently_active(other, today)
    });

    if clash {
        return Err(DomainError::Conflict(format!(
            "tier order {} is already used by an active tier of {}",
            tier.tier_order, tier.service_code
        )));
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing_tier::consistency::tests::{tier, today};
    use crate::infrastructure::InMemoryPricingTierRepository;
    use crate::shared::FixedClock;

    fn service(tiers: Vec<PricingTier>) -> PricingTierService {
        PricingTierService::new(
            Arc::new(InMemoryPricingTierRepository::with_tiers(tiers)),
            Arc::new(FixedClock(today())),
            vec![ServiceCode::new("ELECTRIC"), ServiceCode::new("WATER")],
        )
    }

    fn electric() -> ServiceCode {
        ServiceCode::new("ELECTRIC")
    }

    fn draft(max: Option<i64>, price: i64) -> TierDraft {
        TierDraft {
            max_quantity: max.map(Decimal::from),
            unit_price: Decimal::from(price),
            effective_from: "2024-01-01".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_fills_order_and_min_from_defaults() {
        let svc = service(vec![
            tier(1, Some(0), Some(50), 1000),
            tier(2, Some(51), Some(100), 1500),
        ]);

        let created = svc.create(&electric(), draft(None, 2000)).await.unwrap();
        assert_eq!(created.tier_order, 3);
        assert_eq!(created.min_quantity, Some(Decimal::from(101)));
        assert!(created.id.is_some());

        let report = svc.analyze(&electric()).await.unwrap();
        assert!(report.is_consistent());
    }

    #[tokio::test]
    async fn first_tier_starts_at_zero() {
        let svc = service(vec![]);
        let created = svc.create(&electric(), draft(Some(50), 1)).await.unwrap();
        assert_eq!(created.tier_order, 1);
        assert_eq!(created.min_quantity, Some(Decimal::ZERO));
    }

    #[tokio::test]
    async fn create_is_blocked_after_unbounded_tier() {
        let svc = service(vec![tier(1, Some(0), None, 2000)]);
        let err = svc.create(&electric(), draft(None, 3000)).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::AppendBlocked { tier_order: 1, .. }
        ));
    }

    #[tokio::test]
    async fn create_requires_higher_price() {
        let svc = service(vec![tier(1, Some(0), Some(50), 1500)]);
        let err = svc.create(&electric(), draft(None, 1500)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        assert!(svc.create(&electric(), draft(None, 1501)).await.is_ok());
    }

    #[tokio::test]
    async fn explicit_min_cannot_reach_into_top_tier() {
        let svc = service(vec![tier(1, Some(0), Some(50), 1000)]);
        let mut d = draft(None, 2000);
        d.min_quantity = Some(Decimal::from(40));
        let err = svc.create(&electric(), d).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("51")));

        let mut d = draft(None, 2000);
        d.min_quantity = Some(Decimal::from(60));
        let created = svc.create(&electric(), d).await.unwrap();
        assert_eq!(created.min_quantity, Some(Decimal::from(60)));
        assert!(svc.list(&electric()).await.unwrap().len() == 2);
    }

    #[tokio::test]
    async fn ladder_ending_at_largest_quantity_blocks_append() {
        let mut top = tier(4, Some(0), None, 1000);
        top.max_quantity = Some(Decimal::MAX);
        let svc = service(vec![top]);
        let err = svc.create(&electric(), draft(None, 2000)).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::AppendBlocked { tier_order: 4, .. }
        ));
    }

    #[tokio::test]
    async fn duplicate_active_order_is_a_conflict() {
        let svc = service(vec![tier(1, Some(0), Some(50), 1000)]);
        let mut d = draft(None, 2000);
        d.tier_order = Some(1);
        let err = svc.create(&electric(), d).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn unknown_service_code_is_rejected() {
        let svc = service(vec![]);
        let err = svc.list(&ServiceCode::new("GAS")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn update_revalidates_shape() {
        let svc = service(vec![tier(1, Some(0), Some(50), 1000)]);
        let patch = TierPatch {
            max_quantity: Some(Some(Decimal::ZERO)),
            ..Default::default()
        };
        assert!(matches!(
            svc.update(1, patch).await,
            Err(DomainError::Validation(_))
        ));

        let patch = TierPatch {
            max_quantity: Some(None),
            ..Default::default()
        };
        let updated = svc.update(1, patch).await.unwrap();
        assert!(updated.is_unbounded());
        assert!(svc.get(1).await.unwrap().is_unbounded());
    }

    #[tokio::test]
    async fn update_of_missing_tier_is_not_found() {
        let svc = service(vec![]);
        assert!(matches!(
            svc.update(7, TierPatch::default()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn ambiguous_last_tier_needs_force_to_delete() {
        let svc = service(vec![
            tier(1, Some(0), Some(100), 1000),
            tier(2, Some(40), Some(100), 1500),
        ]);

        assert!(matches!(
            svc.delete(2, false).await,
            Err(DomainError::Conflict(_))
        ));
        svc.delete(2, true).await.unwrap();
        assert_eq!(svc.list(&electric()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn analysis_reports_gaps_and_defaults() {
        let svc = service(vec![
            tier(1, Some(10), Some(50), 1000),
            tier(2, Some(80), Some(100), 1500),
        ]);
        let report = svc.analyze(&electric()).await.unwrap();
        assert_eq!(report.gaps.len(), 3);
        assert!(!report.has_final_tier);

        let defaults = svc.draft_defaults(&electric()).await.unwrap();
        assert_eq!(defaults.min_quantity, Some(Decimal::from(101)));
        assert_eq!(defaults.next_tier_order, 3);
    }
}
