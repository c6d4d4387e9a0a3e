//! Pricing tier repository interface

use async_trait::async_trait;

use super::model::{PricingTier, ServiceCode};
use crate::domain::DomainResult;

#[async_trait]
pub trait PricingTierRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<PricingTier>>;
    async fn find_by_service(&self, service_code: &ServiceCode) -> DomainResult<Vec<PricingTier>>;
    /// Assigns an id and returns the stored tier.
    async fn save(&self, tier: PricingTier) -> DomainResult<PricingTier>;
    async fn update(&self, tier: PricingTier) -> DomainResult<()>;
    async fn delete(&self, id: i32) -> DomainResult<()>;
}
