//! In-memory storage implementation

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{
    DomainError, DomainResult, PricingTier, PricingTierRepository, ServiceCode, ServiceRequest,
    ServiceRequestRepository,
};

fn not_found(entity: &'static str, id: i32) -> DomainError {
    DomainError::NotFound {
        entity,
        field: "id",
        value: id.to_string(),
    }
}

/// In-memory pricing tier store
pub struct InMemoryPricingTierRepository {
    tiers: DashMap<i32, PricingTier>,
    counter: AtomicI32,
}

impl InMemoryPricingTierRepository {
    pub fn new() -> Self {
        Self {
            tiers: DashMap::new(),
            counter: AtomicI32::new(1),
        }
    }

    /// Preload a snapshot. Tiers keep their ids when they have one; the id
    /// counter continues after the highest.
    pub fn with_tiers(tiers: Vec<PricingTier>) -> Self {
        let repo = Self::new();
        let (with_id, without_id): (Vec<_>, Vec<_>) =
            tiers.into_iter().partition(|t| t.id.is_some());

        for tier in with_id {
            if let Some(id) = tier.id {
                repo.tiers.insert(id, tier);
            }
        }

        let mut next = 1;
        for mut tier in without_id {
            while repo.tiers.contains_key(&next) {
                next += 1;
            }
            tier.id = Some(next);
            repo.tiers.insert(next, tier);
        }
        let max_id = repo.tiers.iter().map(|e| *e.key()).max().unwrap_or(0);
        repo.counter.store(max_id.saturating_add(1), Ordering::SeqCst);
        repo
    }
}

impl Default for InMemoryPricingTierRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PricingTierRepository for InMemoryPricingTierRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<PricingTier>> {
        Ok(self.tiers.get(&id).map(|t| t.clone()))
    }

    async fn find_by_service(&self, service_code: &ServiceCode) -> DomainResult<Vec<PricingTier>> {
        let mut tiers: Vec<PricingTier> = self
            .tiers
            .iter()
            .filter(|t| &t.service_code == service_code)
            .map(|t| t.clone())
            .collect();
        tiers.sort_by_key(|t| t.id);
        Ok(tiers)
    }

    async fn save(&self, mut tier: PricingTier) -> DomainResult<PricingTier> {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        tier.id = Some(id);
        self.tiers.insert(id, tier.clone());
        Ok(tier)
    }

    async fn update(&self, tier: PricingTier) -> DomainResult<()> {
        let id = tier
            .id
            .ok_or_else(|| DomainError::validation("cannot update a tier without id"))?;
        match self.tiers.get_mut(&id) {
            Some(mut existing) => {
                *existing = tier;
                Ok(())
            }
            None => Err(not_found("PricingTier", id)),
        }
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        self.tiers
            .remove(&id)
            .ok_or_else(|| not_found("PricingTier", id))?;
        Ok(())
    }
}

/// In-memory service request store
pub struct InMemoryServiceRequestRepository {
    requests: DashMap<i32, ServiceRequest>,
    counter: AtomicI32,
}

impl InMemoryServiceRequestRepository {
    pub fn new() -> Self {
        Self {
            requests: DashMap::new(),
            counter: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryServiceRequestRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceRequestRepository for InMemoryServiceRequestRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<ServiceRequest>> {
        Ok(self.requests.get(&id).map(|r| r.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<ServiceRequest>> {
        Ok(self.requests.iter().map(|r| r.value().clone()).collect())
    }

    async fn save(&self, mut request: ServiceRequest) -> DomainResult<ServiceRequest> {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        request.id = id;
        self.requests.insert(id, request.clone());
        Ok(request)
    }

    async fn update(&self, request: ServiceRequest) -> DomainResult<()> {
        if !self.requests.contains_key(&request.id) {
            return Err(not_found("ServiceRequest", request.id));
        }
        self.requests.insert(request.id, request);
        Ok(())
    }
}
