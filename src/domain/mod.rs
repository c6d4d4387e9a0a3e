//! Domain layer: entities, pure rules and repository interfaces

pub mod pricing_tier;
pub mod service_request;

pub use pricing_tier::{
    NewTierDefaults, PricingTier, PricingTierRepository, ServiceCode, TierConsistencyReport,
    TierDraft, TierPatch,
};
pub use service_request::{RequestStatus, ServiceRequest, ServiceRequestRepository};

// Re-export DomainError from shared for convenience
pub use crate::shared::types::errors::{DomainError, DomainResult};
