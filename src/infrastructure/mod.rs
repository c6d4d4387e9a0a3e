//! Infrastructure layer - external concerns

pub mod seed;
pub mod storage;

pub use seed::load_seed_tiers;
pub use storage::{InMemoryPricingTierRepository, InMemoryServiceRequestRepository};
