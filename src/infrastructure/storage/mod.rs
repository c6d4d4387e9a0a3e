//! Storage implementations

mod memory;

pub use memory::{InMemoryPricingTierRepository, InMemoryServiceRequestRepository};
