//! Pricing tier endpoints: ladder CRUD, consistency analysis and new-tier prefill

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::PricingTierState;
