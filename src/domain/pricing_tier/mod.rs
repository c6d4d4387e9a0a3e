//! Pricing tier aggregate
//!
//! Contains the PricingTier entity, the tier consistency engine, the
//! consistency report and the draft/patch rules used on writes.

pub mod consistency;
pub mod draft;
pub mod model;
pub mod report;
pub mod repository;

pub use consistency::{
    active_tiers, compute_new_tier_defaults, detect_gaps, detect_overlaps, has_final_tier,
    is_last_tier, is_tier_currently_active, is_valid_new_price,
};
pub use draft::{validate_tier_shape, TierDraft, TierPatch};
pub use model::{
    parse_tier_date, Gap, GapEnd, NewTierDefaults, Overlap, OverlapRange, PricingTier,
    ServiceCode, TierLabel,
};
pub use report::{analyze_tiers, TierConsistencyReport, TierWarning};
pub use repository::PricingTierRepository;
