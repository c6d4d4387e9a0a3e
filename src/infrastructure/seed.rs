//! Startup snapshot of pricing tiers
//!
//! The seed file is the same JSON array of tiers the list endpoint returns,
//! so an export of one instance can prime another.

use std::path::Path;

use tracing::info;

use crate::domain::PricingTier;
use crate::shared::InfraError;

pub fn load_seed_tiers(path: &Path) -> Result<Vec<PricingTier>, InfraError> {
    let raw = std::fs::read_to_string(path)?;
    let tiers: Vec<PricingTier> = serde_json::from_str(&raw)?;
    info!(path = %path.display(), count = tiers.len(), "Loaded seed pricing tiers");
    Ok(tiers)
}
