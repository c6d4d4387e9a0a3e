//! Pricing tier DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::pricing_tier::{
    Gap, GapEnd, NewTierDefaults, Overlap, PricingTier, TierConsistencyReport, TierDraft,
    TierLabel, TierPatch, TierWarning,
};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// A priced quantity band
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingTierResponse {
    pub id: Option<i32>,
    pub service_code: String,
    pub tier_order: i32,
    #[schema(value_type = Option<f64>)]
    pub min_quantity: Option<Decimal>,
    /// `null` for the unbounded final tier
    #[schema(value_type = Option<f64>)]
    pub max_quantity: Option<Decimal>,
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    pub effective_from: Option<String>,
    pub effective_until: Option<String>,
    pub active: Option<bool>,
    pub description: Option<String>,
}

impl From<PricingTier> for PricingTierResponse {
    fn from(t: PricingTier) -> Self {
        Self {
            id: t.id,
            service_code: t.service_code.to_string(),
            tier_order: t.tier_order,
            min_quantity: t.min_quantity,
            max_quantity: t.max_quantity,
            unit_price: t.unit_price,
            effective_from: t.effective_from,
            effective_until: t.effective_until,
            active: t.active,
            description: t.description,
        }
    }
}

/// New tier appended to a service's ladder. `tierOrder` and `minQuantity`
/// default to the next free order and the end of the current top tier.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePricingTierRequest {
    #[validate(range(min = 1, message = "tierOrder must be at least 1"))]
    pub tier_order: Option<i32>,
    #[schema(value_type = Option<f64>)]
    pub min_quantity: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub max_quantity: Option<Decimal>,
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    #[validate(length(min = 1, message = "effectiveFrom is required"))]
    pub effective_from: String,
    pub effective_until: Option<String>,
    pub active: Option<bool>,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

impl From<CreatePricingTierRequest> for TierDraft {
    fn from(req: CreatePricingTierRequest) -> Self {
        Self {
            tier_order: req.tier_order,
            min_quantity: req.min_quantity,
            max_quantity: req.max_quantity,
            unit_price: req.unit_price,
            effective_from: req.effective_from,
            effective_until: req.effective_until,
            active: req.active,
            description: req.description,
        }
    }
}

/// Partial update. Send `"maxQuantity": null` to make a tier unbounded and
/// `"effectiveUntil": null` to drop its end date.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePricingTierRequest {
    #[validate(range(min = 1, message = "tierOrder must be at least 1"))]
    pub tier_order: Option<i32>,
    #[schema(value_type = Option<f64>)]
    pub min_quantity: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub max_quantity: Option<Option<Decimal>>,
    #[schema(value_type = Option<f64>)]
    pub unit_price: Option<Decimal>,
    pub effective_from: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub effective_until: Option<Option<String>>,
    pub active: Option<bool>,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

impl From<UpdatePricingTierRequest> for TierPatch {
    fn from(req: UpdatePricingTierRequest) -> Self {
        Self {
            tier_order: req.tier_order,
            min_quantity: req.min_quantity,
            max_quantity: req.max_quantity,
            unit_price: req.unit_price,
            effective_from: req.effective_from,
            effective_until: req.effective_until,
            active: req.active,
            description: req.description,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteTierParams {
    /// Delete even when the tier is one of several ambiguous last tiers
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierLabelDto {
    pub id: Option<i32>,
    pub tier_order: i32,
}

impl From<TierLabel> for TierLabelDto {
    fn from(label: TierLabel) -> Self {
        Self {
            id: label.id,
            tier_order: label.tier_order,
        }
    }
}

fn labels(tiers: Vec<TierLabel>) -> Vec<TierLabelDto> {
    tiers.into_iter().map(Into::into).collect()
}

/// Uncovered quantity range
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GapDto {
    #[schema(value_type = f64)]
    pub from: Decimal,
    /// A number, or `"Infinity"` when the ladder has no final tier
    #[schema(value_type = Object)]
    pub to: GapEnd,
    pub missing_final_tier: bool,
}

impl From<Gap> for GapDto {
    fn from(gap: Gap) -> Self {
        Self {
            missing_final_tier: gap.is_missing_final_tier(),
            from: gap.from,
            to: gap.to,
        }
    }
}

/// Quantity range claimed by two active tiers
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverlapDto {
    pub tier1: TierLabelDto,
    pub tier2: TierLabelDto,
    #[schema(value_type = f64)]
    pub from: Decimal,
    /// `null` when both tiers are unbounded
    #[schema(value_type = Option<f64>)]
    pub to: Option<Decimal>,
}

impl From<Overlap> for OverlapDto {
    fn from(o: Overlap) -> Self {
        Self {
            tier1: o.tier1.into(),
            tier2: o.tier2.into(),
            from: o.overlap.from,
            to: o.overlap.to,
        }
    }
}

/// Prefill for the next tier of a ladder
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTierDefaultsResponse {
    pub next_tier_order: i32,
    /// `null` when an active unbounded tier blocks appending
    #[schema(value_type = Option<f64>)]
    pub min_quantity: Option<Decimal>,
    /// New tiers must be priced strictly above this
    #[schema(value_type = Option<f64>)]
    pub min_unit_price: Option<Decimal>,
    pub append_blocked: bool,
}

impl From<NewTierDefaults> for NewTierDefaultsResponse {
    fn from(d: NewTierDefaults) -> Self {
        Self {
            append_blocked: d.append_blocked(),
            next_tier_order: d.next_tier_order,
            min_quantity: d.min_quantity,
            min_unit_price: d.min_unit_price,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierWarningDto {
    /// `multipleUnboundedTiers` or `ambiguousLastTier`
    pub kind: String,
    pub tiers: Vec<TierLabelDto>,
}

impl From<TierWarning> for TierWarningDto {
    fn from(w: TierWarning) -> Self {
        let (kind, tiers) = match w {
            TierWarning::MultipleUnboundedTiers { tiers } => ("multipleUnboundedTiers", tiers),
            TierWarning::AmbiguousLastTier { tiers } => ("ambiguousLastTier", tiers),
        };
        Self {
            kind: kind.to_string(),
            tiers: labels(tiers),
        }
    }
}

/// Consistency analysis of one service's ladder
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierAnalysisResponse {
    pub service_code: String,
    /// Reference date the analysis was computed for
    pub today: NaiveDate,
    pub consistent: bool,
    pub active_tiers: Vec<TierLabelDto>,
    pub gaps: Vec<GapDto>,
    pub overlaps: Vec<OverlapDto>,
    pub has_final_tier: bool,
    pub last_tiers: Vec<TierLabelDto>,
    pub defaults: NewTierDefaultsResponse,
    pub warnings: Vec<TierWarningDto>,
}

impl TierAnalysisResponse {
    pub fn new(service_code: String, report: TierConsistencyReport) -> Self {
        Self {
            service_code,
            consistent: report.is_consistent(),
            today: report.today,
            active_tiers: labels(report.active_tiers),
            gaps: report.gaps.into_iter().map(Into::into).collect(),
            overlaps: report.overlaps.into_iter().map(Into::into).collect(),
            has_final_tier: report.has_final_tier,
            last_tiers: labels(report.last_tiers),
            defaults: report.defaults.into(),
            warnings: report.warnings.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_tells_null_from_absent() {
        let req: UpdatePricingTierRequest =
            serde_json::from_str(r#"{"maxQuantity": null, "unitPrice": 12.5}"#).unwrap();
        assert_eq!(req.max_quantity, Some(None));
        assert_eq!(req.effective_until, None);
        assert_eq!(req.unit_price, Some(Decimal::new(125, 1)));

        let req: UpdatePricingTierRequest =
            serde_json::from_str(r#"{"effectiveUntil": "2025-01-01"}"#).unwrap();
        assert_eq!(req.max_quantity, None);
        assert_eq!(req.effective_until, Some(Some("2025-01-01".to_string())));
    }

    #[test]
    fn gap_to_infinity_serializes_as_string() {
        let dto = GapDto::from(Gap {
            from: Decimal::from(101),
            to: GapEnd::Infinity,
        });
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["to"], "Infinity");
        assert_eq!(json["missingFinalTier"], true);
    }
}
