//! Consistency report over one service's tier ladder

use chrono::NaiveDate;
use serde::Serialize;

use super::consistency::{
    active_tiers, compute_new_tier_defaults, detect_gaps, detect_overlaps, has_final_tier,
    is_last_tier, max_finite_max,
};
use super::model::{Gap, NewTierDefaults, Overlap, PricingTier, TierLabel};

/// Data anomalies the engine tolerates but an operator should resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TierWarning {
    /// More than one active tier is unbounded. Appending uses the one with
    /// the highest tier order.
    MultipleUnboundedTiers { tiers: Vec<TierLabel> },
    /// Several bounded tiers share the highest `max_quantity`, so each of
    /// them is treated as the last tier.
    AmbiguousLastTier { tiers: Vec<TierLabel> },
}

/// Everything the engine derives from one snapshot, computed against a
/// single reference date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierConsistencyReport {
    pub today: NaiveDate,
    pub active_tiers: Vec<TierLabel>,
    pub gaps: Vec<Gap>,
    pub overlaps: Vec<Overlap>,
    pub has_final_tier: bool,
    pub last_tiers: Vec<TierLabel>,
    pub defaults: NewTierDefaults,
    pub warnings: Vec<TierWarning>,
}

impl TierConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.gaps.is_empty() && self.overlaps.is_empty() && self.warnings.is_empty()
    }

    /// Whether `label` is among the tiers flagged by an ambiguous-last warning.
    pub fn is_ambiguous_last(&self, label: &TierLabel) -> bool {
        self.warnings.iter().any(|w| match w {
            TierWarning::AmbiguousLastTier { tiers } => tiers.contains(label),
            TierWarning::MultipleUnboundedTiers { .. } => false,
        })
    }
}

pub fn analyze_tiers(tiers: &[PricingTier], today: NaiveDate) -> TierConsistencyReport {
    let active = active_tiers(tiers, today);

    let last_tiers = active
        .iter()
        .filter(|t| is_last_tier(t, tiers, today))
        .map(|t| t.label())
        .collect();

    TierConsistencyReport {
        today,
        active_tiers: active.iter().map(|t| t.label()).collect(),
        gaps: detect_gaps(tiers, today),
        overlaps: detect_overlaps(tiers, today),
        has_final_tier: has_final_tier(tiers, today),
        last_tiers,
        defaults: compute_new_tier_defaults(tiers, today),
        warnings: collect_warnings(&active),
    }
}

fn collect_warnings(active: &[&PricingTier]) -> Vec<TierWarning> {
    let mut warnings = Vec::new();

    let unbounded: Vec<TierLabel> = active
        .iter()
        .filter(|t| t.is_unbounded())
        .map(|t| t.label())
        .collect();

    match unbounded.len() {
        0 => {
            if let Some(max_max) = max_finite_max(active) {
                let tied: Vec<TierLabel> = active
                    .iter()
                    .filter(|t| t.max_quantity == Some(max_max))
                    .map(|t| t.label())
                    .collect();
                if tied.len() > 1 {
                    warnings.push(TierWarning::AmbiguousLastTier { tiers: tied });
                }
            }
        }
        1 => {}
        _ => warnings.push(TierWarning::MultipleUnboundedTiers { tiers: unbounded }),
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing_tier::consistency::tests::{tier, today};
    use rust_decimal::Decimal;

    #[test]
    fn clean_ladder_is_consistent() {
        let tiers = vec![
            tier(1, Some(0), Some(50), 1000),
            tier(2, Some(51), Some(100), 1500),
            tier(3, Some(101), None, 2000),
        ];
        let report = analyze_tiers(&tiers, today());

        assert!(report.is_consistent());
        assert!(report.has_final_tier);
        assert_eq!(report.active_tiers.len(), 3);
        assert_eq!(report.last_tiers, vec![tiers[2].label()]);
        assert!(report.defaults.append_blocked());
    }

    #[test]
    fn multiple_unbounded_tiers_raise_a_warning() {
        let tiers = vec![tier(1, Some(0), None, 1000), tier(2, Some(30), None, 1500)];
        let report = analyze_tiers(&tiers, today());

        assert_eq!(
            report.warnings,
            vec![TierWarning::MultipleUnboundedTiers {
                tiers: vec![tiers[0].label(), tiers[1].label()],
            }]
        );
        assert_eq!(report.overlaps.len(), 1);
        assert_eq!(report.defaults.min_unit_price, Some(Decimal::from(1500)));
        assert!(!report.is_consistent());
    }

    #[test]
    fn tied_maximum_raises_ambiguous_last_warning() {
        let tiers = vec![
            tier(1, Some(0), Some(100), 1000),
            tier(2, Some(40), Some(100), 1500),
        ];
        let report = analyze_tiers(&tiers, today());

        assert!(report.is_ambiguous_last(&tiers[0].label()));
        assert!(report.is_ambiguous_last(&tiers[1].label()));
        assert_eq!(report.last_tiers.len(), 2);
    }

    #[test]
    fn inactive_tiers_are_left_out_of_the_report() {
        let mut retired = tier(2, Some(51), Some(100), 1500);
        retired.effective_until = Some("2024-02-01".into());
        let tiers = vec![tier(1, Some(0), Some(50), 1000), retired];
        let report = analyze_tiers(&tiers, today());

        assert_eq!(report.active_tiers, vec![tiers[0].label()]);
        assert_eq!(report.defaults.next_tier_order, 3);
        assert_eq!(report.defaults.min_quantity, Some(Decimal::from(51)));
        assert_eq!(report.gaps.len(), 1);
    }

    #[test]
    fn warning_serializes_with_kind_tag() {
        let warning = TierWarning::AmbiguousLastTier {
            tiers: vec![TierLabel {
                id: Some(4),
                tier_order: 2,
            }],
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "ambiguousLastTier");
        assert_eq!(json["tiers"][0]["tierOrder"], 2);
    }
}
