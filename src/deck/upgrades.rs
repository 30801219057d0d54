//! Upgrade recommendations for the cards of a built deck.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::data::analysis::{CardAnalysis, Rarity};
use crate::deck::builder::DeckBuilder;
use crate::deck::candidate::CardCandidate;
use crate::deck::recommendation::{round_to, DeckRecommendation};
use crate::deck::role::Role;

pub const DEFAULT_UPGRADE_COUNT: usize = 5;
const SIGNIFICANT_DELTA: f64 = 0.05;
const MODERATE_DELTA: f64 = 0.02;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeRecommendation {
    pub card_name: String,
    pub current_level: u32,
    pub target_level: u32,
    pub rarity: Rarity,
    pub elixir: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub score_delta: f64,
    pub impact_score: f64,
    pub gold_cost: u64,
    /// Impact per 1000 gold; 0 when the cost is unknown.
    pub value_per_gold: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeRecommendations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_tag: Option<String>,
    pub deck_name: String,
    pub total_gold_needed: u64,
    pub recommendations: Vec<UpgradeRecommendation>,
    pub generated_at: String,
}

/// How much a role matters when choosing what to level first.
pub fn role_importance(role: Option<Role>) -> f64 {
    match role {
        Some(Role::WinCondition) => 1.0,
        Some(Role::Building) => 0.7,
        Some(Role::SpellBig) => 0.6,
        Some(Role::Support) => 0.5,
        Some(Role::SpellSmall) => 0.4,
        Some(Role::Cycle) => 0.3,
        None => 0.4,
    }
}

fn upgrade_reason(delta: f64, role: Option<Role>) -> String {
    let label = role.map(|role| role.as_str()).unwrap_or("card");
    if delta > SIGNIFICANT_DELTA {
        format!("Significant score boost (+{delta:.3}) for this key {label}")
    } else if delta > MODERATE_DELTA {
        format!("Moderate score boost (+{delta:.3}) for this {label}")
    } else {
        format!("Minor improvement (+{delta:.3}) for this {label}")
    }
}

impl DeckBuilder {
    /// Rank one-level upgrades for the deck's cards by impact, then gold efficiency.
    /// Cards at max level or missing from the analysis are skipped. `top_n == 0` means the default.
    pub fn upgrade_recommendations(
        &self,
        analysis: &CardAnalysis,
        deck: &DeckRecommendation,
        top_n: usize,
    ) -> UpgradeRecommendations {
        let top_n = if top_n == 0 { DEFAULT_UPGRADE_COUNT } else { top_n };

        let mut recommendations: Vec<UpgradeRecommendation> = deck
            .deck_detail
            .iter()
            .filter(|detail| detail.level < detail.max_level)
            .filter_map(|detail| {
                let progression = analysis.card_levels.get(&detail.name)?;
                let current = CardCandidate::from_progression(
                    &detail.name,
                    progression,
                    self.knowledge(),
                    self.is_evolution_unlocked(&detail.name),
                );
                let mut upgraded = current.clone();
                upgraded.level = (current.level + 1).min(current.max_level);

                let scoring = self.scoring_config();
                let delta = scoring.base_score(&upgraded, self.profile())
                    - scoring.base_score(&current, self.profile());
                let gold_cost = self.knowledge().gold_cost(current.rarity, current.level);
                let impact = delta * 1000.0
                    + role_importance(current.role) * 20.0
                    + current.rarity.upgrade_priority() * 10.0;
                let value_per_gold = if gold_cost > 0 {
                    impact / gold_cost as f64 * 1000.0
                } else {
                    0.0
                };

                Some(UpgradeRecommendation {
                    card_name: current.name.clone(),
                    current_level: current.level,
                    target_level: upgraded.level,
                    rarity: current.rarity,
                    elixir: current.elixir,
                    role: current.role,
                    score_delta: round_to(delta, 4),
                    impact_score: round_to(impact, 3),
                    gold_cost,
                    value_per_gold: round_to(value_per_gold, 3),
                    reason: upgrade_reason(delta, current.role),
                })
            })
            .collect();

        recommendations.sort_by(|a, b| {
            b.impact_score
                .total_cmp(&a.impact_score)
                .then_with(|| b.value_per_gold.total_cmp(&a.value_per_gold))
        });
        recommendations.truncate(top_n);

        let shown: Vec<&str> = deck.deck.iter().take(3).map(String::as_str).collect();
        UpgradeRecommendations {
            player_tag: analysis.player_tag.clone(),
            deck_name: format!("{}...", shown.join(", ")),
            total_gold_needed: recommendations.iter().map(|rec| rec.gold_cost).sum(),
            recommendations,
            generated_at: Local::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::analysis::CardProgression;
    use crate::data::knowledge::KnowledgeBase;
    use crate::data::synergy::SynergyDatabase;

    fn setup() -> (DeckBuilder, CardAnalysis) {
        let builder = DeckBuilder::new(
            Arc::new(KnowledgeBase::embedded().unwrap()),
            Arc::new(SynergyDatabase::default()),
        );
        let analysis = CardAnalysis::from_cards([
            ("Hog Rider", CardProgression::new(11, 14, Rarity::Rare)),
            ("Cannon", CardProgression::new(12, 14, Rarity::Common)),
            ("Fireball", CardProgression::new(10, 14, Rarity::Rare)),
            ("Musketeer", CardProgression::new(14, 14, Rarity::Rare)),
            ("Valkyrie", CardProgression::new(9, 14, Rarity::Rare)),
            ("Log", CardProgression::new(9, 14, Rarity::Legendary)),
            ("Ice Spirit", CardProgression::new(12, 14, Rarity::Common)),
            ("Skeletons", CardProgression::new(12, 14, Rarity::Common)),
        ]);
        (builder, analysis)
    }

    #[test]
    fn skips_maxed_cards_and_limits_count() {
        let (builder, analysis) = setup();
        let deck = builder.build_deck_from_analysis(&analysis).unwrap();
        let upgrades = builder.upgrade_recommendations(&analysis, &deck, 3);
        assert_eq!(upgrades.recommendations.len(), 3);
        assert!(upgrades
            .recommendations
            .iter()
            .all(|rec| rec.card_name != "Musketeer"));
        let impacts: Vec<f64> = upgrades
            .recommendations
            .iter()
            .map(|rec| rec.impact_score)
            .collect();
        assert!(impacts.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn gold_cost_and_totals_come_from_knowledge() {
        let (builder, analysis) = setup();
        let deck = builder.build_deck_from_analysis(&analysis).unwrap();
        let upgrades = builder.upgrade_recommendations(&analysis, &deck, 0);
        assert!(upgrades.recommendations.len() <= DEFAULT_UPGRADE_COUNT);
        let hog = upgrades
            .recommendations
            .iter()
            .find(|rec| rec.card_name == "Hog Rider")
            .unwrap();
        assert_eq!(hog.target_level, 12);
        assert_eq!(hog.gold_cost, 50_000);
        let total: u64 = upgrades.recommendations.iter().map(|rec| rec.gold_cost).sum();
        assert_eq!(upgrades.total_gold_needed, total);
    }

    #[test]
    fn value_per_gold_uses_custom_cost_table() {
        let (_, analysis) = setup();
        let embedded = KnowledgeBase::embedded().unwrap();
        let free = embedded.clone().with_gold_costs(Default::default());
        let builder = DeckBuilder::new(Arc::new(free), Arc::new(SynergyDatabase::default()));
        let deck = builder.build_deck_from_analysis(&analysis).unwrap();
        let upgrades = builder.upgrade_recommendations(&analysis, &deck, 8);
        assert_eq!(upgrades.total_gold_needed, 0);
        assert!(upgrades.recommendations.iter().all(|rec| rec.value_per_gold == 0.0));

        let mut costs = std::collections::BTreeMap::new();
        costs.insert(Rarity::Rare, [(11u32, 1_000u64)].into_iter().collect());
        let builder = DeckBuilder::new(
            Arc::new(embedded.with_gold_costs(costs)),
            Arc::new(SynergyDatabase::default()),
        );
        let upgrades = builder.upgrade_recommendations(&analysis, &deck, 8);
        let hog = upgrades
            .recommendations
            .iter()
            .find(|rec| rec.card_name == "Hog Rider")
            .unwrap();
        assert_eq!(hog.gold_cost, 1_000);
        assert!(hog.value_per_gold > 0.0);
        assert_eq!(upgrades.total_gold_needed, 1_000);
    }

    #[test]
    fn reason_tiers_follow_delta() {
        assert!(upgrade_reason(0.08, Some(Role::WinCondition)).starts_with("Significant"));
        assert!(upgrade_reason(0.03, None).starts_with("Moderate"));
        assert!(upgrade_reason(0.01, Some(Role::Cycle)).starts_with("Minor"));
    }
}
