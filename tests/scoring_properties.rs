use std::collections::HashSet;

use crownforge::data::analysis::{CardAnalysis, CardProgression, Rarity};
use crownforge::data::synergy::SynergyDatabase;
use crownforge::deck::{evolution_bonus, level_ratio, DeckBuilder, Role, ScoringConfig, SynergyCache};
use proptest::prelude::*;

const NAMES: [&str; 12] = [
    "Hog Rider",
    "Giant",
    "Royal Giant",
    "Cannon",
    "Tesla",
    "Fireball",
    "Poison",
    "Musketeer",
    "Valkyrie",
    "Zap",
    "Ice Spirit",
    "Skeletons",
];

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::WinCondition),
        Just(Role::Building),
        Just(Role::SpellBig),
        Just(Role::Support),
        Just(Role::SpellSmall),
        Just(Role::Cycle),
    ]
}

proptest! {
    #[test]
    fn evolution_bonus_grows_with_level(
        level in 1u32..14,
        step in 1u32..4,
        max_evo in 1u32..4,
    ) {
        let config = ScoringConfig::default();
        let higher = (level + step).min(14);
        let low = evolution_bonus(&config, true, level, 14, max_evo, None);
        let high = evolution_bonus(&config, true, higher, 14, max_evo, None);
        prop_assert!(high >= low);
        prop_assert!(low > 0.0);
    }

    #[test]
    fn evolution_bonus_grows_with_evolution_depth(
        level in 1u32..=14,
        max_evo in 1u32..4,
        role in role_strategy(),
    ) {
        let config = ScoringConfig::default();
        let shallow = evolution_bonus(&config, true, level, 14, max_evo, Some(role));
        let deep = evolution_bonus(&config, true, level, 14, max_evo + 1, Some(role));
        prop_assert!(deep > shallow);
    }

    #[test]
    fn locked_evolutions_never_score(
        level in 0u32..=16,
        max_evo in 0u32..4,
    ) {
        let config = ScoringConfig::default();
        prop_assert_eq!(evolution_bonus(&config, false, level, 14, max_evo, None), 0.0);
    }

    #[test]
    fn level_ratio_stays_in_unit_interval(
        level in 0u32..=14,
        max_level in 1u32..=16,
        evolution_level in 0u32..=5,
        max_evolution_level in 0u32..=3,
    ) {
        let level = level.min(max_level);
        let ratio = level_ratio(level, max_level, evolution_level, max_evolution_level);
        prop_assert!((0.0..=1.0).contains(&ratio), "ratio {}", ratio);
    }

    #[test]
    fn synergy_lookup_is_symmetric(a in 0usize..NAMES.len(), b in 0usize..NAMES.len()) {
        let db = SynergyDatabase::embedded().unwrap();
        let mut cache = SynergyCache::new();
        let forward = cache.get_cached_synergy(&db, NAMES[a], NAMES[b]);
        let backward = cache.get_cached_synergy(&db, NAMES[b], NAMES[a]);
        prop_assert_eq!(forward, backward);
        prop_assert_eq!(forward, db.get_synergy(NAMES[b], NAMES[a]));
    }

    #[test]
    fn pick_best_never_returns_wrong_role_or_used_card(
        levels in proptest::collection::vec(1u32..=14, NAMES.len()),
        used_mask in proptest::collection::vec(any::<bool>(), NAMES.len()),
        role in role_strategy(),
        synergy in any::<bool>(),
    ) {
        let mut builder = DeckBuilder::with_embedded_data().unwrap();
        builder.set_synergy_enabled(synergy);
        let analysis = CardAnalysis::from_cards(
            NAMES
                .iter()
                .zip(&levels)
                .map(|(name, level)| (name.to_string(), CardProgression::new(*level, 14, Rarity::Rare))),
        );
        let candidates = builder.build_candidates(&analysis);
        let used: HashSet<String> = candidates
            .iter()
            .zip(&used_mask)
            .filter(|(_, used)| **used)
            .map(|(card, _)| card.name.clone())
            .collect();
        let partial: Vec<_> = candidates
            .iter()
            .filter(|card| used.contains(&card.name))
            .cloned()
            .collect();

        let mut ctx = builder.context();
        match ctx.pick_best(role, &candidates, &used, &partial) {
            Some(pick) => {
                let card = &candidates[pick.index];
                prop_assert!(card.fills(role));
                prop_assert!(!used.contains(&card.name));
            }
            None => {
                prop_assert!(candidates
                    .iter()
                    .all(|card| !card.fills(role) || used.contains(&card.name)));
            }
        }
    }
}
