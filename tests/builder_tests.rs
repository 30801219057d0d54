use std::collections::HashMap;
use std::fs;

use crownforge::data::analysis::{CardAnalysis, CardProgression, Rarity};
use crownforge::deck::{load_deck, save_deck, DeckBuilder, Role, Strategy, DECK_SIZE};
use crownforge::DeckError;

fn builder() -> DeckBuilder {
    DeckBuilder::with_embedded_data().expect("embedded knowledge should load")
}

fn collection(cards: &[(&str, u32)]) -> CardAnalysis {
    CardAnalysis::from_cards(
        cards
            .iter()
            .map(|(name, level)| (name.to_string(), CardProgression::new(*level, 14, Rarity::Rare))),
    )
}

fn full_collection(builder: &DeckBuilder) -> CardAnalysis {
    let names: Vec<String> = builder.knowledge().cards.keys().cloned().collect();
    CardAnalysis::from_cards(names.into_iter().enumerate().map(|(i, name)| {
        let level = 8 + (i % 7) as u32;
        (name, CardProgression::new(level, 14, Rarity::Common))
    }))
}

fn roles_of(builder: &DeckBuilder, deck: &[String]) -> HashMap<Option<Role>, usize> {
    let mut counts = HashMap::new();
    for name in deck {
        *counts.entry(builder.knowledge().role_of(name)).or_insert(0) += 1;
    }
    counts
}

#[test]
fn every_strategy_returns_a_full_deck() {
    let mut builder = builder();
    let analysis = full_collection(&builder);
    for strategy in Strategy::ALL {
        builder.set_strategy_kind(strategy);
        let rec = builder.build_deck_from_analysis(&analysis).unwrap();
        assert_eq!(rec.deck.len(), DECK_SIZE, "{strategy}");
        assert_eq!(rec.deck_detail.len(), DECK_SIZE, "{strategy}");
        assert!(rec.average_elixir > 0.0 && rec.average_elixir <= 10.0);
        assert_eq!(rec.strategy, Some(strategy));

        let mut unique = rec.deck.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), DECK_SIZE, "{strategy} repeated a card");
    }
}

#[test]
fn exactly_eight_known_cards_fill_every_strategy() {
    let mut builder = builder();
    let analysis = collection(&[
        ("Hog Rider", 11),
        ("Cannon", 11),
        ("Fireball", 11),
        ("Musketeer", 11),
        ("Valkyrie", 11),
        ("Log", 11),
        ("Ice Spirit", 11),
        ("Skeletons", 11),
    ]);
    for strategy in Strategy::ALL {
        builder.set_strategy_kind(strategy);
        let rec = builder.build_deck_from_analysis(&analysis).unwrap();
        assert_eq!(rec.deck.len(), DECK_SIZE, "{strategy}");
    }
}

#[test]
fn cycle_strategy_keeps_cheap_pool_cheap() {
    let mut builder = builder();
    builder.set_strategy("cycle").unwrap();
    let analysis = collection(&[
        ("Hog Rider", 11),
        ("Cannon", 11),
        ("Archers", 11),
        ("Zap", 11),
        ("Skeletons", 11),
        ("Ice Spirit", 11),
        ("Knight", 11),
        ("Bats", 11),
        ("Fire Spirit", 11),
    ]);
    let rec = builder.build_deck_from_analysis(&analysis).unwrap();
    assert_eq!(rec.deck.len(), DECK_SIZE);
    assert!(rec.average_elixir <= 3.2, "average {}", rec.average_elixir);
}

#[test]
fn spell_strategy_takes_two_big_spells_and_no_building() {
    let mut builder = builder();
    builder.set_strategy("Spell").unwrap();
    let analysis = collection(&[
        ("Hog Rider", 12),
        ("Giant", 11),
        ("Cannon", 14),
        ("Tesla", 13),
        ("Fireball", 11),
        ("Poison", 10),
        ("Musketeer", 11),
        ("Wizard", 11),
        ("Baby Dragon", 11),
        ("Zap", 11),
        ("Ice Spirit", 11),
    ]);
    let rec = builder.build_deck_from_analysis(&analysis).unwrap();
    let roles = roles_of(&builder, &rec.deck);
    assert_eq!(roles.get(&Some(Role::SpellBig)), Some(&2));
    assert_eq!(roles.get(&Some(Role::Building)), None);
}

fn evolution_pool() -> CardAnalysis {
    collection(&[
        ("Royal Giant", 9),
        ("Cannon", 11),
        ("Fireball", 11),
        ("Musketeer", 14),
        ("Valkyrie", 11),
        ("Zap", 11),
        ("Ice Spirit", 11),
        ("Skeletons", 11),
    ])
}

#[test]
fn no_unlocked_evolutions_means_no_slots() {
    let rec = builder()
        .build_deck_from_analysis(&evolution_pool())
        .unwrap();
    assert!(rec.evolution_slots.is_empty());
}

#[test]
fn single_slot_goes_to_higher_priority_role() {
    let mut builder = builder();
    builder.set_unlocked_evolutions(["Royal Giant", "Musketeer"]);
    builder.set_evolution_slot_limit(1);
    let rec = builder.build_deck_from_analysis(&evolution_pool()).unwrap();
    assert!(rec.deck.contains(&"Royal Giant".to_string()));
    assert!(rec.deck.contains(&"Musketeer".to_string()));
    assert_eq!(rec.evolution_slots, vec!["Royal Giant".to_string()]);
}

#[test]
fn evolution_slots_never_change_membership() {
    let mut builder = builder();
    let plain = builder.build_deck_from_analysis(&evolution_pool()).unwrap();
    builder.set_unlocked_evolutions(["Valkyrie"]);
    builder.set_evolution_slot_limit(2);
    let annotated = builder.build_deck_from_analysis(&evolution_pool()).unwrap();
    let mut before = plain.deck.clone();
    let mut after = annotated.deck.clone();
    before.sort();
    after.sort();
    assert_eq!(before, after);
    assert_eq!(annotated.evolution_slots, vec!["Valkyrie".to_string()]);
}

#[test]
fn repeated_builds_are_identical() {
    let mut builder = builder();
    builder.set_synergy_enabled(true);
    let analysis = full_collection(&builder);
    let first = builder.build_deck_from_analysis(&analysis).unwrap();
    let second = builder.build_deck_from_analysis(&analysis).unwrap();
    assert_eq!(first, second);
}

#[test]
fn synergy_weight_changes_do_not_leak_between_builds() {
    let mut builder = builder();
    let analysis = full_collection(&builder);
    builder.set_synergy_enabled(true);
    builder.set_synergy_weight(1.0).unwrap();
    let _ = builder.build_deck_from_analysis(&analysis).unwrap();
    builder.set_synergy_weight(0.0).unwrap();
    let zero_weight = builder.build_deck_from_analysis(&analysis).unwrap();
    builder.set_synergy_enabled(false);
    let disabled = builder.build_deck_from_analysis(&analysis).unwrap();
    assert_eq!(zero_weight.deck, disabled.deck);
}

#[test]
fn save_and_reload_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let rec = builder()
        .build_deck_from_analysis(&evolution_pool())
        .unwrap();
    let path = save_deck(&rec, dir.path(), "#p0lyj2u").unwrap();
    let file_name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.ends_with("_deck_P0LYJ2U.json"), "{file_name}");

    let loaded = load_deck(&path).unwrap();
    assert_eq!(loaded.deck, rec.deck);
    assert_eq!(loaded.average_elixir, rec.average_elixir);
    assert_eq!(loaded, rec);
}

#[test]
fn builds_from_camel_case_analysis_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("20260101_analysis_TAG.json");
    fs::write(
        &path,
        r#"{
            "cardLevels": {
                "Hog Rider": {"level": 11, "maxLevel": 14, "rarity": "Rare", "elixir": 4},
                "Cannon": {"level": 11, "maxLevel": 14, "rarity": "Common"},
                "Fireball": {"level": 11, "maxLevel": 14, "rarity": "Rare"},
                "Musketeer": {"level": 11, "maxLevel": 14, "rarity": "Rare"},
                "Valkyrie": {"level": 11, "maxLevel": 14, "rarity": "Rare"},
                "Log": {"level": 11, "maxLevel": 14, "rarity": "Legendary"},
                "Ice Spirit": {"level": 11, "maxLevel": 14, "rarity": "Common"},
                "Skeletons": {"level": 11, "maxLevel": 14, "rarity": "Common"}
            },
            "analysisTime": "2026-01-01T10:00:00Z"
        }"#,
    )
    .unwrap();
    let rec = builder().build_deck_from_file(&path).unwrap();
    assert_eq!(rec.deck.len(), DECK_SIZE);
    assert_eq!(rec.analysis_time.as_deref(), Some("2026-01-01T10:00:00Z"));
}

#[test]
fn unreadable_analysis_is_a_load_error() {
    let err = builder()
        .build_deck_from_file("/no/such/analysis.json")
        .unwrap_err();
    assert!(matches!(err, DeckError::AnalysisLoad { .. }));
}

#[test]
fn missing_roles_are_noted() {
    let analysis = collection(&[
        ("Musketeer", 11),
        ("Valkyrie", 11),
        ("Knight", 11),
        ("Skeletons", 11),
        ("Ice Spirit", 11),
        ("Bats", 11),
        ("Archers", 11),
        ("Wizard", 11),
    ]);
    let rec = builder().build_deck_from_analysis(&analysis).unwrap();
    assert_eq!(rec.deck.len(), DECK_SIZE);
    assert!(rec.notes.iter().any(|note| note.starts_with("No win condition")));
    assert!(rec.notes.iter().any(|note| note.starts_with("No defensive building")));
    assert!(rec.notes.iter().any(|note| note.starts_with("No spell")));
}
