//! Static card knowledge: role, default elixir and evolution capability per card,
//! plus the gold cost table for upgrades. Embedded default with an optional override.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::analysis::Rarity;
use crate::data::loader::{load_with_fallback, normalize_lookup};
use crate::deck::role::Role;
use crate::error::Result;

pub const DEFAULT_CARDS_FILE: &str = "knowledge/cards.json";
const EMBEDDED_CARDS: &str = include_str!("../../data/knowledge/cards.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardKnowledge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub elixir: u8,
    #[serde(default)]
    pub max_evolution_level: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct KnowledgeFile {
    #[serde(default)]
    version: u32,
    cards: BTreeMap<String, CardKnowledge>,
    /// rarity -> current level -> gold needed to reach the next level
    #[serde(default)]
    gold_costs: BTreeMap<Rarity, BTreeMap<u32, u64>>,
}

/// Read-only card table loaded once before any build.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    pub version: u32,
    pub cards: BTreeMap<String, CardKnowledge>,
    pub gold_costs: BTreeMap<Rarity, BTreeMap<u32, u64>>,
    by_key: HashMap<String, String>,
}

impl KnowledgeBase {
    fn from_file(file: KnowledgeFile) -> Self {
        let by_key = file
            .cards
            .keys()
            .map(|name| (normalize_lookup(name), name.clone()))
            .collect();
        Self {
            version: file.version,
            cards: file.cards,
            gold_costs: file.gold_costs,
            by_key,
        }
    }

    pub fn embedded() -> Result<Self> {
        Self::load(None)
    }

    /// Load from an override file (JSON or YAML), falling back to the embedded table.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file: KnowledgeFile = load_with_fallback(path, EMBEDDED_CARDS, DEFAULT_CARDS_FILE)?;
        Ok(Self::from_file(file))
    }

    pub fn from_cards<I, S>(cards: I) -> Self
    where
        I: IntoIterator<Item = (S, CardKnowledge)>,
        S: Into<String>,
    {
        Self::from_file(KnowledgeFile {
            cards: cards.into_iter().map(|(name, card)| (name.into(), card)).collect(),
            ..KnowledgeFile::default()
        })
    }

    pub fn with_gold_costs(mut self, gold_costs: BTreeMap<Rarity, BTreeMap<u32, u64>>) -> Self {
        self.gold_costs = gold_costs;
        self
    }

    /// Exact name first, then the normalized form.
    pub fn card(&self, name: &str) -> Option<&CardKnowledge> {
        self.cards.get(name).or_else(|| {
            self.by_key
                .get(&normalize_lookup(name))
                .and_then(|canonical| self.cards.get(canonical))
        })
    }

    pub fn role_of(&self, name: &str) -> Option<Role> {
        self.card(name).and_then(|card| card.role)
    }

    pub fn default_elixir(&self, name: &str) -> Option<u8> {
        self.card(name)
            .map(|card| card.elixir)
            .filter(|elixir| *elixir > 0)
    }

    pub fn max_evolution_level(&self, name: &str) -> u32 {
        self.card(name)
            .map(|card| card.max_evolution_level)
            .unwrap_or(0)
    }

    pub fn cards_with_role(&self, role: Role) -> impl Iterator<Item = &str> + '_ {
        self.cards
            .iter()
            .filter(move |(_, card)| card.role == Some(role))
            .map(|(name, _)| name.as_str())
    }

    /// Gold needed to go from `level` to `level + 1`; 0 when unknown.
    pub fn gold_cost(&self, rarity: Rarity, level: u32) -> u64 {
        self.gold_costs
            .get(&rarity)
            .and_then(|costs| costs.get(&level))
            .copied()
            .unwrap_or(0)
    }
}
