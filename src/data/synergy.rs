//! Pairwise card synergy table. Lookups are symmetric.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::loader::load_with_fallback;
use crate::error::Result;

pub const DEFAULT_SYNERGY_FILE: &str = "knowledge/synergy_pairs.json";
const EMBEDDED_SYNERGY: &str = include_str!("../../data/knowledge/synergy_pairs.json");

/// Pairs counted when normalising a full 8-card deck (8 choose 2).
const FULL_DECK_PAIRS: f64 = 28.0;
const TOP_SYNERGIES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynergyCategory {
    TankSupport,
    Bait,
    SpellCombo,
    WinCondition,
    Defensive,
    Cycle,
    BridgeSpam,
}

impl SynergyCategory {
    pub fn description(&self) -> &'static str {
        match self {
            Self::TankSupport => "Tank + Support",
            Self::Bait => "Spell Bait",
            Self::SpellCombo => "Spell Combo",
            Self::WinCondition => "Win Condition",
            Self::Defensive => "Defensive",
            Self::Cycle => "Cycle",
            Self::BridgeSpam => "Bridge Spam",
        }
    }
}

impl fmt::Display for SynergyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyPair {
    pub card1: String,
    pub card2: String,
    pub synergy_type: SynergyCategory,
    /// 0.0 to 1.0
    pub score: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SynergyFile {
    #[serde(default)]
    version: u32,
    pairs: Vec<SynergyPair>,
}

/// Order-independent key for a pair of card names.
pub fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SynergyDatabase {
    pub pairs: Vec<SynergyPair>,
    /// canonical pair -> index into `pairs`; first definition wins
    index: HashMap<(String, String), usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeckSynergyAnalysis {
    /// Sum of pair scores normalised to 0-100 against a full deck.
    pub total_score: f64,
    pub average_score: f64,
    pub top_synergies: Vec<SynergyPair>,
    /// Cards without any known partner in the deck.
    pub missing_synergies: Vec<String>,
    pub category_scores: BTreeMap<SynergyCategory, usize>,
}

impl SynergyDatabase {
    pub fn from_pairs(pairs: Vec<SynergyPair>) -> Self {
        let mut index = HashMap::with_capacity(pairs.len());
        for (position, pair) in pairs.iter().enumerate() {
            index
                .entry(pair_key(&pair.card1, &pair.card2))
                .or_insert(position);
        }
        Self { pairs, index }
    }

    pub fn embedded() -> Result<Self> {
        Self::load(None)
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file: SynergyFile = load_with_fallback(path, EMBEDDED_SYNERGY, DEFAULT_SYNERGY_FILE)?;
        Ok(Self::from_pairs(file.pairs))
    }

    pub fn pair(&self, a: &str, b: &str) -> Option<&SynergyPair> {
        self.index
            .get(&pair_key(a, b))
            .and_then(|position| self.pairs.get(*position))
    }

    /// Synergy score between two cards; 0 when no pair is known.
    pub fn get_synergy(&self, a: &str, b: &str) -> f64 {
        self.pair(a, b).map(|pair| pair.score).unwrap_or(0.0)
    }

    pub fn analyze_deck<S: AsRef<str>>(&self, deck: &[S]) -> DeckSynergyAnalysis {
        if deck.is_empty() {
            return DeckSynergyAnalysis::default();
        }

        let mut found = Vec::new();
        let mut partner_counts = vec![0usize; deck.len()];
        let mut category_scores = BTreeMap::new();
        let mut total = 0.0;

        for i in 0..deck.len() {
            for j in (i + 1)..deck.len() {
                let Some(pair) = self.pair(deck[i].as_ref(), deck[j].as_ref()) else {
                    continue;
                };
                total += pair.score;
                partner_counts[i] += 1;
                partner_counts[j] += 1;
                *category_scores.entry(pair.synergy_type).or_insert(0) += 1;
                found.push(pair.clone());
            }
        }

        let average_score = if found.is_empty() {
            0.0
        } else {
            total / found.len() as f64
        };
        found.sort_by(|a, b| b.score.total_cmp(&a.score));
        found.truncate(TOP_SYNERGIES);

        let missing_synergies = deck
            .iter()
            .zip(&partner_counts)
            .filter(|(_, count)| **count == 0)
            .map(|(card, _)| card.as_ref().to_string())
            .collect();

        DeckSynergyAnalysis {
            total_score: total / FULL_DECK_PAIRS * 100.0,
            average_score,
            top_synergies: found,
            missing_synergies,
            category_scores,
        }
    }
}
