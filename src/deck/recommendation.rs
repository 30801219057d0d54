//! Deck recommendation output document and its JSON persistence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data::analysis::Rarity;
use crate::data::player_tag::sanitize_player_tag;
use crate::deck::candidate::CardCandidate;
use crate::deck::role::Role;
use crate::deck::strategy::Strategy;
use crate::error::{DeckError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDetail {
    pub name: String,
    pub level: u32,
    #[serde(alias = "maxLevel")]
    pub max_level: u32,
    #[serde(default)]
    pub rarity: Rarity,
    pub elixir: u8,
    #[serde(default)]
    pub role: Option<Role>,
    pub score: f64,
    #[serde(default, alias = "evolutionLevel")]
    pub evolution_level: u32,
    #[serde(default, alias = "maxEvolutionLevel")]
    pub max_evolution_level: u32,
}

impl From<&CardCandidate> for CardDetail {
    fn from(card: &CardCandidate) -> Self {
        Self {
            name: card.name.clone(),
            level: card.level,
            max_level: card.max_level,
            rarity: card.rarity,
            elixir: card.elixir,
            role: card.role,
            score: round_to(card.score, 3),
            evolution_level: card.evolution_level,
            max_evolution_level: card.max_evolution_level,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckRecommendation {
    pub deck: Vec<String>,
    #[serde(alias = "deckDetail")]
    pub deck_detail: Vec<CardDetail>,
    #[serde(alias = "avgElixir")]
    pub average_elixir: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(default, alias = "analysisTime", skip_serializing_if = "Option::is_none")]
    pub analysis_time: Option<String>,
    #[serde(default, alias = "evolutionSlots")]
    pub evolution_slots: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl DeckRecommendation {
    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn has_evolution_slot(&self, name: &str) -> bool {
        self.evolution_slots.iter().any(|slot| slot == name)
    }

    pub fn is_complete(&self) -> bool {
        self.deck.len() == crate::deck::strategy::DECK_SIZE
            && self.deck_detail.len() == self.deck.len()
    }
}

/// Mean elixir of the given cards, rounded to two decimals. 0 for no cards.
pub fn average_elixir(cards: &[CardCandidate]) -> f64 {
    if cards.is_empty() {
        return 0.0;
    }
    let total: u32 = cards.iter().map(|card| u32::from(card.elixir)).sum();
    round_to(f64::from(total) / cards.len() as f64, 2)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `<YYYYmmdd_HHMMSS>_deck_<TAG>.json`
pub fn deck_filename(player_tag: &str, at: DateTime<Local>) -> Result<String> {
    let tag = sanitize_player_tag(player_tag)?;
    Ok(format!("{}_deck_{tag}.json", at.format("%Y%m%d_%H%M%S")))
}

/// Write the recommendation as pretty JSON under `dir`, returning the file path.
pub fn save_deck(
    recommendation: &DeckRecommendation,
    dir: impl AsRef<Path>,
    player_tag: &str,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let path = dir.join(deck_filename(player_tag, Local::now())?);
    fs::create_dir_all(dir).map_err(|source| DeckError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    let payload = serde_json::to_string_pretty(recommendation).map_err(|err| DeckError::Write {
        path: path.clone(),
        source: io::Error::new(io::ErrorKind::InvalidData, err),
    })?;
    fs::write(&path, payload).map_err(|source| DeckError::Write {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "deck saved");
    Ok(path)
}

pub fn load_deck(path: impl AsRef<Path>) -> Result<DeckRecommendation> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|err| DeckError::analysis_io(path, err))?;
    serde_json::from_str(&raw).map_err(|err| DeckError::analysis_parse(path, err))
}
