//! Player collection analysis: per-card progression keyed by card name.
//! Loaded from `*analysis*<TAG>.json` documents written by the collection importer.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::player_tag::sanitize_player_tag;
use crate::error::{DeckError, Result};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Rarity {
    #[default]
    #[serde(alias = "common", alias = "COMMON")]
    Common,
    #[serde(alias = "rare", alias = "RARE")]
    Rare,
    #[serde(alias = "epic", alias = "EPIC")]
    Epic,
    #[serde(alias = "legendary", alias = "LEGENDARY")]
    Legendary,
    #[serde(alias = "champion", alias = "CHAMPION")]
    Champion,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
            Self::Champion => "Champion",
        }
    }

    /// Upgrade priority weight: scarcer cards are worth more per level.
    pub fn upgrade_priority(&self) -> f64 {
        match self {
            Self::Common => 1.0,
            Self::Rare => 1.3,
            Self::Epic => 1.7,
            Self::Legendary => 2.2,
            Self::Champion => 2.5,
        }
    }

    pub fn parse_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "common" => Some(Self::Common),
            "rare" => Some(Self::Rare),
            "epic" => Some(Self::Epic),
            "legendary" => Some(Self::Legendary),
            "champion" => Some(Self::Champion),
            _ => None,
        }
    }
}

/// Raw progression for one card as reported by the player's collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardProgression {
    pub level: u32,
    #[serde(alias = "maxLevel")]
    pub max_level: u32,
    #[serde(default)]
    pub rarity: Rarity,
    /// Elixir reported by the collection source; 0 or absent means unknown.
    #[serde(default, alias = "elixirCost", alias = "elixir_cost")]
    pub elixir: Option<u8>,
    #[serde(default, alias = "evolutionLevel")]
    pub evolution_level: u32,
    /// Absent means "ask the knowledge base".
    #[serde(
        default,
        alias = "maxEvolutionLevel",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_evolution_level: Option<u32>,
    /// Preferred-card boost; multiplies the base score by `1 + boost`.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub score_boost: f64,
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

impl CardProgression {
    pub fn new(level: u32, max_level: u32, rarity: Rarity) -> Self {
        Self {
            level,
            max_level,
            rarity,
            ..Self::default()
        }
    }

    pub fn with_elixir(mut self, elixir: u8) -> Self {
        self.elixir = Some(elixir);
        self
    }

    pub fn with_evolution(mut self, evolution_level: u32, max_evolution_level: u32) -> Self {
        self.evolution_level = evolution_level;
        self.max_evolution_level = Some(max_evolution_level);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardAnalysis {
    #[serde(alias = "cardLevels")]
    pub card_levels: BTreeMap<String, CardProgression>,
    #[serde(default, alias = "analysisTime", skip_serializing_if = "Option::is_none")]
    pub analysis_time: Option<String>,
    #[serde(default, alias = "playerName", skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(default, alias = "playerTag", skip_serializing_if = "Option::is_none")]
    pub player_tag: Option<String>,
}

impl CardAnalysis {
    pub fn from_cards<I, S>(cards: I) -> Self
    where
        I: IntoIterator<Item = (S, CardProgression)>,
        S: Into<String>,
    {
        Self {
            card_levels: cards
                .into_iter()
                .map(|(name, progression)| (name.into(), progression))
                .collect(),
            ..Self::default()
        }
    }
}

pub fn load_analysis(path: impl AsRef<Path>) -> Result<CardAnalysis> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|err| DeckError::analysis_io(path, err))?;
    serde_json::from_str(&raw).map_err(|err| DeckError::analysis_parse(path, err))
}

/// Load the most recently modified `*analysis*<TAG>.json` in `dir`.
pub fn load_latest_analysis(dir: impl AsRef<Path>, player_tag: &str) -> Result<CardAnalysis> {
    let dir = dir.as_ref();
    let tag = sanitize_player_tag(player_tag)?;
    let suffix = format!("{tag}.json");

    let entries = fs::read_dir(dir).map_err(|err| DeckError::analysis_io(dir, err))?;
    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !file_name.contains("analysis") || !file_name.ends_with(&suffix) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let is_newer = newest
            .as_ref()
            .map(|(best, best_path)| (modified, &path) > (*best, best_path))
            .unwrap_or(true);
        if is_newer {
            newest = Some((modified, path));
        }
    }

    let Some((_, path)) = newest else {
        return Err(DeckError::analysis_missing(
            dir,
            format!("no analysis file found for player tag {tag}"),
        ));
    };
    debug!(path = %path.display(), "loading latest analysis");
    load_analysis(path)
}
