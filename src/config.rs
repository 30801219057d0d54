//! Builder configuration and environment overrides.
//!
//! Environment:
//! - `UNLOCKED_EVOLUTIONS`: comma-separated card names with unlocked evolutions
//! - `CROWNFORGE_DATA_DIR`: directory holding `knowledge/cards.json` and
//!   `knowledge/synergy_pairs.json` overrides (default `data`)
//! - `CROWNFORGE_LOG`: tracing filter for the binaries (default `warn`)

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::knowledge::{KnowledgeBase, DEFAULT_CARDS_FILE};
use crate::data::loader::parse_document;
use crate::data::synergy::{SynergyDatabase, DEFAULT_SYNERGY_FILE};
use crate::deck::builder::{DEFAULT_EVOLUTION_SLOT_LIMIT, DEFAULT_SYNERGY_WEIGHT};
use crate::deck::scoring::ScoringConfig;
use crate::deck::strategy::Strategy;
use crate::error::{DeckError, Result};

pub const UNLOCKED_EVOLUTIONS_ENV: &str = "UNLOCKED_EVOLUTIONS";
pub const DATA_DIR_ENV: &str = "CROWNFORGE_DATA_DIR";
pub const LOG_ENV: &str = "CROWNFORGE_LOG";
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub strategy: Strategy,
    pub synergy_enabled: bool,
    pub synergy_weight: f64,
    pub unlocked_evolutions: Vec<String>,
    pub evolution_slot_limit: usize,
    pub include_cards: Vec<String>,
    pub exclude_cards: Vec<String>,
    pub scoring: ScoringConfig,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            synergy_enabled: false,
            synergy_weight: DEFAULT_SYNERGY_WEIGHT,
            unlocked_evolutions: Vec::new(),
            evolution_slot_limit: DEFAULT_EVOLUTION_SLOT_LIMIT,
            include_cards: Vec::new(),
            exclude_cards: Vec::new(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl BuilderConfig {
    /// Defaults plus `UNLOCKED_EVOLUTIONS` from the environment.
    pub fn from_env() -> Self {
        Self {
            unlocked_evolutions: env::var(UNLOCKED_EVOLUTIONS_ENV)
                .map(|raw| split_card_list(&raw))
                .unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Load from a JSON or YAML file (by extension). Missing fields keep defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| DeckError::Config {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        parse_document(&raw, path).map_err(DeckError::into_config)
    }
}

/// Split a comma-separated card list, trimming blanks.
pub fn split_card_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|card| !card.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn data_dir() -> PathBuf {
    env::var(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Knowledge and synergy tables from `data_dir`, each falling back to the embedded copy.
pub fn load_knowledge(data_dir: &Path) -> Result<(KnowledgeBase, SynergyDatabase)> {
    let cards = data_dir.join(DEFAULT_CARDS_FILE);
    let synergy = data_dir.join(DEFAULT_SYNERGY_FILE);
    Ok((
        KnowledgeBase::load(Some(cards.as_path()))?,
        SynergyDatabase::load(Some(synergy.as_path()))?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::role::Role;

    #[test]
    fn card_list_ignores_blanks() {
        assert_eq!(
            split_card_list(" Knight, ,Hog Rider ,"),
            vec!["Knight".to_string(), "Hog Rider".to_string()]
        );
        assert!(split_card_list("").is_empty());
    }

    #[test]
    fn yaml_config_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("builder.yml");
        std::fs::write(
            &path,
            "strategy: cycle\nsynergy_enabled: true\nunlocked_evolutions: [Knight]\n",
        )
        .unwrap();
        let config = BuilderConfig::load(&path).unwrap();
        assert_eq!(config.strategy, Strategy::Cycle);
        assert!(config.synergy_enabled);
        assert_eq!(config.synergy_weight, DEFAULT_SYNERGY_WEIGHT);
        assert_eq!(config.evolution_slot_limit, 2);
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn nested_role_weights_merge_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("builder.json");
        std::fs::write(&path, r#"{"scoring": {"role_weights": {"support": 1.4}}}"#).unwrap();
        let config = BuilderConfig::load(&path).unwrap();
        assert_eq!(config.scoring.role_weight(Some(Role::Support)), 1.4);
        assert_eq!(config.scoring.role_weight(Some(Role::WinCondition)), 1.15);
        assert_eq!(config.scoring.role_weight(Some(Role::Cycle)), 0.95);
    }

    #[test]
    fn malformed_builder_config_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("builder.yaml");
        std::fs::write(&path, "strategy: [oops\n").unwrap();
        assert!(matches!(
            BuilderConfig::load(&path),
            Err(DeckError::Config { .. })
        ));
        assert!(matches!(
            BuilderConfig::load(dir.path().join("missing.yaml")),
            Err(DeckError::Config { .. })
        ));
    }

    #[test]
    fn empty_data_dir_falls_back_to_embedded_tables() {
        let dir = tempfile::tempdir().unwrap();
        let (kb, synergy) = load_knowledge(dir.path()).unwrap();
        assert!(!kb.cards.is_empty());
        assert!(!synergy.pairs.is_empty());
    }
}
