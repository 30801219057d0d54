//! Candidate scoring model.
//!
//! ```text
//! score = (levelRatio * k_level * roleWeight * strategyMultiplier
//!          + elixirTerm + k_base + evolutionBonus) * (1 + scoreBoost)
//!       + synergyBonus
//! ```
//! The synergy bonus depends on the partial deck and is added by the builder.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::data::loader::parse_document;
use crate::deck::candidate::CardCandidate;
use crate::deck::role::Role;
use crate::deck::strategy::StrategyProfile;
use crate::error::{DeckError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub k_level: f64,
    pub k_elixir: f64,
    pub k_base: f64,
    pub ideal_elixir: f64,
    pub elixir_spread: f64,
    pub evo_base: f64,
    pub evo_level_scaling: f64,
    /// Entries given in a file override the default table one role at a time.
    #[serde(deserialize_with = "merge_role_weights")]
    pub role_weights: BTreeMap<Role, f64>,
    /// Weight for cards without a role and for roles missing from `role_weights`.
    pub default_role_weight: f64,
    /// Extra factor on the evolution bonus per role. Missing roles are neutral.
    pub evolution_role_multipliers: BTreeMap<Role, f64>,
}

fn default_role_weights() -> BTreeMap<Role, f64> {
    BTreeMap::from([
        (Role::WinCondition, 1.15),
        (Role::Building, 1.1),
        (Role::SpellBig, 1.05),
        (Role::SpellSmall, 1.0),
        (Role::Support, 1.0),
        (Role::Cycle, 0.95),
    ])
}

fn merge_role_weights<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<Role, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = BTreeMap::<Role, f64>::deserialize(deserializer)?;
    let mut weights = default_role_weights();
    weights.extend(overrides);
    Ok(weights)
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            k_level: 1.2,
            k_elixir: 0.15,
            k_base: 0.05,
            ideal_elixir: 3.0,
            elixir_spread: 9.0,
            evo_base: 0.12,
            evo_level_scaling: 0.2,
            role_weights: default_role_weights(),
            default_role_weight: 1.0,
            evolution_role_multipliers: BTreeMap::new(),
        }
    }
}

impl ScoringConfig {
    /// Load tuning from a JSON or YAML file. Fields left out keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| DeckError::Config {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        let config: Self = parse_document(&raw, path).map_err(DeckError::into_config)?;
        config.validate().map_err(|message| DeckError::Config {
            path: path.display().to_string(),
            message,
        })?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        let scalars = [
            ("k_level", self.k_level),
            ("k_elixir", self.k_elixir),
            ("k_base", self.k_base),
            ("ideal_elixir", self.ideal_elixir),
            ("evo_base", self.evo_base),
            ("evo_level_scaling", self.evo_level_scaling),
            ("default_role_weight", self.default_role_weight),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        if !(self.elixir_spread.is_finite() && self.elixir_spread > 0.0) {
            return Err(format!("elixir_spread must be positive, got {}", self.elixir_spread));
        }
        let tables = self
            .role_weights
            .iter()
            .chain(self.evolution_role_multipliers.iter());
        for (role, value) in tables {
            if !value.is_finite() || *value < 0.0 {
                return Err(format!("weight for {role} must be non-negative, got {value}"));
            }
        }
        Ok(())
    }

    pub fn role_weight(&self, role: Option<Role>) -> f64 {
        role.and_then(|role| self.role_weights.get(&role).copied())
            .unwrap_or(self.default_role_weight)
    }

    pub fn evolution_role_multiplier(&self, role: Option<Role>) -> f64 {
        role.and_then(|role| self.evolution_role_multipliers.get(&role).copied())
            .unwrap_or(1.0)
    }

    /// Closeness to the ideal elixir plus the strategy's range pressure. Never negative.
    pub fn elixir_term(&self, elixir: u8, profile: &StrategyProfile) -> f64 {
        let elixir = f64::from(elixir);
        let closeness = (1.0 - (elixir - self.ideal_elixir).abs() / self.elixir_spread).clamp(0.0, 1.0);
        self.k_elixir * closeness + profile.range_pressure * profile.range_fit(elixir)
    }

    /// Score of a candidate on its own, before any synergy with the partial deck.
    pub fn base_score(&self, candidate: &CardCandidate, profile: &StrategyProfile) -> f64 {
        let level_term = candidate.level_ratio()
            * self.k_level
            * self.role_weight(candidate.role)
            * profile.role_multiplier(candidate.role);
        let evolution = evolution_bonus(
            self,
            candidate.has_evolution,
            candidate.level,
            candidate.max_level,
            candidate.max_evolution_level,
            candidate.role,
        );
        let score = level_term + self.elixir_term(candidate.elixir, profile) + self.k_base + evolution;
        score * (1.0 + candidate.score_boost)
    }
}

/// Bonus for cards whose evolution the player has unlocked.
/// Non-decreasing in `level` and in `max_evolution_level`.
pub fn evolution_bonus(
    config: &ScoringConfig,
    unlocked: bool,
    level: u32,
    max_level: u32,
    max_evolution_level: u32,
    role: Option<Role>,
) -> f64 {
    if !unlocked || max_evolution_level == 0 || level == 0 || max_level == 0 {
        return 0.0;
    }
    let ratio = (f64::from(level) / f64::from(max_level)).min(1.0);
    let depth = 1.0 + config.evo_level_scaling * f64::from(max_evolution_level - 1);
    config.evo_base * ratio.powf(1.5) * depth * config.evolution_role_multiplier(role)
}
