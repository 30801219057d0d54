//! Per-build card candidates derived from progression data and the knowledge base.

use crate::data::analysis::{CardProgression, Rarity};
use crate::data::knowledge::KnowledgeBase;
use crate::deck::role::Role;

/// Elixir assumed for cards the collection and knowledge base both lack.
pub const FALLBACK_ELIXIR: u8 = 4;
pub const MIN_ELIXIR: u8 = 1;
pub const MAX_ELIXIR: u8 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct CardCandidate {
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    pub rarity: Rarity,
    pub elixir: u8,
    pub role: Option<Role>,
    pub evolution_level: u32,
    pub max_evolution_level: u32,
    /// Evolution unlocked by the player and supported by the card.
    pub has_evolution: bool,
    pub score_boost: f64,
    pub score: f64,
}

impl CardCandidate {
    pub fn from_progression(
        name: &str,
        progression: &CardProgression,
        knowledge: &KnowledgeBase,
        evolution_unlocked: bool,
    ) -> Self {
        let max_evolution_level = progression
            .max_evolution_level
            .unwrap_or_else(|| knowledge.max_evolution_level(name));
        Self {
            name: name.to_string(),
            level: progression.level,
            max_level: progression.max_level,
            rarity: progression.rarity,
            elixir: resolve_elixir(name, progression, knowledge),
            role: infer_role(name, knowledge),
            evolution_level: progression.evolution_level.min(max_evolution_level),
            max_evolution_level,
            has_evolution: evolution_unlocked && max_evolution_level > 0,
            score_boost: progression.score_boost.max(0.0),
            score: 0.0,
        }
    }

    pub fn level_ratio(&self) -> f64 {
        level_ratio(
            self.level,
            self.max_level,
            self.evolution_level,
            self.max_evolution_level,
        )
    }

    pub fn fills(&self, role: Role) -> bool {
        self.role == Some(role)
    }
}

/// Collection elixir when positive, else the knowledge-base default, else [FALLBACK_ELIXIR].
pub fn resolve_elixir(name: &str, progression: &CardProgression, knowledge: &KnowledgeBase) -> u8 {
    progression
        .elixir
        .filter(|elixir| *elixir > 0)
        .or_else(|| knowledge.default_elixir(name))
        .unwrap_or(FALLBACK_ELIXIR)
        .clamp(MIN_ELIXIR, MAX_ELIXIR)
}

pub fn infer_role(name: &str, knowledge: &KnowledgeBase) -> Option<Role> {
    knowledge.role_of(name)
}

/// Level progress in [0, 1]. Evolution progress contributes 30% for evolution-capable cards.
pub fn level_ratio(level: u32, max_level: u32, evolution_level: u32, max_evolution_level: u32) -> f64 {
    if max_level == 0 {
        return 0.0;
    }
    let base = f64::from(level) / f64::from(max_level);
    if max_evolution_level == 0 {
        return base;
    }
    let evolution = f64::from(evolution_level.min(max_evolution_level)) / f64::from(max_evolution_level);
    0.7 * base + 0.3 * evolution
}
