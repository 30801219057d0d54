//! Named deck strategies: role quotas, elixir target range and role multipliers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::deck::role::{Role, SELECTION_ORDER};
use crate::error::DeckError;

pub const DECK_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Balanced,
    Aggro,
    Control,
    Cycle,
    Splash,
    Spell,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::Balanced,
        Strategy::Aggro,
        Strategy::Control,
        Strategy::Cycle,
        Strategy::Splash,
        Strategy::Spell,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Aggro => "aggro",
            Self::Control => "control",
            Self::Cycle => "cycle",
            Self::Splash => "splash",
            Self::Spell => "spell",
        }
    }

    pub fn profile(self) -> StrategyProfile {
        StrategyProfile::for_strategy(self)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = DeckError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let name = raw.trim().to_ascii_lowercase();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == name)
            .ok_or_else(|| DeckError::InvalidStrategy(raw.to_string()))
    }
}

/// Per-role card counts, indexed by [Role::priority].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleQuotas([u8; 6]);

impl RoleQuotas {
    /// Quotas listed in selection order (win condition first, cycle last).
    pub const fn new(in_selection_order: [u8; 6]) -> Self {
        Self(in_selection_order)
    }

    pub fn get(&self, role: Role) -> usize {
        usize::from(self.0[role.priority()])
    }

    pub fn total(&self) -> usize {
        self.0.iter().map(|count| usize::from(*count)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, usize)> + '_ {
        SELECTION_ORDER.iter().map(move |role| (*role, self.get(*role)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyProfile {
    pub strategy: Strategy,
    pub elixir_min: f64,
    pub elixir_max: f64,
    /// Weight of the in-range elixir fit term. Zero disables range biasing.
    pub range_pressure: f64,
    pub quotas: RoleQuotas,
    role_multipliers: [f64; 6],
}

impl StrategyProfile {
    pub fn for_strategy(strategy: Strategy) -> Self {
        // multipliers in selection order: WC, Bld, SpBig, Sup, SpSmall, Cyc
        let (quotas, range, pressure, multipliers) = match strategy {
            Strategy::Balanced => (
                [1, 1, 1, 2, 1, 2],
                (3.0, 3.5),
                0.0,
                [1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            ),
            Strategy::Aggro => (
                [2, 0, 1, 3, 1, 1],
                (3.5, 4.0),
                0.1,
                [2.0, 0.3, 1.0, 1.2, 1.0, 1.0],
            ),
            Strategy::Control => (
                [1, 2, 2, 2, 0, 1],
                (3.5, 4.2),
                0.1,
                [0.5, 2.0, 1.5, 1.0, 0.3, 0.5],
            ),
            Strategy::Cycle => (
                [1, 1, 0, 1, 1, 4],
                (2.5, 3.0),
                0.3,
                [1.0, 1.0, 0.3, 1.0, 1.2, 2.0],
            ),
            Strategy::Splash => (
                [1, 1, 1, 3, 1, 1],
                (3.2, 3.8),
                0.1,
                [1.0, 1.0, 1.2, 2.0, 1.0, 0.5],
            ),
            Strategy::Spell => (
                [1, 0, 2, 3, 1, 1],
                (3.2, 3.8),
                0.1,
                [1.0, 0.1, 2.0, 1.0, 1.5, 1.0],
            ),
        };
        Self {
            strategy,
            elixir_min: range.0,
            elixir_max: range.1,
            range_pressure: pressure,
            quotas: RoleQuotas::new(quotas),
            role_multipliers: multipliers,
        }
    }

    /// Strategy multiplier for a role; role-less cards are neutral.
    pub fn role_multiplier(&self, role: Option<Role>) -> f64 {
        role.map(|role| self.role_multipliers[role.priority()])
            .unwrap_or(1.0)
    }

    pub fn contains_elixir(&self, average: f64, tolerance: f64) -> bool {
        average >= self.elixir_min - tolerance && average <= self.elixir_max + tolerance
    }

    /// How far `average` lies outside the target range; 0 inside it.
    pub fn elixir_distance(&self, average: f64) -> f64 {
        if average > self.elixir_max {
            average - self.elixir_max
        } else if average < self.elixir_min {
            self.elixir_min - average
        } else {
            0.0
        }
    }

    /// 1.0 inside the target range, decaying linearly to 0 over [RANGE_FALLOFF] elixir.
    /// Distance below the range counts half as much as distance above it.
    pub fn range_fit(&self, elixir: f64) -> f64 {
        let distance = if elixir > self.elixir_max {
            elixir - self.elixir_max
        } else if elixir < self.elixir_min {
            (self.elixir_min - elixir) * 0.5
        } else {
            0.0
        };
        (1.0 - distance / RANGE_FALLOFF).clamp(0.0, 1.0)
    }
}

pub const RANGE_FALLOFF: f64 = 3.0;

impl Default for StrategyProfile {
    fn default() -> Self {
        Self::for_strategy(Strategy::Balanced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_strategy_fills_a_full_deck() {
        for strategy in Strategy::ALL {
            let profile = strategy.profile();
            assert_eq!(profile.quotas.total(), DECK_SIZE, "{strategy}");
            assert!(profile.elixir_min < profile.elixir_max);
        }
    }

    #[test]
    fn spell_strategy_drops_buildings() {
        let profile = Strategy::Spell.profile();
        assert_eq!(profile.quotas.get(Role::SpellBig), 2);
        assert_eq!(profile.quotas.get(Role::Building), 0);
    }

    #[test]
    fn control_skips_small_spells() {
        let profile = Strategy::Control.profile();
        assert_eq!(profile.quotas.get(Role::SpellSmall), 0);
        assert_eq!(profile.quotas.get(Role::Building), 2);
    }

    #[test]
    fn parse_is_case_insensitive_and_trimmed() {
        assert_eq!(" Cycle ".parse::<Strategy>().unwrap(), Strategy::Cycle);
        assert_eq!("SPELL".parse::<Strategy>().unwrap(), Strategy::Spell);
        assert!(matches!(
            "turbo".parse::<Strategy>(),
            Err(DeckError::InvalidStrategy(_))
        ));
    }

    #[test]
    fn range_fit_penalizes_expensive_cards_more() {
        let profile = Strategy::Cycle.profile();
        assert_eq!(profile.range_fit(2.7), 1.0);
        let above = profile.range_fit(4.0);
        let below = profile.range_fit(1.5);
        assert!(above < below);
        assert_eq!(profile.range_fit(9.0), 0.0);
    }

    #[test]
    fn elixir_distance_is_zero_inside_range() {
        let profile = Strategy::Cycle.profile();
        assert_eq!(profile.elixir_distance(2.75), 0.0);
        assert!((profile.elixir_distance(3.125) - 0.125).abs() < 1e-12);
        assert!((profile.elixir_distance(2.25) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn aggro_prefers_win_conditions() {
        let profile = Strategy::Aggro.profile();
        assert_eq!(profile.role_multiplier(Some(Role::WinCondition)), 2.0);
        assert_eq!(profile.role_multiplier(None), 1.0);
    }
}
