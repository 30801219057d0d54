//! Card roles and the fixed selection priority between them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "win_conditions", alias = "win_condition", alias = "WinCondition")]
    WinCondition,
    #[serde(rename = "buildings", alias = "building", alias = "Building")]
    Building,
    #[serde(rename = "spells_big", alias = "spell_big", alias = "SpellBig")]
    SpellBig,
    #[serde(rename = "spells_small", alias = "spell_small", alias = "SpellSmall")]
    SpellSmall,
    #[serde(rename = "support", alias = "Support")]
    Support,
    #[serde(rename = "cycle", alias = "Cycle")]
    Cycle,
}

/// Order in which role quotas are filled. Also the evolution-slot priority.
pub const SELECTION_ORDER: [Role; 6] = [
    Role::WinCondition,
    Role::Building,
    Role::SpellBig,
    Role::Support,
    Role::SpellSmall,
    Role::Cycle,
];

/// Rank used for role-less cards when sorting by priority.
pub const UNRANKED_PRIORITY: usize = SELECTION_ORDER.len();

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WinCondition => "win_conditions",
            Self::Building => "buildings",
            Self::SpellBig => "spells_big",
            Self::SpellSmall => "spells_small",
            Self::Support => "support",
            Self::Cycle => "cycle",
        }
    }

    /// Position in [SELECTION_ORDER]; 0 is the most important role.
    pub fn priority(self) -> usize {
        SELECTION_ORDER
            .iter()
            .position(|role| *role == self)
            .unwrap_or(UNRANKED_PRIORITY)
    }

    pub fn is_spell(self) -> bool {
        matches!(self, Self::SpellBig | Self::SpellSmall)
    }
}

/// Priority of an optional role; cards without a role sort last.
pub fn priority_of(role: Option<Role>) -> usize {
    role.map(Role::priority).unwrap_or(UNRANKED_PRIORITY)
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key: String = raw
            .trim()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "winconditions" | "wincondition" | "wc" => Ok(Self::WinCondition),
            "buildings" | "building" => Ok(Self::Building),
            "spellsbig" | "spellbig" | "bigspell" => Ok(Self::SpellBig),
            "spellssmall" | "spellsmall" | "smallspell" => Ok(Self::SpellSmall),
            "support" => Ok(Self::Support),
            "cycle" => Ok(Self::Cycle),
            _ => Err(format!("unknown role '{raw}'")),
        }
    }
}
