//! Memoized pairwise synergy lookups, scoped to a single deck build.

use std::collections::HashMap;

use crate::data::synergy::{pair_key, SynergyDatabase};
use crate::deck::candidate::CardCandidate;

#[derive(Debug, Clone, Default)]
pub struct SynergyCache {
    entries: HashMap<(String, String), f64>,
}

impl SynergyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached synergy for an unordered pair; `(a, b)` and `(b, a)` share one entry.
    pub fn get_cached_synergy(&mut self, db: &SynergyDatabase, a: &str, b: &str) -> f64 {
        *self
            .entries
            .entry(pair_key(a, b))
            .or_insert_with(|| db.get_synergy(a, b))
    }

    /// Average of the positive pair scores between `card_name` and the partial deck.
    /// 0 for an empty deck or when no pairs are known.
    pub fn calculate_synergy_score(
        &mut self,
        db: &SynergyDatabase,
        card_name: &str,
        partial_deck: &[CardCandidate],
    ) -> f64 {
        let mut total = 0.0;
        let mut pairs = 0usize;
        for card in partial_deck {
            let synergy = self.get_cached_synergy(db, card_name, &card.name);
            if synergy > 0.0 {
                total += synergy;
                pairs += 1;
            }
        }
        if pairs == 0 {
            0.0
        } else {
            total / pairs as f64
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
