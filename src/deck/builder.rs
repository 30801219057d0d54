//! Greedy role-quota deck assembly.
//!
//! Candidates are filled role by role in [SELECTION_ORDER] up to the active
//! strategy's quota, then any open slots are filled with the best remaining
//! cards regardless of role. A single same-role swap may follow to pull the
//! average elixir toward the strategy's target range, and evolution slots are
//! annotated last.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::BuilderConfig;
use crate::data::analysis::{load_analysis, CardAnalysis};
use crate::data::knowledge::KnowledgeBase;
use crate::data::loader::normalize_lookup;
use crate::data::synergy::SynergyDatabase;
use crate::deck::candidate::CardCandidate;
use crate::deck::recommendation::{average_elixir, CardDetail, DeckRecommendation};
use crate::deck::role::{priority_of, Role, SELECTION_ORDER};
use crate::deck::scoring::ScoringConfig;
use crate::deck::strategy::{Strategy, StrategyProfile, DECK_SIZE};
use crate::deck::synergy_cache::SynergyCache;
use crate::error::{DeckError, Result};

pub const DEFAULT_SYNERGY_WEIGHT: f64 = 0.15;
pub const DEFAULT_EVOLUTION_SLOT_LIMIT: usize = 2;
/// Allowed distance outside the strategy range before a corrective swap.
pub const ELIXIR_TOLERANCE: f64 = 0.1;
/// A corrective swap may not drop the deck's total score below this share.
pub const SWAP_SCORE_FLOOR: f64 = 0.85;
const HIGH_ELIXIR_NOTE: f64 = 3.8;
const LOW_ELIXIR_NOTE: f64 = 2.8;

/// Deck recommendation engine. Configuration lives here; all per-build state
/// (synergy cache, used cards, partial deck) lives in a [BuildContext].
#[derive(Debug, Clone)]
pub struct DeckBuilder {
    knowledge: Arc<KnowledgeBase>,
    synergy: Arc<SynergyDatabase>,
    profile: StrategyProfile,
    scoring: ScoringConfig,
    synergy_enabled: bool,
    synergy_weight: f64,
    /// Normalized card names.
    unlocked_evolutions: HashSet<String>,
    evolution_slot_limit: usize,
    include_cards: Vec<String>,
    /// Normalized card names.
    exclude_cards: HashSet<String>,
}

/// Candidate chosen by a selection pass: index into the candidate list and
/// the score it was chosen with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick {
    pub index: usize,
    pub score: f64,
}

impl DeckBuilder {
    pub fn new(knowledge: Arc<KnowledgeBase>, synergy: Arc<SynergyDatabase>) -> Self {
        Self {
            knowledge,
            synergy,
            profile: StrategyProfile::default(),
            scoring: ScoringConfig::default(),
            synergy_enabled: false,
            synergy_weight: DEFAULT_SYNERGY_WEIGHT,
            unlocked_evolutions: HashSet::new(),
            evolution_slot_limit: DEFAULT_EVOLUTION_SLOT_LIMIT,
            include_cards: Vec::new(),
            exclude_cards: HashSet::new(),
        }
    }

    /// Builder over the embedded card and synergy tables.
    pub fn with_embedded_data() -> Result<Self> {
        Ok(Self::new(
            Arc::new(KnowledgeBase::embedded()?),
            Arc::new(SynergyDatabase::embedded()?),
        ))
    }

    pub fn from_config(
        knowledge: Arc<KnowledgeBase>,
        synergy: Arc<SynergyDatabase>,
        config: &BuilderConfig,
    ) -> Result<Self> {
        let mut builder = Self::new(knowledge, synergy);
        builder.set_strategy_kind(config.strategy);
        builder.set_synergy_enabled(config.synergy_enabled);
        builder.set_synergy_weight(config.synergy_weight)?;
        builder.set_unlocked_evolutions(&config.unlocked_evolutions);
        builder.set_evolution_slot_limit(config.evolution_slot_limit);
        builder.set_include_cards(&config.include_cards);
        builder.set_exclude_cards(&config.exclude_cards);
        builder.set_scoring_config(config.scoring.clone())?;
        Ok(builder)
    }

    pub fn strategy(&self) -> Strategy {
        self.profile.strategy
    }

    pub fn profile(&self) -> &StrategyProfile {
        &self.profile
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn synergy_database(&self) -> &SynergyDatabase {
        &self.synergy
    }

    pub fn scoring_config(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Select a strategy by name. On error the current strategy is kept.
    pub fn set_strategy(&mut self, name: &str) -> Result<()> {
        let strategy: Strategy = name.parse()?;
        self.set_strategy_kind(strategy);
        Ok(())
    }

    pub fn set_strategy_kind(&mut self, strategy: Strategy) {
        self.profile = strategy.profile();
    }

    pub fn set_synergy_enabled(&mut self, enabled: bool) {
        self.synergy_enabled = enabled;
    }

    pub fn synergy_enabled(&self) -> bool {
        self.synergy_enabled
    }

    /// Clamped to [0, 1]. Non-finite weights are rejected and leave the weight unchanged.
    pub fn set_synergy_weight(&mut self, weight: f64) -> Result<()> {
        if !weight.is_finite() {
            return Err(DeckError::InvalidWeight(weight));
        }
        self.synergy_weight = weight.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn synergy_weight(&self) -> f64 {
        self.synergy_weight
    }

    pub fn set_unlocked_evolutions<I, S>(&mut self, cards: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.unlocked_evolutions = cards
            .into_iter()
            .map(|card| normalize_lookup(card.as_ref()))
            .filter(|key| !key.is_empty())
            .collect();
    }

    pub fn is_evolution_unlocked(&self, name: &str) -> bool {
        self.unlocked_evolutions.contains(&normalize_lookup(name))
    }

    /// Zero disables evolution slots.
    pub fn set_evolution_slot_limit(&mut self, limit: usize) {
        self.evolution_slot_limit = limit;
    }

    pub fn evolution_slot_limit(&self) -> usize {
        self.evolution_slot_limit
    }

    pub fn set_include_cards<I, S>(&mut self, cards: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.include_cards = cards
            .into_iter()
            .map(|card| card.as_ref().trim().to_string())
            .filter(|card| !card.is_empty())
            .collect();
    }

    pub fn set_exclude_cards<I, S>(&mut self, cards: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_cards = cards
            .into_iter()
            .map(|card| normalize_lookup(card.as_ref()))
            .filter(|key| !key.is_empty())
            .collect();
    }

    pub fn set_scoring_config(&mut self, scoring: ScoringConfig) -> Result<()> {
        scoring.validate().map_err(DeckError::InvalidScoring)?;
        self.scoring = scoring;
        Ok(())
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude_cards.contains(&normalize_lookup(name))
    }

    fn is_included(&self, name: &str) -> bool {
        let key = normalize_lookup(name);
        self.include_cards
            .iter()
            .any(|card| normalize_lookup(card) == key)
    }

    /// One scored candidate per card in the analysis, minus excluded cards.
    /// Order follows the analysis map (card name order), which breaks score ties.
    pub fn build_candidates(&self, analysis: &CardAnalysis) -> Vec<CardCandidate> {
        analysis
            .card_levels
            .iter()
            .filter(|(name, _)| !self.is_excluded(name))
            .map(|(name, progression)| {
                let mut candidate = CardCandidate::from_progression(
                    name,
                    progression,
                    &self.knowledge,
                    self.is_evolution_unlocked(name),
                );
                candidate.score = self.scoring.base_score(&candidate, &self.profile);
                candidate
            })
            .collect()
    }

    /// Fresh per-build state with an empty synergy cache.
    pub fn context(&self) -> BuildContext<'_> {
        BuildContext {
            builder: self,
            cache: SynergyCache::new(),
        }
    }

    pub fn build_deck_from_file(&self, path: impl AsRef<Path>) -> Result<DeckRecommendation> {
        let analysis = load_analysis(path)?;
        self.build_deck_from_analysis(&analysis)
    }

    pub fn build_deck_from_analysis(&self, analysis: &CardAnalysis) -> Result<DeckRecommendation> {
        let candidates = self.build_candidates(analysis);
        if candidates.is_empty() {
            return Err(DeckError::InsufficientCandidates {
                found: 0,
                required: DECK_SIZE,
            });
        }

        let mut ctx = self.context();
        let mut deck: Vec<CardCandidate> = Vec::with_capacity(DECK_SIZE);
        let mut used: HashSet<String> = HashSet::new();
        let mut notes: Vec<String> = Vec::new();

        for wanted in &self.include_cards {
            if deck.len() >= DECK_SIZE {
                break;
            }
            let key = normalize_lookup(wanted);
            let found = candidates
                .iter()
                .position(|card| normalize_lookup(&card.name) == key && !used.contains(&card.name));
            match found {
                Some(index) => {
                    let score = ctx.effective_score(&candidates[index], &deck);
                    commit(&candidates, Pick { index, score }, &mut deck, &mut used);
                }
                None => {
                    warn!(card = %wanted, "included card not available");
                    notes.push(format!("Included card {wanted} is not in the collection"));
                }
            }
        }

        for role in SELECTION_ORDER {
            let quota = self.profile.quotas.get(role);
            let mut filled = deck.iter().filter(|card| card.fills(role)).count();
            while filled < quota && deck.len() < DECK_SIZE {
                let Some(pick) = ctx.pick_best(role, &candidates, &used, &deck) else {
                    debug!(%role, filled, quota, "role quota left open");
                    break;
                };
                debug!(%role, card = %candidates[pick.index].name, score = pick.score, "picked");
                commit(&candidates, pick, &mut deck, &mut used);
                filled += 1;
            }
        }

        while deck.len() < DECK_SIZE {
            let Some(pick) = ctx.pick_any(&candidates, &used, &deck) else {
                break;
            };
            debug!(card = %candidates[pick.index].name, score = pick.score, "fallback fill");
            commit(&candidates, pick, &mut deck, &mut used);
        }

        if deck.len() < DECK_SIZE {
            notes.push(format!(
                "Only {} of {DECK_SIZE} cards could be selected from the collection",
                deck.len()
            ));
        }

        if let Some(note) = self.correct_elixir(&mut ctx, &candidates, &mut deck, &mut used) {
            notes.push(note);
        }

        let evolution_slots = self.select_evolution_slots(&deck);
        let average = average_elixir(&deck);
        notes.extend(self.strategic_notes(&deck, average));
        if !evolution_slots.is_empty() {
            notes.push(format!("Evolution slots: {}", evolution_slots.join(", ")));
        }

        info!(
            strategy = %self.strategy(),
            cards = deck.len(),
            average_elixir = average,
            synergy_lookups = ctx.synergy_cache().len(),
            "deck built"
        );

        Ok(DeckRecommendation {
            deck: deck.iter().map(|card| card.name.clone()).collect(),
            deck_detail: deck.iter().map(CardDetail::from).collect(),
            average_elixir: average,
            strategy: Some(self.strategy()),
            analysis_time: analysis.analysis_time.clone(),
            evolution_slots,
            notes,
        })
    }

    /// Deck cards with an unlocked evolution, ranked by role priority then score,
    /// truncated to the slot limit. Never changes deck membership.
    pub fn select_evolution_slots(&self, deck: &[CardCandidate]) -> Vec<String> {
        if self.evolution_slot_limit == 0 {
            return Vec::new();
        }
        let mut eligible: Vec<&CardCandidate> = deck
            .iter()
            .filter(|card| card.has_evolution && card.max_evolution_level > 0)
            .collect();
        eligible.sort_by(|a, b| {
            priority_of(a.role)
                .cmp(&priority_of(b.role))
                .then_with(|| b.score.total_cmp(&a.score))
        });
        eligible
            .into_iter()
            .take(self.evolution_slot_limit)
            .map(|card| card.name.clone())
            .collect()
    }

    /// At most one same-role swap that moves the average elixir strictly closer to the
    /// strategy's range while keeping the deck total above [SWAP_SCORE_FLOOR].
    fn correct_elixir(
        &self,
        ctx: &mut BuildContext<'_>,
        candidates: &[CardCandidate],
        deck: &mut [CardCandidate],
        used: &mut HashSet<String>,
    ) -> Option<String> {
        if deck.is_empty() {
            return None;
        }
        let total_elixir: u32 = deck.iter().map(|card| u32::from(card.elixir)).sum();
        let size = deck.len() as f64;
        let average = f64::from(total_elixir) / size;
        if self.profile.contains_elixir(average, ELIXIR_TOLERANCE) {
            return None;
        }
        let current_distance = self.profile.elixir_distance(average);
        let too_high = average > self.profile.elixir_max;
        let original_total: f64 = deck.iter().map(|card| card.score).sum();

        let mut order: Vec<usize> = (0..deck.len()).collect();
        if too_high {
            order.sort_by(|a, b| deck[*b].elixir.cmp(&deck[*a].elixir));
        } else {
            order.sort_by(|a, b| deck[*a].elixir.cmp(&deck[*b].elixir));
        }

        for position in order {
            let current = deck[position].clone();
            let Some(role) = current.role else {
                continue;
            };
            if self.is_included(&current.name) {
                continue;
            }
            let others: Vec<CardCandidate> = deck
                .iter()
                .enumerate()
                .filter(|(index, _)| *index != position)
                .map(|(_, card)| card.clone())
                .collect();

            let mut best: Option<Pick> = None;
            for (index, alternative) in candidates.iter().enumerate() {
                if used.contains(&alternative.name) || !alternative.fills(role) {
                    continue;
                }
                // the swapped deck must land strictly closer to the range
                let swapped_total =
                    total_elixir - u32::from(current.elixir) + u32::from(alternative.elixir);
                let swapped_average = f64::from(swapped_total) / size;
                if self.profile.elixir_distance(swapped_average) >= current_distance {
                    continue;
                }
                let score = ctx.effective_score(alternative, &others);
                if original_total - current.score + score < SWAP_SCORE_FLOOR * original_total {
                    continue;
                }
                if best.map_or(true, |best| score > best.score) {
                    best = Some(Pick { index, score });
                }
            }

            if let Some(pick) = best {
                let mut replacement = candidates[pick.index].clone();
                replacement.score = pick.score;
                let note = format!(
                    "Swapped {} ({} elixir) for {} ({} elixir) to move average elixir toward {:.1}-{:.1}",
                    current.name,
                    current.elixir,
                    replacement.name,
                    replacement.elixir,
                    self.profile.elixir_min,
                    self.profile.elixir_max
                );
                debug!(removed = %current.name, added = %replacement.name, "elixir correction");
                used.remove(&current.name);
                used.insert(replacement.name.clone());
                deck[position] = replacement;
                return Some(note);
            }
        }
        None
    }

    fn strategic_notes(&self, deck: &[CardCandidate], average: f64) -> Vec<String> {
        let mut notes = Vec::new();
        let has = |role: Role| deck.iter().any(|card| card.fills(role));
        if !has(Role::WinCondition) {
            notes.push("No win condition selected: the deck may struggle to damage towers".to_string());
        }
        if !has(Role::Building) && self.profile.quotas.get(Role::Building) > 0 {
            notes.push("No defensive building: consider one against hog and giant pushes".to_string());
        }
        if !deck.iter().any(|card| card.role.is_some_and(Role::is_spell)) {
            notes.push("No spell selected: swarms and finishing damage will be hard to handle".to_string());
        }
        if average > HIGH_ELIXIR_NOTE {
            notes.push(format!("High average elixir ({average:.2}): play patiently and build pushes"));
        } else if average > 0.0 && average < LOW_ELIXIR_NOTE {
            notes.push(format!("Low average elixir ({average:.2}): cycle quickly and out-rotate counters"));
        }
        notes
    }
}

fn commit(
    candidates: &[CardCandidate],
    pick: Pick,
    deck: &mut Vec<CardCandidate>,
    used: &mut HashSet<String>,
) {
    let mut card = candidates[pick.index].clone();
    card.score = pick.score;
    used.insert(card.name.clone());
    deck.push(card);
}

/// Per-build selection state. Dropping it discards the synergy cache.
#[derive(Debug)]
pub struct BuildContext<'b> {
    builder: &'b DeckBuilder,
    cache: SynergyCache,
}

impl<'b> BuildContext<'b> {
    pub fn synergy_cache(&self) -> &SynergyCache {
        &self.cache
    }

    /// Weighted synergy against the partial deck; 0 when disabled or the deck is empty.
    pub fn synergy_bonus(&mut self, name: &str, partial_deck: &[CardCandidate]) -> f64 {
        if !self.builder.synergy_enabled || partial_deck.is_empty() {
            return 0.0;
        }
        let raw = self
            .cache
            .calculate_synergy_score(&self.builder.synergy, name, partial_deck);
        raw * self.builder.synergy_weight
    }

    pub fn effective_score(&mut self, candidate: &CardCandidate, partial_deck: &[CardCandidate]) -> f64 {
        candidate.score + self.synergy_bonus(&candidate.name, partial_deck)
    }

    /// Best unused candidate filling `role`. Ties keep the earliest candidate.
    pub fn pick_best(
        &mut self,
        role: Role,
        candidates: &[CardCandidate],
        used: &HashSet<String>,
        partial_deck: &[CardCandidate],
    ) -> Option<Pick> {
        self.pick_where(candidates, used, partial_deck, |card| card.fills(role))
    }

    /// Best unused candidate of any role, including cards without one.
    pub fn pick_any(
        &mut self,
        candidates: &[CardCandidate],
        used: &HashSet<String>,
        partial_deck: &[CardCandidate],
    ) -> Option<Pick> {
        self.pick_where(candidates, used, partial_deck, |_| true)
    }

    fn pick_where<F>(
        &mut self,
        candidates: &[CardCandidate],
        used: &HashSet<String>,
        partial_deck: &[CardCandidate],
        eligible: F,
    ) -> Option<Pick>
    where
        F: Fn(&CardCandidate) -> bool,
    {
        let mut best: Option<Pick> = None;
        for (index, candidate) in candidates.iter().enumerate() {
            if used.contains(&candidate.name) || !eligible(candidate) {
                continue;
            }
            let score = self.effective_score(candidate, partial_deck);
            if best.map_or(true, |best| score > best.score) {
                best = Some(Pick { index, score });
            }
        }
        best
    }
}
