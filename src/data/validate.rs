//! Consistency checks over the card knowledge base and synergy table.

use std::collections::HashSet;
use std::fmt;

use crate::data::knowledge::KnowledgeBase;
use crate::data::synergy::{pair_key, SynergyDatabase};
use crate::deck::candidate::{MAX_ELIXIR, MIN_ELIXIR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

pub fn validate_knowledge_base(kb: &KnowledgeBase, synergy: &SynergyDatabase) -> ValidationReport {
    let mut report = ValidationReport::default();

    if kb.cards.is_empty() {
        report.push(ValidationSeverity::Error, "cards", "card table is empty");
    }
    for (name, card) in &kb.cards {
        let context = format!("cards[{name}]");
        if name.trim().is_empty() {
            report.push(ValidationSeverity::Error, context.clone(), "card name is blank");
        }
        if !(MIN_ELIXIR..=MAX_ELIXIR).contains(&card.elixir) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("elixir {} outside {MIN_ELIXIR}-{MAX_ELIXIR}", card.elixir),
            );
        }
        if card.role.is_none() {
            report.push(
                ValidationSeverity::Info,
                context,
                "no role: card can only fill open slots",
            );
        }
    }

    let mut seen = HashSet::new();
    for (index, pair) in synergy.pairs.iter().enumerate() {
        let context = format!("pairs[{index}] {} + {}", pair.card1, pair.card2);
        if !pair.score.is_finite() || !(0.0..=1.0).contains(&pair.score) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("score {} outside 0-1", pair.score),
            );
        }
        if pair.card1 == pair.card2 {
            report.push(ValidationSeverity::Error, context.clone(), "card paired with itself");
        }
        if !seen.insert(pair_key(&pair.card1, &pair.card2)) {
            report.push(
                ValidationSeverity::Warning,
                context.clone(),
                "duplicate pair, first definition wins",
            );
        }
        for card in [&pair.card1, &pair.card2] {
            if kb.card(card).is_none() {
                report.push(
                    ValidationSeverity::Warning,
                    context.clone(),
                    format!("unknown card '{card}'"),
                );
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::knowledge::CardKnowledge;
    use crate::data::synergy::{SynergyCategory, SynergyPair};
    use crate::deck::role::Role;

    fn pair(a: &str, b: &str, score: f64) -> SynergyPair {
        SynergyPair {
            card1: a.to_string(),
            card2: b.to_string(),
            synergy_type: SynergyCategory::Bait,
            score,
            description: String::new(),
        }
    }

    #[test]
    fn embedded_tables_have_no_errors() {
        let kb = KnowledgeBase::embedded().unwrap();
        let synergy = SynergyDatabase::embedded().unwrap();
        let report = validate_knowledge_base(&kb, &synergy);
        let errors: Vec<String> = report
            .diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
            .map(ToString::to_string)
            .collect();
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn flags_bad_elixir_scores_and_duplicates() {
        let kb = KnowledgeBase::from_cards([
            (
                "Goblins",
                CardKnowledge {
                    role: Some(Role::Cycle),
                    elixir: 2,
                    max_evolution_level: 0,
                },
            ),
            (
                "Broken",
                CardKnowledge {
                    role: None,
                    elixir: 0,
                    max_evolution_level: 0,
                },
            ),
        ]);
        let synergy = SynergyDatabase::from_pairs(vec![
            pair("Goblins", "Broken", 1.5),
            pair("Broken", "Goblins", 0.5),
            pair("Goblins", "Goblins", 0.5),
            pair("Goblins", "Nobody", 0.5),
        ]);
        let report = validate_knowledge_base(&kb, &synergy);
        assert!(report.has_errors());
        // elixir 0, score 1.5, self pair
        assert_eq!(report.count(ValidationSeverity::Error), 3);
        // duplicate + unknown card
        assert_eq!(report.count(ValidationSeverity::Warning), 2);
        assert_eq!(report.count(ValidationSeverity::Info), 1);
    }
}
