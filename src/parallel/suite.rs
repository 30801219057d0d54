//! Build one deck per strategy in parallel.
//!
//! Every build runs on its own clone of the builder, so no synergy cache or
//! other per-build state is shared between threads.

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::data::analysis::CardAnalysis;
use crate::deck::builder::DeckBuilder;
use crate::deck::recommendation::DeckRecommendation;
use crate::deck::strategy::Strategy;
use crate::parallel::pool::WorkerPool;

#[derive(Debug, Clone, Serialize)]
pub struct SuiteEntry {
    pub strategy: Strategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<DeckRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SuiteEntry {
    pub fn is_ok(&self) -> bool {
        self.recommendation.is_some()
    }
}

/// Results keep the order of `strategies`. A failed build is reported in its entry.
pub fn build_suite(
    builder: &DeckBuilder,
    analysis: &CardAnalysis,
    strategies: &[Strategy],
    pool: &WorkerPool,
) -> Vec<SuiteEntry> {
    let entries: Vec<SuiteEntry> = pool.install(|| {
        strategies
            .par_iter()
            .map(|strategy| {
                let mut local = builder.clone();
                local.set_strategy_kind(*strategy);
                match local.build_deck_from_analysis(analysis) {
                    Ok(recommendation) => SuiteEntry {
                        strategy: *strategy,
                        recommendation: Some(recommendation),
                        error: None,
                    },
                    Err(err) => SuiteEntry {
                        strategy: *strategy,
                        recommendation: None,
                        error: Some(err.to_string()),
                    },
                }
            })
            .collect()
    });
    info!(
        strategies = strategies.len(),
        failed = entries.iter().filter(|entry| !entry.is_ok()).count(),
        "strategy suite finished"
    );
    entries
}
