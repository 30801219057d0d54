pub mod builder;
pub mod candidate;
pub mod export_csv;
pub mod recommendation;
pub mod role;
pub mod scoring;
pub mod strategy;
pub mod synergy_cache;
pub mod upgrades;

pub use builder::{BuildContext, DeckBuilder, Pick};
pub use candidate::{level_ratio, resolve_elixir, CardCandidate};
pub use export_csv::export_deck_csv;
pub use recommendation::{load_deck, save_deck, CardDetail, DeckRecommendation};
pub use role::Role;
pub use scoring::{evolution_bonus, ScoringConfig};
pub use strategy::{Strategy, StrategyProfile, DECK_SIZE};
pub use synergy_cache::SynergyCache;
pub use upgrades::{UpgradeRecommendation, UpgradeRecommendations};
