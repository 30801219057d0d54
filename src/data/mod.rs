pub mod analysis;
pub mod knowledge;
pub mod loader;
pub mod player_tag;
pub mod synergy;
pub mod validate;

pub use analysis::{load_analysis, load_latest_analysis, CardAnalysis, CardProgression, Rarity};
pub use knowledge::{CardKnowledge, KnowledgeBase};
pub use player_tag::sanitize_player_tag;
pub use synergy::{DeckSynergyAnalysis, SynergyCategory, SynergyDatabase, SynergyPair};
