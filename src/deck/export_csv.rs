//! CSV export of a deck recommendation: one row per card.

use std::io;

use serde::Serialize;

use crate::deck::recommendation::DeckRecommendation;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct DeckRow<'a> {
    name: &'a str,
    role: &'a str,
    level: u32,
    max_level: u32,
    rarity: &'a str,
    elixir: u8,
    score: f64,
    evolution_slot: bool,
}

/// Header row followed by one row per card in deck order.
pub fn export_deck_csv<W: io::Write>(recommendation: &DeckRecommendation, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for detail in &recommendation.deck_detail {
        out.serialize(DeckRow {
            name: &detail.name,
            role: detail.role.map(|role| role.as_str()).unwrap_or(""),
            level: detail.level,
            max_level: detail.max_level,
            rarity: detail.rarity.as_str(),
            elixir: detail.elixir,
            score: detail.score,
            evolution_slot: recommendation.has_evolution_slot(&detail.name),
        })?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}
