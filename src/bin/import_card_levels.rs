//! Import a card-level CSV export into an analysis JSON document.
//! Usage: import_card_levels <card_levels.csv> [output.json] [--tag TAG] [--name NAME]
//! CSV columns (header row required): name, level, max_level, rarity,
//! and optionally elixir, evolution_level, max_evolution_level.
//! Without an output path the document is written to
//! data/analysis/<YYYYmmdd_HHMMSS>_analysis_<TAG>.json.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crownforge::data::analysis::{CardAnalysis, CardProgression, Rarity};
use crownforge::data::player_tag::sanitize_player_tag;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    level: u32,
    max_level: u32,
    rarity: String,
    #[serde(default)]
    elixir: Option<u8>,
    #[serde(default)]
    evolution_level: Option<u32>,
    #[serde(default)]
    max_evolution_level: Option<u32>,
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
        .cloned()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let Some(input_path) = args.get(1).filter(|arg| !arg.starts_with("--")) else {
        return Err("usage: import_card_levels <card_levels.csv> [output.json] [--tag TAG] [--name NAME]".into());
    };
    let tag = flag_value(&args, "--tag")
        .map(|raw| sanitize_player_tag(&raw))
        .transpose()?;

    let csv_content = fs::read_to_string(input_path).map_err(|e| {
        format!(
            "Read {input_path}: {e}. Expected columns: name, level, max_level, rarity[, elixir, evolution_level, max_evolution_level]"
        )
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_content.as_bytes());
    let mut card_levels = BTreeMap::new();
    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let name = row.name.trim().to_string();
        if name.is_empty() {
            continue;
        }
        let rarity = Rarity::parse_loose(&row.rarity)
            .ok_or_else(|| format!("row {}: unknown rarity '{}'", line + 2, row.rarity))?;
        let mut progression = CardProgression::new(row.level, row.max_level, rarity);
        progression.elixir = row.elixir.filter(|elixir| *elixir > 0);
        progression.evolution_level = row.evolution_level.unwrap_or(0);
        progression.max_evolution_level = row.max_evolution_level;
        card_levels.insert(name, progression);
    }

    let now = chrono::Local::now();
    let analysis = CardAnalysis {
        card_levels,
        analysis_time: Some(now.to_rfc3339()),
        player_name: flag_value(&args, "--name"),
        player_tag: tag.clone(),
    };

    let output_path = match args.get(2).filter(|arg| !arg.starts_with("--")) {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from("data/analysis").join(format!(
            "{}_analysis_{}.json",
            now.format("%Y%m%d_%H%M%S"),
            tag.as_deref().unwrap_or("UNKNOWN")
        )),
    };
    if let Some(parent) = output_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_path, serde_json::to_string_pretty(&analysis)?)?;
    println!(
        "Wrote {} cards to {}",
        analysis.card_levels.len(),
        output_path.display()
    );
    Ok(())
}
