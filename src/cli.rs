use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::config::{self, split_card_list, BuilderConfig};
use crate::data::analysis::{load_analysis, CardAnalysis};
use crate::data::knowledge::KnowledgeBase;
use crate::data::synergy::SynergyDatabase;
use crate::data::validate::validate_knowledge_base;
use crate::deck::builder::DeckBuilder;
use crate::deck::export_csv::export_deck_csv;
use crate::deck::recommendation::save_deck;
use crate::deck::strategy::Strategy;
use crate::deck::upgrades::DEFAULT_UPGRADE_COUNT;
use crate::error::Result;
use crate::parallel::{build_suite, WorkerPool};

const USAGE: &str = "usage: crownforge <build|suite|upgrades|synergy|validate>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Build,
    Suite,
    Upgrades,
    Synergy,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("build") => Some(Command::Build),
        Some("suite") => Some(Command::Suite),
        Some("upgrades") => Some(Command::Upgrades),
        Some("synergy") => Some(Command::Synergy),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Build) => handle_build(args),
        Some(Command::Suite) => handle_suite(args),
        Some(Command::Upgrades) => handle_upgrades(args),
        Some(Command::Synergy) => handle_synergy(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn handle_build(args: &[String]) -> i32 {
    let Some(path) = positional(args) else {
        eprintln!(
            "usage: crownforge build <analysis.json> [--strategy S] [--synergy] [--synergy-weight W] \
             [--evolutions a,b] [--evo-slots N] [--include a,b] [--exclude a,b] \
             [--save DIR --tag TAG] [--csv]"
        );
        return 2;
    };
    let (builder, analysis) = match prepare(args, path) {
        Ok(prepared) => prepared,
        Err(code) => return code,
    };

    let recommendation = match builder.build_deck_from_analysis(&analysis) {
        Ok(recommendation) => recommendation,
        Err(err) => {
            eprintln!("build failed: {err}");
            return 1;
        }
    };

    if let Some(dir) = flag_value(args, "--save") {
        let tag = flag_value(args, "--tag")
            .map(str::to_string)
            .or_else(|| analysis.player_tag.clone());
        let Some(tag) = tag else {
            eprintln!("--save needs --tag or a player_tag in the analysis");
            return 2;
        };
        match save_deck(&recommendation, dir, &tag) {
            Ok(saved) => eprintln!("saved deck to {}", saved.display()),
            Err(err) => {
                eprintln!("save failed: {err}");
                return 1;
            }
        }
    }

    if has_flag(args, "--csv") {
        return match export_deck_csv(&recommendation, io::stdout()) {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("failed to write csv: {err}");
                1
            }
        };
    }
    print_json(&recommendation, "deck recommendation")
}

fn handle_suite(args: &[String]) -> i32 {
    let Some(path) = positional(args) else {
        eprintln!("usage: crownforge suite <analysis.json> [--strategies a,b|all] [--threads N]");
        return 2;
    };
    let strategies = match flag_value(args, "--strategies") {
        None | Some("all") => Strategy::ALL.to_vec(),
        Some(raw) => match split_card_list(raw)
            .iter()
            .map(|name| name.parse::<Strategy>())
            .collect::<Result<Vec<_>>>()
        {
            Ok(list) => list,
            Err(err) => {
                eprintln!("{err}");
                return 2;
            }
        },
    };
    let threads = parse_usize_arg(flag_value(args, "--threads"), "threads", 0);
    let (builder, analysis) = match prepare(args, path) {
        Ok(prepared) => prepared,
        Err(code) => return code,
    };

    let entries = build_suite(&builder, &analysis, &strategies, &WorkerPool::with_workers(threads));
    print_json(&entries, "strategy suite")
}

fn handle_upgrades(args: &[String]) -> i32 {
    let Some(path) = positional(args) else {
        eprintln!("usage: crownforge upgrades <analysis.json> [--strategy S] [--top N]");
        return 2;
    };
    let top = parse_usize_arg(flag_value(args, "--top"), "top", DEFAULT_UPGRADE_COUNT);
    let (builder, analysis) = match prepare(args, path) {
        Ok(prepared) => prepared,
        Err(code) => return code,
    };
    let deck = match builder.build_deck_from_analysis(&analysis) {
        Ok(deck) => deck,
        Err(err) => {
            eprintln!("build failed: {err}");
            return 1;
        }
    };
    let upgrades = builder.upgrade_recommendations(&analysis, &deck, top);
    print_json(&upgrades, "upgrade recommendations")
}

fn handle_synergy(args: &[String]) -> i32 {
    let Some(raw) = positional(args) else {
        eprintln!("usage: crownforge synergy <card,card,...>");
        return 2;
    };
    let cards = split_card_list(raw);
    let synergy = match config::load_knowledge(&config::data_dir()) {
        Ok((_, synergy)) => synergy,
        Err(err) => {
            eprintln!("failed to load knowledge base: {err}");
            return 1;
        }
    };
    print_json(&synergy.analyze_deck(&cards), "synergy analysis")
}

fn handle_validate(args: &[String]) -> i32 {
    let data_dir = config::data_dir();
    let cards_path = args
        .get(2)
        .map(|raw| Path::new(raw).to_path_buf())
        .unwrap_or_else(|| data_dir.join(crate::data::knowledge::DEFAULT_CARDS_FILE));
    let synergy_path = args
        .get(3)
        .map(|raw| Path::new(raw).to_path_buf())
        .unwrap_or_else(|| data_dir.join(crate::data::synergy::DEFAULT_SYNERGY_FILE));

    let loaded = KnowledgeBase::load(Some(cards_path.as_path()))
        .and_then(|kb| Ok((kb, SynergyDatabase::load(Some(synergy_path.as_path()))?)));
    let (kb, synergy) = match loaded {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };

    let report = validate_knowledge_base(&kb, &synergy);
    for diag in &report.diagnostics {
        eprintln!("- {diag}");
    }
    if report.has_errors() {
        eprintln!("validation failed: {} issue(s)", report.diagnostics.len());
        1
    } else {
        println!(
            "validation passed: {} cards, {} synergy pairs",
            kb.cards.len(),
            synergy.pairs.len()
        );
        0
    }
}

/// Builder configured from env, optional `--config FILE` and command-line flags,
/// plus the analysis at `path`. Errors are printed; the exit code is returned.
fn prepare(args: &[String], path: &str) -> std::result::Result<(DeckBuilder, CardAnalysis), i32> {
    let mut builder_config = match flag_value(args, "--config") {
        Some(file) => match BuilderConfig::load(file) {
            Ok(loaded) => loaded,
            Err(err) => {
                eprintln!("failed to load config: {err}");
                return Err(1);
            }
        },
        None => BuilderConfig::from_env(),
    };
    if let Err(err) = apply_flags(args, &mut builder_config) {
        eprintln!("{err}");
        return Err(2);
    }

    let (kb, synergy) = match config::load_knowledge(&config::data_dir()) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("failed to load knowledge base: {err}");
            return Err(1);
        }
    };
    let builder = match DeckBuilder::from_config(Arc::new(kb), Arc::new(synergy), &builder_config) {
        Ok(builder) => builder,
        Err(err) => {
            eprintln!("{err}");
            return Err(2);
        }
    };
    match load_analysis(path) {
        Ok(analysis) => Ok((builder, analysis)),
        Err(err) => {
            eprintln!("{err}");
            Err(1)
        }
    }
}

fn apply_flags(args: &[String], builder_config: &mut BuilderConfig) -> Result<()> {
    if let Some(raw) = flag_value(args, "--strategy") {
        builder_config.strategy = raw.parse()?;
    }
    if has_flag(args, "--synergy") {
        builder_config.synergy_enabled = true;
    }
    if let Some(raw) = flag_value(args, "--synergy-weight") {
        builder_config.synergy_weight = raw
            .parse::<f64>()
            .map_err(|_| crate::error::DeckError::UnparsableWeight(raw.to_string()))?;
        builder_config.synergy_enabled = true;
    }
    if let Some(raw) = flag_value(args, "--evolutions") {
        builder_config.unlocked_evolutions = split_card_list(raw);
    }
    if let Some(raw) = flag_value(args, "--evo-slots") {
        builder_config.evolution_slot_limit =
            parse_usize_arg(Some(raw), "evo-slots", builder_config.evolution_slot_limit);
    }
    if let Some(raw) = flag_value(args, "--include") {
        builder_config.include_cards = split_card_list(raw);
    }
    if let Some(raw) = flag_value(args, "--exclude") {
        builder_config.exclude_cards = split_card_list(raw);
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

/// First argument after the command that is not a flag or a flag's value.
fn positional(args: &[String]) -> Option<&str> {
    let mut iter = args.iter().skip(2);
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            if takes_value(arg) {
                iter.next();
            }
            continue;
        }
        return Some(arg.as_str());
    }
    None
}

fn takes_value(flag: &str) -> bool {
    !matches!(flag, "--synergy" | "--csv")
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
        .map(String::as_str)
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn parse_usize_arg(raw: Option<&str>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
