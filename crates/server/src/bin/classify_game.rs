//! Classify one game against an opening catalogue and print the result as JSON.
//!
//! Usage: cargo run --bin classify-game -- <catalogue> <moves | --file path> [options]
//!
//! Example:
//!   cargo run --bin classify-game -- data/openings "1. e4 e5 2. Nf3 Nc6 3. Bb5" --diagnostics

use std::env;
use std::fs;

use opening_classifier::{Catalogue, ClassifyOptions, OpeningEngine};
use tracing_subscriber::EnvFilter;

const DEFAULT_PLY_LIMIT: usize = 40;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} <catalogue> <moves | --file path> [--ply-limit N] [--report-limit N]");
    eprintln!("       [--orderless] [--threshold F] [--prefer-set] [--exact] [--diagnostics]");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  cargo run --bin classify-game -- data/openings \"1. d4 d5 2. Bf4 Nf6 3. e3\"");
    std::process::exit(1);
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        usage(&args[0]);
    }

    let catalogue_path = &args[1];
    let mut moves: Option<String> = None;
    let mut ply_limit = DEFAULT_PLY_LIMIT;
    let mut options = ClassifyOptions::default();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--file" => {
                let Some(path) = args.get(i + 1) else {
                    usage(&args[0]);
                };
                moves = Some(fs::read_to_string(path)?);
                i += 2;
            }
            "--ply-limit" => {
                ply_limit = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_PLY_LIMIT);
                i += 2;
            }
            "--report-limit" => {
                options.report_limit = args.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "--threshold" => {
                options.orderless_threshold = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(1.0);
                i += 2;
            }
            "--orderless" => {
                options.orderless_matching = true;
                i += 1;
            }
            "--prefer-set" => {
                options.prefer_set_matches = true;
                i += 1;
            }
            "--exact" => {
                options.require_exact_position_match = true;
                i += 1;
            }
            "--diagnostics" => {
                options.include_diagnostics = true;
                i += 1;
            }
            other if moves.is_none() && !other.starts_with("--") => {
                moves = Some(other.to_string());
                i += 1;
            }
            _ => i += 1,
        }
    }

    let Some(moves) = moves else {
        usage(&args[0]);
    };

    let catalogue = Catalogue::load_or_empty(catalogue_path);
    eprintln!(
        "Loaded {} entries ({} positions) from {}",
        catalogue.len(),
        catalogue.position_count(),
        catalogue_path
    );

    let engine = OpeningEngine::new(catalogue);
    let result = engine.classify(&moves, Some(ply_limit), &options);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
