//! Batch game commentary
//!
//! Reads a game (PGN or bare movetext) from `--pgn-file` or stdin, runs
//! Stockfish and Gemini over every move, prints the report.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use tracing::info;

use commentator::session;
use commentator::CommentaryConfig;

/// Value following `flag` on the command line
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr, so the report on stdout stays clean)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();

    let mut config = CommentaryConfig::from_env()?;
    if let Some(path) = arg_value(&args, "--stockfish") {
        config.stockfish_path = path;
    }

    if !Path::new(&config.stockfish_path).exists() {
        anyhow::bail!(
            "Stockfish not found at {}. Download it from https://stockfishchess.org/download/ \
             and set STOCKFISH_PATH or pass --stockfish",
            config.stockfish_path
        );
    }
    info!(stockfish_path = %config.stockfish_path, depth = config.depth, "Config loaded");

    let pgn = match arg_value(&args, "--pgn-file") {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read PGN file {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read PGN from stdin")?;
            buf
        }
    };

    let report = session::analyze_game(&config, &pgn).await?;

    if args.iter().any(|a| a == "--json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Game Analysis:\n");
        println!("{report}");
    }

    Ok(())
}
