//! Chess mentor CLI
//!
//! Analyzes one move from a position and prints the graded result.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chess_core::STANDARD_START_FEN;
use chess_mentor::{format_for_display, Mentor, MentorConfig};

#[derive(Parser, Debug)]
#[command(name = "chess-mentor", about = "Grade and explain a chess move")]
struct Args {
    /// Position before the move
    #[arg(long, default_value = STANDARD_START_FEN)]
    fen: String,

    /// Move to analyze, in UCI or SAN
    #[arg(long = "move", default_value = "e4")]
    mv: String,

    /// Search depth per position
    #[arg(long)]
    depth: Option<u32>,

    /// Search time per position, in milliseconds
    #[arg(long)]
    time_ms: Option<u64>,

    /// Engine executable (overrides STOCKFISH_PATH)
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Skip the AI explanation
    #[arg(long)]
    no_explain: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

/// `RUST_LOG` when it is set and valid, `info` otherwise.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let mut config = MentorConfig::from_env()?;
    if let Some(depth) = args.depth {
        config.limits.depth = depth;
    }
    if let Some(ms) = args.time_ms {
        config.limits.movetime = Duration::from_millis(ms);
    }
    if args.engine.is_some() {
        config.engine_path = args.engine;
    }
    if args.no_explain {
        config.explanations = false;
    }

    let position = chess_core::from_fen(&args.fen)?;
    let mv = chess_core::parse_move(&position, &args.mv)?;
    let san = chess_core::to_san(&position, &mv);
    info!(fen = %args.fen, san = %san, depth = config.limits.depth, "Analyzing move");

    let mut mentor = Mentor::new(&config).await;
    let result = mentor.analyze_move(&position, &mv, config.limits).await;
    mentor.shutdown().await;
    let result = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", format_for_display(&san, &result));
    }

    Ok(())
}
