//! bitchess-perft - Counts move-generator leaf nodes.
//!
//! Runs perft on a single position (optionally split per root move) or
//! checks a whole TOML suite of reference counts.

mod suite;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use bitchess_engine::{perft, perft_divide, Position};
use clap::Parser;
use suite::Suite;
use tracing_subscriber::EnvFilter;

const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// bitchess-perft - Counts legal move paths to a fixed depth.
#[derive(Parser)]
#[command(name = "bitchess-perft")]
#[command(about = "Counts legal move paths to a fixed depth")]
struct Args {
    /// Position to search, in FEN
    #[arg(long, default_value = STARTPOS)]
    fen: String,

    /// Search depth in plies
    #[arg(long, default_value = "5")]
    depth: u32,

    /// Print the node count below each root move
    #[arg(long)]
    divide: bool,

    /// Check every position of a TOML suite instead of a single FEN
    #[arg(long, conflicts_with_all = ["fen", "divide"])]
    suite: Option<PathBuf>,

    /// Highest depth to run from the suite
    #[arg(long, requires = "suite")]
    max_depth: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let start = Instant::now();
    bitchess_engine::init();
    tracing::debug!("Tables ready in {:?}", start.elapsed());

    if let Some(path) = &args.suite {
        let suite = Suite::load(path)?;
        let outcomes = suite.run(args.max_depth)?;
        return suite::check(&outcomes);
    }

    let mut position = Position::from_fen(&args.fen)
        .with_context(|| format!("invalid FEN: {}", args.fen))?;
    tracing::info!("Position: {}", position.to_fen());
    tracing::info!("Depth: {}", args.depth);

    let start = Instant::now();
    let nodes = if args.divide {
        let divide = perft_divide(&mut position, args.depth);
        for (m, count) in &divide {
            println!("{}: {}", m, count);
        }
        println!();
        divide.iter().map(|(_, count)| count).sum()
    } else {
        perft(&mut position, args.depth)
    };
    let elapsed = start.elapsed();

    println!("Nodes searched: {}", nodes);
    let nps = nodes as f64 / elapsed.as_secs_f64().max(1e-9);
    tracing::info!("{} nodes in {:?} ({:.0} nodes/s)", nodes, elapsed, nps);

    Ok(())
}
