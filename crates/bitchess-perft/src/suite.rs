//! Perft suite files.
//!
//! A suite is a TOML file listing positions and their expected node counts:
//!
//! ```toml
//! [[position]]
//! name = "startpos"
//! fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
//! nodes = [20, 400, 8902]
//! ```

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context};
use bitchess_engine::{perft, Position};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Suite {
    #[serde(rename = "position", default)]
    pub positions: Vec<SuiteEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SuiteEntry {
    pub name: String,
    pub fen: String,
    /// Expected counts for depth 1, 2, ...
    pub nodes: Vec<u64>,
}

/// Result of one (position, depth) check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub name: String,
    pub depth: u32,
    pub expected: u64,
    pub actual: u64,
}

impl Outcome {
    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

impl Suite {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read suite {}", path.display()))?;
        let suite: Suite = toml::from_str(&content)
            .with_context(|| format!("failed to parse suite {}", path.display()))?;
        tracing::info!("Loaded {} positions from {}", suite.positions.len(), path.display());
        Ok(suite)
    }

    /// Runs every entry up to `max_depth` (or all listed depths) and returns
    /// one outcome per depth searched.
    pub fn run(&self, max_depth: Option<u32>) -> anyhow::Result<Vec<Outcome>> {
        let mut outcomes = Vec::new();

        for entry in &self.positions {
            let mut position = Position::from_fen(&entry.fen)
                .with_context(|| format!("invalid FEN for {}", entry.name))?;

            for (depth, &expected) in (1u32..).zip(&entry.nodes) {
                if max_depth.is_some_and(|max| depth > max) {
                    break;
                }
                let start = Instant::now();
                let actual = perft(&mut position, depth);
                let outcome = Outcome {
                    name: entry.name.clone(),
                    depth,
                    expected,
                    actual,
                };
                if outcome.passed() {
                    tracing::info!(
                        "{} depth {}: {} nodes in {:?}",
                        entry.name,
                        depth,
                        actual,
                        start.elapsed()
                    );
                } else {
                    tracing::error!(
                        "{} depth {}: expected {}, got {}",
                        entry.name,
                        depth,
                        expected,
                        actual
                    );
                }
                outcomes.push(outcome);
            }
        }

        Ok(outcomes)
    }
}

/// Fails with a summary if any outcome does not match.
pub fn check(outcomes: &[Outcome]) -> anyhow::Result<()> {
    let failed: Vec<&Outcome> = outcomes.iter().filter(|o| !o.passed()).collect();
    if failed.is_empty() {
        tracing::info!("All {} perft checks passed", outcomes.len());
        return Ok(());
    }
    let details: Vec<String> = failed
        .iter()
        .map(|o| format!("{} depth {} ({} != {})", o.name, o.depth, o.actual, o.expected))
        .collect();
    bail!("{} of {} perft checks failed: {}", failed.len(), outcomes.len(), details.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD: &str = include_str!("../suites/standard.toml");

    #[test]
    fn parses_bundled_suite() {
        let suite: Suite = toml::from_str(STANDARD).unwrap();
        assert_eq!(suite.positions.len(), 7);
        assert_eq!(suite.positions[0].name, "startpos");
        assert_eq!(suite.positions[0].nodes[..3], [20, 400, 8902]);
    }

    #[test]
    fn bundled_suite_passes_at_shallow_depth() {
        let suite: Suite = toml::from_str(STANDARD).unwrap();
        let outcomes = suite.run(Some(2)).unwrap();
        assert_eq!(outcomes.len(), 14);
        check(&outcomes).unwrap();
    }

    #[test]
    fn mismatch_is_reported() {
        let suite: Suite = toml::from_str(
            r#"
            [[position]]
            name = "wrong"
            fen = "4k3/8/8/8/8/8/8/4K3 w - - 0 1"
            nodes = [5, 1]
            "#,
        )
        .unwrap();
        let outcomes = suite.run(None).unwrap();
        assert!(outcomes[0].passed());
        assert!(!outcomes[1].passed());
        let err = check(&outcomes).unwrap_err().to_string();
        assert!(err.contains("wrong depth 2"));
    }

    #[test]
    fn invalid_fen_names_the_entry() {
        let suite: Suite = toml::from_str(
            r#"
            [[position]]
            name = "broken"
            fen = "not a fen"
            nodes = [1]
            "#,
        )
        .unwrap();
        let err = suite.run(None).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid FEN for broken"));
    }

    #[test]
    fn empty_suite_has_no_outcomes() {
        let suite: Suite = toml::from_str("").unwrap();
        assert!(suite.positions.is_empty());
        check(&suite.run(None).unwrap()).unwrap();
    }
}
