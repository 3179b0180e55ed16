//! Position analysis: turns ranked engine lines into a display-ready summary.
//!
//! `summarize` is pure; `analyze_position` adds the engine round trip.

use serde::{Deserialize, Serialize};
use shakmaty::Chess;

use chess_core::notation;

use crate::engine::{AnalysisEngine, EnginePosition, PvLine, SearchLimit, MAX_LINES};
use crate::error::CommentaryError;

/// Native-unit value substituted for a forced mate
pub const MATE_SCORE: i32 = 10_000;

/// Centipawns per pawn
const CP_PER_PAWN: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionAnalysis {
    /// Evaluation in pawns, side to move's perspective
    pub score: f64,
    /// Evaluation in centipawns with mates substituted by ±MATE_SCORE
    pub raw_cp: i32,
    /// Mate distance of the top line, if it is a forced mate
    pub mate: Option<i32>,
    /// Top lines in SAN, space-joined, best first
    pub candidate_lines: Vec<String>,
    /// First move of the top line (UCI)
    pub best_move: String,
}

impl PositionAnalysis {
    /// Signed score with two decimals, e.g. `+0.35`
    pub fn formatted_score(&self) -> String {
        format!("{:+.2}", self.score)
    }
}

/// Native-unit score of an engine line.
///
/// Mates become ±MATE_SCORE; `mate 0` (side to move is mated) counts as lost.
pub fn line_score(cp: Option<i32>, mate: Option<i32>) -> i32 {
    match (mate, cp) {
        (Some(m), _) if m > 0 => MATE_SCORE,
        (Some(_), _) => -MATE_SCORE,
        (None, Some(c)) => c,
        (None, None) => 0,
    }
}

/// Summarize engine output for `position`.
///
/// `line_count` is clamped to the number of lines the engine returned and
/// to MAX_LINES.
pub fn summarize(
    position: &Chess,
    lines: &[PvLine],
    line_count: usize,
) -> Result<PositionAnalysis, CommentaryError> {
    let top = lines
        .first()
        .filter(|l| !l.pv.is_empty())
        .ok_or(CommentaryError::NoLegalMoves)?;

    let raw_cp = line_score(top.cp, top.mate);

    let candidate_lines = lines
        .iter()
        .take(line_count.min(MAX_LINES as usize))
        .map(|l| notation::uci_line_to_san(position, &l.pv).join(" "))
        .collect();

    Ok(PositionAnalysis {
        score: raw_cp as f64 / CP_PER_PAWN,
        raw_cp,
        mate: top.mate,
        candidate_lines,
        best_move: top.pv[0].clone(),
    })
}

/// Ask the engine about `position` and summarize its answer.
pub async fn analyze_position<E: AnalysisEngine>(
    engine: &mut E,
    position: &EnginePosition,
    board: &Chess,
    limit: SearchLimit,
) -> Result<PositionAnalysis, CommentaryError> {
    let lines = engine.analyse(position, limit).await?;
    summarize(board, &lines, limit.lines as usize)
}
