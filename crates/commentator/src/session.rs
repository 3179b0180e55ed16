//! Batch mode: comment on every move of a game, in order.
//!
//! Each position is analysed before its move is applied. Any failure in the
//! move loop aborts the whole game; partial reports are discarded.

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use chess_core::pgn::parse_pgn;
use chess_core::{GameMetadata, ResolvedGame, Side};
use shakmaty::Position;

use crate::analysis::{analyze_position, PositionAnalysis};
use crate::config::CommentaryConfig;
use crate::engine::{AnalysisEngine, EnginePosition, ManagedEngine, SearchLimit};
use crate::error::CommentaryError;
use crate::gemini::GeminiClient;
use crate::narrative::{self, TextModel};

#[derive(Debug, Clone, Serialize)]
pub struct MoveReport {
    /// 1-based ply number
    pub move_index: usize,
    pub side: Side,
    #[serde(rename = "move")]
    pub san: String,
    pub uci: String,
    /// Analysis of the position before the move
    pub analysis: PositionAnalysis,
    pub narrative: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameReport {
    pub metadata: GameMetadata,
    pub moves: Vec<MoveReport>,
}

impl GameReport {
    /// Plain-text report, one block per move.
    pub fn render(&self) -> String {
        self.moves
            .iter()
            .map(|m| format!("Move {}. {}: {}\n{}\n", m.move_index, m.side, m.san, m.narrative))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for GameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Parse a game and check every move for legality.
pub fn prepare_game(pgn: &str) -> Result<(GameMetadata, ResolvedGame), CommentaryError> {
    let game = parse_pgn(pgn).ok_or(CommentaryError::InvalidGameFormat)?;
    let resolved = game.resolve().map_err(|e| {
        warn!(error = %e, "Game does not replay");
        CommentaryError::InvalidGameFormat
    })?;
    Ok((game.metadata, resolved))
}

/// Comment on every move of `pgn` using the given engine and model.
pub async fn run_game<E, M>(
    engine: &mut E,
    model: &M,
    pgn: &str,
    limit: SearchLimit,
) -> Result<GameReport, CommentaryError>
where
    E: AnalysisEngine,
    M: TextModel,
{
    let (metadata, resolved) = prepare_game(pgn)?;
    let moves = comment_moves(engine, model, &resolved, limit).await?;
    Ok(GameReport { metadata, moves })
}

/// The per-move loop over an already resolved game.
pub async fn comment_moves<E, M>(
    engine: &mut E,
    model: &M,
    game: &ResolvedGame,
    limit: SearchLimit,
) -> Result<Vec<MoveReport>, CommentaryError>
where
    E: AnalysisEngine,
    M: TextModel,
{
    let mut board = game.start.clone();
    let mut position = EnginePosition::from_fen(&game.start_fen);
    let mut reports = Vec::with_capacity(game.moves.len());
    let total = game.moves.len();

    for (i, played) in game.moves.iter().enumerate() {
        let move_index = i + 1;
        let side = Side::to_move(&board);
        info!(move_index, total, mv = %played.san, "Analyzing move");

        let analysis = analyze_position(engine, &position, &board, limit)
            .await
            .map_err(|e| CommentaryError::AnalysisFailed(format!("move {move_index}: {e}")))?;

        board.play_unchecked(played.mv.clone());
        position.moves.push(played.uci.clone());

        // The prompt names the move in both notations
        let spoken = format!("{} ({})", played.san, played.uci);
        let narrative =
            narrative::render(narrative::explain(model, &analysis, &spoken, side).await);

        reports.push(MoveReport {
            move_index,
            side,
            san: played.san.clone(),
            uci: played.uci.clone(),
            analysis,
            narrative,
        });
    }

    Ok(reports)
}

/// Batch entry point: owns the engine for exactly this game.
///
/// The engine is started after the game is known to be valid and is quit
/// whether or not the analysis succeeds.
pub async fn analyze_game(
    config: &CommentaryConfig,
    pgn: &str,
) -> Result<GameReport, CommentaryError> {
    info!("Starting game analysis");
    let (metadata, resolved) = prepare_game(pgn)?;
    info!(moves = resolved.moves.len(), "Game parsed");

    let model =
        GeminiClient::new(config).map_err(|e| CommentaryError::ModelSetup(e.to_string()))?;
    let mut engine = ManagedEngine::start(config.engine_options()).await?;

    let result = comment_moves(&mut engine, &model, &resolved, config.search_limit()).await;

    engine.shutdown().await;

    match result {
        Ok(moves) => {
            info!(moves = moves.len(), "Game analysis complete");
            Ok(GameReport { metadata, moves })
        }
        Err(e) => {
            tracing::error!(error = %e, "Game analysis aborted");
            Err(e)
        }
    }
}
