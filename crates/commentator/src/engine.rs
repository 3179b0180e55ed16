//! Engine seam: what the analyzer needs from a chess engine, plus the
//! supervised Stockfish handle shared by long-running callers.

use std::fmt;

use shakmaty::{Chess, Position};
use tokio::time::timeout;
use tracing::{info, warn};

use chess_core::notation::{self, NotationError};

use crate::error::CommentaryError;
use crate::stockfish::{EngineOptions, StockfishEngine};

/// Most candidate lines this system ever asks for.
pub const MAX_LINES: u32 = 3;

/// Search limits for one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimit {
    pub depth: u32,
    pub lines: u32,
}

impl Default for SearchLimit {
    fn default() -> Self {
        Self {
            depth: 20,
            lines: MAX_LINES,
        }
    }
}

/// A position as sent to the engine: a base FEN plus moves played from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnginePosition {
    pub fen: String,
    pub moves: Vec<String>, // UCI notation
}

impl EnginePosition {
    pub fn from_fen(fen: &str) -> Self {
        Self {
            fen: fen.trim().to_string(),
            moves: Vec::new(),
        }
    }

    /// Rebuild the board this position describes.
    pub fn to_chess(&self) -> Result<Chess, NotationError> {
        let mut pos = notation::parse_fen(&self.fen)?;
        for uci in &self.moves {
            let mv = notation::uci_to_move(&pos, uci)?;
            pos.play_unchecked(mv);
        }
        Ok(pos)
    }
}

impl fmt::Display for EnginePosition {
    /// UCI `position` command body.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fen {}", self.fen)?;
        if !self.moves.is_empty() {
            write!(f, " moves {}", self.moves.join(" "))?;
        }
        Ok(())
    }
}

/// A single PV line from multi-PV analysis
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PvLine {
    /// Principal variation moves (UCI)
    pub pv: Vec<String>,
    /// Centipawn score, side to move's perspective
    pub cp: Option<i32>,
    /// Mate in N (positive = side to move mates)
    pub mate: Option<i32>,
}

/// Anything that can rank candidate lines for a position.
#[allow(async_fn_in_trait)]
pub trait AnalysisEngine {
    /// Analyse `position`, returning up to `limit.lines` lines, best first.
    async fn analyse(
        &mut self,
        position: &EnginePosition,
        limit: SearchLimit,
    ) -> Result<Vec<PvLine>, CommentaryError>;
}

/// Stockfish process with lazy restart and bounded calls.
///
/// A failed or timed-out call kills the process; the next call spawns a
/// fresh one.
pub struct ManagedEngine {
    options: EngineOptions,
    engine: Option<StockfishEngine>,
}

impl ManagedEngine {
    /// Spawn the engine eagerly so a bad path fails at start-up.
    pub async fn start(options: EngineOptions) -> Result<Self, CommentaryError> {
        let engine = spawn(&options).await?;
        info!(path = %options.path, "Stockfish ready");
        Ok(Self {
            options,
            engine: Some(engine),
        })
    }

    /// Quit the engine if it is running.
    pub async fn shutdown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.quit().await;
            info!("Stockfish stopped");
        }
    }
}

impl AnalysisEngine for ManagedEngine {
    async fn analyse(
        &mut self,
        position: &EnginePosition,
        limit: SearchLimit,
    ) -> Result<Vec<PvLine>, CommentaryError> {
        if self.engine.is_none() {
            info!(path = %self.options.path, "Restarting Stockfish");
            self.engine = Some(spawn(&self.options).await?);
        }
        let Some(engine) = self.engine.as_mut() else {
            return Err(CommentaryError::EngineUnavailable("engine not running".into()));
        };

        let result = match timeout(self.options.timeout, engine.analyse(position, limit)).await {
            Ok(result) => result,
            Err(_) => Err(CommentaryError::EngineTimeout(self.options.timeout.as_secs())),
        };

        if let Err(e) = &result {
            if e.is_engine_failure() {
                warn!(error = %e, "Discarding Stockfish process");
                if let Some(mut dead) = self.engine.take() {
                    dead.kill().await;
                }
            }
        }

        result
    }
}

async fn spawn(options: &EngineOptions) -> Result<StockfishEngine, CommentaryError> {
    match timeout(options.timeout, StockfishEngine::new(options)).await {
        Ok(result) => result,
        Err(_) => Err(CommentaryError::EngineSpawn(format!(
            "no UCI handshake within {} seconds",
            options.timeout.as_secs()
        ))),
    }
}
