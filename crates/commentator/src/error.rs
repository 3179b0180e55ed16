//! Commentary error types

use chess_core::NotationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommentaryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to initialize Stockfish: {0}")]
    EngineSpawn(String),

    #[error("Failed to initialize Gemini: {0}")]
    ModelSetup(String),

    #[error("Stockfish unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Stockfish did not finish within {0} seconds")]
    EngineTimeout(u64),

    #[error("Engine returned no lines for this position")]
    NoLegalMoves,

    #[error("Invalid PGN format")]
    InvalidGameFormat,

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] NotationError),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),
}

impl CommentaryError {
    /// Engine-side failures; the engine process should be considered dead.
    pub fn is_engine_failure(&self) -> bool {
        matches!(
            self,
            CommentaryError::EngineSpawn(_)
                | CommentaryError::EngineUnavailable(_)
                | CommentaryError::EngineTimeout(_)
        )
    }
}
