use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Move, Position};

use crate::notation::{self, NotationError, STANDARD_START_FEN};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameMetadata {
    pub white: String,
    pub black: String,
    pub result: String, // "1-0", "0-1", "1/2-1/2", "*"
    pub date: Option<String>,
    pub event: Option<String>,
    pub opening: Option<String>,
    pub eco: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameData {
    pub metadata: GameMetadata,
    /// Starting position when the game carries a `SetUp`/`FEN` header pair.
    pub start_fen: Option<String>,
    pub moves: Vec<String>, // SAN notation
}

/// A played move resolved against the position it was played from.
#[derive(Debug, Clone)]
pub struct ResolvedMove {
    pub mv: Move,
    pub san: String,
    pub uci: String,
}

/// A game whose moves have all been checked for legality.
#[derive(Debug, Clone)]
pub struct ResolvedGame {
    pub start: Chess,
    pub start_fen: String,
    pub moves: Vec<ResolvedMove>,
}

impl GameData {
    /// Replay the SAN moves from the starting position, failing on the first
    /// move that is not legal.
    pub fn resolve(&self) -> Result<ResolvedGame, NotationError> {
        let start_fen = self
            .start_fen
            .clone()
            .unwrap_or_else(|| STANDARD_START_FEN.to_string());
        let start = notation::parse_fen(&start_fen)?;

        let mut pos = start.clone();
        let mut moves = Vec::with_capacity(self.moves.len());

        for san in &self.moves {
            let mv = notation::san_to_move(&pos, san)?;
            moves.push(ResolvedMove {
                san: notation::move_to_san(&pos, &mv),
                uci: notation::move_to_uci(&mv),
                mv: mv.clone(),
            });
            pos.play_unchecked(mv);
        }

        Ok(ResolvedGame {
            start,
            start_fen,
            moves,
        })
    }
}
