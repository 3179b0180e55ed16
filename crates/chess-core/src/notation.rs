//! FEN, SAN and UCI conversions.

use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, Move, Position, PositionError};
use thiserror::Error;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Invalid SAN '{0}'")]
    InvalidSan(String),

    #[error("Invalid UCI move '{0}'")]
    InvalidUci(String),

    #[error("Illegal move '{mv}' in position {fen}")]
    IllegalMove { mv: String, fen: String },
}

/// The side a move belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// Side to move in `pos`.
    pub fn to_move(pos: &Chess) -> Self {
        Side::from(pos.turn())
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => f.write_str("White"),
            Side::Black => f.write_str("Black"),
        }
    }
}

/// Parse a FEN string into a standard-chess position.
///
/// Stale castling rights and en passant squares are dropped rather than
/// rejected; a FEN is only refused when no playable position can be built.
pub fn parse_fen(fen: &str) -> Result<Chess, NotationError> {
    let fen = fen.trim();
    let parsed: Fen = fen.parse().map_err(|e| NotationError::InvalidFen {
        fen: fen.to_string(),
        reason: format!("{e}"),
    })?;
    parsed
        .into_position::<Chess>(CastlingMode::Standard)
        .or_else(PositionError::ignore_invalid_castling_rights)
        .or_else(PositionError::ignore_invalid_ep_square)
        .map_err(|e| NotationError::InvalidFen {
            fen: fen.to_string(),
            reason: format!("{e}"),
        })
}

/// Resolve a SAN token (check/mate suffixes allowed) against `pos`.
pub fn san_to_move(pos: &Chess, san: &str) -> Result<Move, NotationError> {
    let parsed: SanPlus = san
        .trim()
        .parse()
        .map_err(|_| NotationError::InvalidSan(san.to_string()))?;
    parsed.san.to_move(pos).map_err(|_| NotationError::IllegalMove {
        mv: san.to_string(),
        fen: describe(pos),
    })
}

/// Resolve a UCI move string (`e2e4`, `e7e8q`) against `pos`.
pub fn uci_to_move(pos: &Chess, uci: &str) -> Result<Move, NotationError> {
    let parsed: UciMove = uci
        .trim()
        .parse()
        .map_err(|_| NotationError::InvalidUci(uci.to_string()))?;
    parsed.to_move(pos).map_err(|_| NotationError::IllegalMove {
        mv: uci.to_string(),
        fen: describe(pos),
    })
}

pub fn move_to_uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

/// SAN with check/mate suffix, as written in game scores.
pub fn move_to_san(pos: &Chess, mv: &Move) -> String {
    let mut after = pos.clone();
    SanPlus::from_move_and_play_unchecked(&mut after, mv.clone()).to_string()
}

/// Render an engine line (UCI moves) as SAN, replaying it on a copy of `pos`.
///
/// Stops at the first move that does not parse or is illegal, so a
/// truncated or garbled line still yields its valid prefix.
pub fn uci_line_to_san(pos: &Chess, line: &[String]) -> Vec<String> {
    let mut pos = pos.clone();
    let mut moves = Vec::with_capacity(line.len());

    for uci in line {
        let mv = match uci_to_move(&pos, uci) {
            Ok(m) => m,
            Err(_) => break,
        };
        moves.push(SanPlus::from_move_and_play_unchecked(&mut pos, mv).to_string());
    }

    moves
}

/// Board description for error messages.
fn describe(pos: &Chess) -> String {
    format!("{} to move, move {}", Side::to_move(pos), pos.fullmoves())
}
