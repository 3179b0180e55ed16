//! Chess notation helpers shared by the commentator and the server.
//!
//! Move legality and notation are delegated to `shakmaty`; this crate only
//! glues PGN text, FEN strings and engine (UCI) output to it.

pub mod game_data;
pub mod notation;
pub mod pgn;

pub use game_data::{GameData, GameMetadata, ResolvedGame, ResolvedMove};
pub use notation::{NotationError, Side, STANDARD_START_FEN};
