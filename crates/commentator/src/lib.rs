pub use chess_core;

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod gemini;
pub mod live;
pub mod narrative;
pub mod session;
pub mod stockfish;

pub use config::CommentaryConfig;
pub use error::CommentaryError;
