//! Live mode: one board per connection, driven by discrete commands.
//!
//! Transport-agnostic; the server feeds decoded text frames in and sends the
//! returned events back.

use serde::{Deserialize, Serialize};
use shakmaty::Chess;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use chess_core::{notation, Side};

use crate::analysis::{analyze_position, PositionAnalysis};
use crate::engine::{AnalysisEngine, EnginePosition, ManagedEngine, SearchLimit};
use crate::error::CommentaryError;
use crate::narrative::{self, TextModel};

/// Most PV lines sent back for board arrows
const MAX_EVENT_LINES: usize = 3;

/// Client → Server messages
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ClientCommand {
    AnalyzePosition {
        fen: Option<String>,
        last_move: Option<String>,
    },
    Reset,
    /// Anything else is ignored without a reply
    #[serde(other)]
    Unknown,
}

/// Server → Client messages
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Analysis {
        score: f64,
        #[serde(rename = "bestMove")]
        best_move: String,
        analysis: String,
        pv: Vec<String>,
    },
    Error {
        message: String,
    },
    ResetConfirmed,
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }
}

/// Engine and model shared by every live session.
///
/// The engine sits behind a mutex: one analysis at a time.
pub struct Analyst<E, M> {
    engine: Mutex<E>,
    model: M,
    limit: SearchLimit,
}

impl<E: AnalysisEngine, M: TextModel> Analyst<E, M> {
    pub fn new(engine: E, model: M, limit: SearchLimit) -> Self {
        Self {
            engine: Mutex::new(engine),
            model,
            limit,
        }
    }

    async fn analyze(
        &self,
        board: &Chess,
        fen: &str,
    ) -> Result<PositionAnalysis, CommentaryError> {
        let position = EnginePosition::from_fen(fen);
        let mut engine = self.engine.lock().await;
        analyze_position(&mut *engine, &position, board, self.limit).await
    }
}

impl<M> Analyst<ManagedEngine, M> {
    /// Quit the shared engine; called once at process shutdown.
    pub async fn shutdown(&self) {
        self.engine.lock().await.shutdown().await;
    }
}

/// Per-connection state.
pub struct LiveSession {
    board: Chess,
}

impl Default for LiveSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveSession {
    pub fn new() -> Self {
        Self {
            board: Chess::default(),
        }
    }

    pub fn board(&self) -> &Chess {
        &self.board
    }

    /// Decode one text frame and handle it.
    pub async fn handle_text<E, M>(
        &mut self,
        text: &str,
        analyst: &Analyst<E, M>,
    ) -> Option<ServerEvent>
    where
        E: AnalysisEngine,
        M: TextModel,
    {
        match serde_json::from_str::<ClientCommand>(text) {
            Ok(command) => self.handle(command, analyst).await,
            Err(e) => {
                warn!(error = %e, "Unreadable client message");
                Some(ServerEvent::error(format!("Invalid message: {e}")))
            }
        }
    }

    /// Handle one command; `None` means no reply is due.
    pub async fn handle<E, M>(
        &mut self,
        command: ClientCommand,
        analyst: &Analyst<E, M>,
    ) -> Option<ServerEvent>
    where
        E: AnalysisEngine,
        M: TextModel,
    {
        match command {
            ClientCommand::AnalyzePosition { fen, last_move } => {
                Some(self.analyze_position(fen, last_move, analyst).await)
            }
            ClientCommand::Reset => {
                self.board = Chess::default();
                info!("Session board reset");
                Some(ServerEvent::ResetConfirmed)
            }
            ClientCommand::Unknown => None,
        }
    }

    async fn analyze_position<E, M>(
        &mut self,
        fen: Option<String>,
        last_move: Option<String>,
        analyst: &Analyst<E, M>,
    ) -> ServerEvent
    where
        E: AnalysisEngine,
        M: TextModel,
    {
        let Some(fen) = fen.filter(|f| !f.trim().is_empty()) else {
            return ServerEvent::error("FEN position required");
        };

        match notation::parse_fen(&fen) {
            Ok(board) => self.board = board,
            Err(e) => {
                warn!(error = %e, "Rejected FEN");
                return ServerEvent::error("Invalid FEN position");
            }
        }

        let analysis = match analyst.analyze(&self.board, &fen).await {
            Ok(a) => a,
            Err(e) => {
                error!(error = %e, "Position analysis failed");
                return ServerEvent::error(format!("Analysis failed: {e}"));
            }
        };

        // The position is the result of the last move, made by the side not to move
        let mover = Side::to_move(&self.board).opposite();
        let played = last_move.unwrap_or_else(|| "unknown".to_string());
        let commentary =
            narrative::render(narrative::explain(&analyst.model, &analysis, &played, mover).await);

        ServerEvent::Analysis {
            score: analysis.score,
            best_move: analysis.best_move,
            analysis: commentary,
            pv: analysis
                .candidate_lines
                .into_iter()
                .take(MAX_EVENT_LINES)
                .collect(),
        }
    }
}
