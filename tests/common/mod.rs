#![allow(dead_code)]

use reqwest::Client;
use shakmaty::Position;

use commentator::engine::{AnalysisEngine, EnginePosition, PvLine, SearchLimit};
use commentator::narrative::{GenerationError, TextModel};
use commentator::CommentaryError;
use chess_core::notation;

pub const BASE_URL: &str = "http://localhost:8000";

/// Build a reqwest client for tests.
pub fn client() -> Client {
    Client::new()
}

/// Build a URL for an API endpoint.
pub fn url(path: &str) -> String {
    format!("{}{}", BASE_URL, path)
}

/// Engine stand-in: answers every position with its legal moves in
/// generation order, scoring the first line `cp`.
///
/// Records each position it was asked about. With `fail_at = Some(n)` the
/// n-th call (1-based) fails as if the process had died.
pub struct ScriptedEngine {
    pub cp: i32,
    pub fail_at: Option<usize>,
    pub seen: Vec<EnginePosition>,
}

impl ScriptedEngine {
    pub fn new(cp: i32) -> Self {
        Self {
            cp,
            fail_at: None,
            seen: Vec::new(),
        }
    }

    pub fn failing_at(call: usize) -> Self {
        Self {
            fail_at: Some(call),
            ..Self::new(0)
        }
    }
}

impl AnalysisEngine for ScriptedEngine {
    async fn analyse(
        &mut self,
        position: &EnginePosition,
        limit: SearchLimit,
    ) -> Result<Vec<PvLine>, CommentaryError> {
        self.seen.push(position.clone());
        if self.fail_at == Some(self.seen.len()) {
            return Err(CommentaryError::EngineUnavailable("stdout closed".into()));
        }

        let board = position.to_chess()?;
        let lines = board
            .legal_moves()
            .iter()
            .take(limit.lines as usize)
            .enumerate()
            .map(|(i, mv)| PvLine {
                pv: vec![notation::move_to_uci(mv)],
                cp: Some(self.cp - 10 * i as i32),
                mate: None,
            })
            .collect();
        Ok(lines)
    }
}

/// Model stand-in: echoes the "Move:" line of the prompt, padded.
pub struct EchoModel;

impl TextModel for EchoModel {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let line = prompt
            .lines()
            .find(|l| l.starts_with("Move:"))
            .unwrap_or_default();
        Ok(format!("  {line}  "))
    }
}

/// Model stand-in that is always down.
pub struct DownModel;

impl TextModel for DownModel {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Api {
            status: 503,
            message: "overloaded".into(),
        })
    }
}
