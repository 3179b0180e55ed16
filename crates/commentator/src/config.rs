//! Commentary configuration from environment variables

use std::env;
use std::time::Duration;

use crate::error::CommentaryError;
use crate::engine::{SearchLimit, MAX_LINES};
use crate::stockfish::EngineOptions;

#[derive(Clone, Debug)]
pub struct CommentaryConfig {
    /// Path to Stockfish binary
    pub stockfish_path: String,

    /// Gemini API key
    pub gemini_api_key: String,

    /// Gemini model name, e.g. `gemini-2.0-flash`
    pub gemini_model: String,

    /// Base URL of the Gemini REST API
    pub gemini_api_url: String,

    /// Search depth per position
    pub depth: u32,

    /// MultiPV lines per position (1..=3)
    pub lines: u32,

    /// Stockfish `Threads` option
    pub engine_threads: u32,

    /// Stockfish `Hash` option in MB
    pub engine_hash_mb: u32,

    /// Upper bound on one engine analysis
    pub engine_timeout_secs: u64,

    /// Upper bound on one model request
    pub model_timeout_secs: u64,
}

impl CommentaryConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, CommentaryError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CommentaryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CommentaryError::Config("GEMINI_API_KEY not set".into()))?;

        let stockfish_path =
            lookup("STOCKFISH_PATH").unwrap_or_else(|| "/usr/local/bin/stockfish".to_string());

        let gemini_model = lookup("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.0-flash".to_string());

        let gemini_api_url = lookup("GEMINI_API_URL")
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string());

        let parse = |key: &str, default: u64| -> u64 {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        Ok(Self {
            stockfish_path,
            gemini_api_key,
            gemini_model,
            gemini_api_url: gemini_api_url.trim_end_matches('/').to_string(),
            depth: parse("ANALYSIS_DEPTH", 20) as u32,
            lines: (parse("ANALYSIS_LINES", 3) as u32).min(MAX_LINES),
            engine_threads: parse("ENGINE_THREADS", 1) as u32,
            engine_hash_mb: parse("ENGINE_HASH_MB", 256) as u32,
            engine_timeout_secs: parse("ENGINE_TIMEOUT_SECS", 120),
            model_timeout_secs: parse("MODEL_TIMEOUT_SECS", 30),
        })
    }

    pub fn search_limit(&self) -> SearchLimit {
        SearchLimit {
            depth: self.depth,
            lines: self.lines,
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            path: self.stockfish_path.clone(),
            threads: self.engine_threads,
            hash_mb: self.engine_hash_mb,
            timeout: Duration::from_secs(self.engine_timeout_secs),
        }
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }
}
