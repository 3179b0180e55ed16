//! Stockfish engine wrapper using UCI protocol (async I/O)

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use tracing::debug;

use crate::engine::{AnalysisEngine, EnginePosition, PvLine, SearchLimit};
use crate::error::CommentaryError;

/// How to launch and bound a Stockfish process.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub path: String,
    pub threads: u32,
    pub hash_mb: u32,
    pub timeout: Duration,
}

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process and initialize UCI
    pub async fn new(options: &EngineOptions) -> Result<Self, CommentaryError> {
        let mut process = Command::new(&options.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CommentaryError::EngineSpawn(format!("{}: {e}", options.path)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| CommentaryError::EngineSpawn("stdin not captured".into()))?;
        let stdout = process
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| CommentaryError::EngineSpawn("stdout not captured".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout,
        };

        engine.handshake(options).await.map_err(|e| match e {
            CommentaryError::EngineUnavailable(msg) => CommentaryError::EngineSpawn(msg),
            other => other,
        })?;

        Ok(engine)
    }

    async fn handshake(&mut self, options: &EngineOptions) -> Result<(), CommentaryError> {
        self.send("uci").await?;
        self.wait_for("uciok").await?;

        self.send(&format!("setoption name Threads value {}", options.threads))
            .await?;
        self.send(&format!("setoption name Hash value {}", options.hash_mb))
            .await?;
        self.send("setoption name UCI_AnalyseMode value true").await?;
        self.send("isready").await?;
        self.wait_for("readyok").await
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), CommentaryError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| CommentaryError::EngineUnavailable(format!("write failed: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| CommentaryError::EngineUnavailable(format!("flush failed: {e}")))?;
        Ok(())
    }

    /// Read one line; end of stream means the process is gone.
    async fn read_line(&mut self, buf: &mut String) -> Result<(), CommentaryError> {
        buf.clear();
        let n = self
            .stdout
            .read_line(buf)
            .await
            .map_err(|e| CommentaryError::EngineUnavailable(format!("read failed: {e}")))?;
        if n == 0 {
            return Err(CommentaryError::EngineUnavailable(
                "Stockfish closed its output".into(),
            ));
        }
        Ok(())
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), CommentaryError> {
        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            let trimmed = line.trim();
            debug!(line = trimmed, "SF >");
            if trimmed == expected {
                return Ok(());
            }
        }
    }

    /// Analyse a position to a fixed depth with `limit.lines` PV lines.
    pub async fn analyse_position(
        &mut self,
        position: &EnginePosition,
        limit: SearchLimit,
    ) -> Result<Vec<PvLine>, CommentaryError> {
        let multipv = limit.lines.max(1);
        self.send(&format!("setoption name MultiPV value {multipv}"))
            .await?;
        self.send(&format!("position {position}")).await?;
        self.send(&format!("go depth {}", limit.depth.max(1))).await?;

        let mut lines: Vec<PvLine> = vec![PvLine::default(); multipv as usize];
        let mut line = String::new();

        loop {
            self.read_line(&mut line).await?;
            let trimmed = line.trim();

            if trimmed.starts_with("info") && trimmed.contains(" pv ") {
                // Later (deeper) info lines overwrite earlier ones
                let pv_idx = parse_multipv_index(trimmed).unwrap_or(1).max(1) - 1;
                if let Some(entry) = lines.get_mut(pv_idx as usize) {
                    entry.cp = parse_cp(trimmed);
                    entry.mate = parse_mate(trimmed);
                    entry.pv = parse_pv(trimmed);
                }
            } else if trimmed.starts_with("bestmove") {
                debug!(line = trimmed, "SF >");
                break;
            }
        }

        // Fewer legal moves than requested lines leaves trailing slots empty
        lines.retain(|l| !l.pv.is_empty());
        Ok(lines)
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }

    /// Kill the process without the UCI goodbye.
    pub async fn kill(&mut self) {
        let _ = self.process.kill().await;
    }
}

impl AnalysisEngine for StockfishEngine {
    async fn analyse(
        &mut self,
        position: &EnginePosition,
        limit: SearchLimit,
    ) -> Result<Vec<PvLine>, CommentaryError> {
        self.analyse_position(position, limit).await
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

/// Value following `key` in an info line
fn token_after<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let mut parts = line.split_whitespace();
    while let Some(part) = parts.next() {
        if part == key {
            return parts.next();
        }
        // Nothing after `pv` is a key
        if part == "pv" {
            return None;
        }
    }
    None
}

/// Parse centipawn score from info line
fn parse_cp(line: &str) -> Option<i32> {
    token_after(line, "cp")?.parse().ok()
}

/// Parse mate score from info line
fn parse_mate(line: &str) -> Option<i32> {
    token_after(line, "mate")?.parse().ok()
}

/// Parse multipv index from info line
fn parse_multipv_index(line: &str) -> Option<u32> {
    token_after(line, "multipv")?.parse().ok()
}

/// Parse PV moves from info line
fn parse_pv(line: &str) -> Vec<String> {
    line.split_whitespace()
        .skip_while(|part| *part != "pv")
        .skip(1)
        .take_while(|part| !part.starts_with("bmc") && *part != "string")
        .map(String::from)
        .collect()
}
