use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use commentator::session;

use crate::config::Config;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct AnalyzeGameRequest {
    pub pgn: String,
}

/// POST /api/games/analyze
///
/// Runs a whole game through its own Stockfish process; the shared live
/// engine is not touched.
pub async fn analyze_game(
    Extension(config): Extension<Config>,
    Json(req): Json<AnalyzeGameRequest>,
) -> Result<Json<JsonValue>, AppError> {
    if req.pgn.trim().is_empty() {
        return Err(AppError::BadRequest("pgn is required".into()));
    }

    let report = session::analyze_game(&config.commentary, &req.pgn).await?;

    Ok(Json(serde_json::json!({
        "report": report.render(),
        "metadata": report.metadata,
        "moves": report.moves,
    })))
}
