//! Natural-language commentary for a move: classify, build a prompt, ask the model.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use chess_core::Side;

use crate::analysis::PositionAnalysis;

/// Magnitude below which the position counts as level
const EQUAL_BELOW: f64 = 0.5;
const DECISIVE_ABOVE: f64 = 2.0;
const CLEAR_ABOVE: f64 = 1.0;
const SLIGHT_ABOVE: f64 = 0.5;

/// Candidate lines quoted in the prompt
const PROMPT_LINES: usize = 3;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("model returned no text")]
    EmptyResponse,
}

/// A text-completion backend.
#[allow(async_fn_in_trait)]
pub trait TextModel {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveQuality {
    Equal,
    Excellent,
    Blunder,
    Good,
    Mistake,
    Solid,
    Inaccuracy,
}

impl MoveQuality {
    pub fn label(self) -> &'static str {
        match self {
            MoveQuality::Equal => "Equal position",
            MoveQuality::Excellent => "Excellent move!",
            MoveQuality::Blunder => "Blunder",
            MoveQuality::Good => "Good move",
            MoveQuality::Mistake => "Mistake",
            MoveQuality::Solid => "Solid move",
            MoveQuality::Inaccuracy => "Inaccuracy",
        }
    }
}

impl fmt::Display for MoveQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Grade a score (pawns, positive favours the mover).
///
/// Rungs are checked in order with strict comparisons, so exactly 2.0 is
/// `Good`/`Mistake` and exactly 0.5 matches nothing.
pub fn classify(score: f64) -> Option<MoveQuality> {
    let magnitude = score.abs();
    let favourable = score > 0.0;

    if magnitude < EQUAL_BELOW {
        Some(MoveQuality::Equal)
    } else if magnitude > DECISIVE_ABOVE {
        Some(if favourable { MoveQuality::Excellent } else { MoveQuality::Blunder })
    } else if magnitude > CLEAR_ABOVE {
        Some(if favourable { MoveQuality::Good } else { MoveQuality::Mistake })
    } else if magnitude > SLIGHT_ABOVE {
        Some(if favourable { MoveQuality::Solid } else { MoveQuality::Inaccuracy })
    } else {
        None
    }
}

/// Build the commentary prompt for `played_move` by `side`.
pub fn build_prompt(analysis: &PositionAnalysis, played_move: &str, side: Side) -> String {
    let quality = classify(analysis.score).map(MoveQuality::label).unwrap_or("");
    let best_line = analysis
        .candidate_lines
        .iter()
        .take(PROMPT_LINES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    let best_move = &analysis.best_move;
    let score = analysis.formatted_score();

    format!(
        r#"You are commenting on a chess game for a beginner, like a game review on a chess site.
Move: {played_move} by {side}
Evaluation: {quality} (Score: {score})
Stockfish's best move: {best_move}
Best continuation: {best_line}

Reply with one or two short bullet points:
* Name the opening or book line if the move is a known book move.
* Open with the move quality (Excellent/Good/Solid/Inaccuracy/Mistake/Blunder) and say in plain words why it is good or bad.
* If the move was not the best one, mention that Stockfish suggests {best_move}.
Keep it friendly and encouraging, avoid jargon, use short sentences and do not repeat yourself.

Example:
* Sicilian Defense: Najdorf Variation.
* Inaccuracy. This weakens the kingside pawns. Stockfish suggests Nf3, keeping control of e5."#
    )
}

/// Ask `model` to explain `played_move`.
pub async fn explain<M: TextModel>(
    model: &M,
    analysis: &PositionAnalysis,
    played_move: &str,
    side: Side,
) -> Result<String, GenerationError> {
    let prompt = build_prompt(analysis, played_move, side);
    debug!(played_move, %side, "Requesting commentary");
    let text = model.generate(&prompt).await?;
    Ok(text.trim().to_string())
}

/// Commentary text, with a failure rendered inline instead of propagated.
pub fn render(result: Result<String, GenerationError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Commentary generation failed");
            format!("Error analyzing position: {e}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(score: f64) -> PositionAnalysis {
        PositionAnalysis {
            score,
            raw_cp: (score * 100.0) as i32,
            mate: None,
            candidate_lines: vec!["Nf3 Nc6 Bb5 a6".into(), "d4 exd4".into()],
            best_move: "g1f3".into(),
        }
    }

    struct Echo;

    impl TextModel for Echo {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            Ok(format!("  {}  \n", prompt.lines().nth(1).unwrap_or_default()))
        }
    }

    struct Broken;

    impl TextModel for Broken {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Api {
                status: 429,
                message: "quota exceeded".into(),
            })
        }
    }

    #[test]
    fn test_classification_ladder() {
        assert_eq!(classify(0.0), Some(MoveQuality::Equal));
        assert_eq!(classify(-0.49), Some(MoveQuality::Equal));
        assert_eq!(classify(0.75), Some(MoveQuality::Solid));
        assert_eq!(classify(-0.75), Some(MoveQuality::Inaccuracy));
        assert_eq!(classify(1.5), Some(MoveQuality::Good));
        assert_eq!(classify(-1.5), Some(MoveQuality::Mistake));
        assert_eq!(classify(3.1), Some(MoveQuality::Excellent));
        assert_eq!(classify(-100.0), Some(MoveQuality::Blunder));
    }

    #[test]
    fn test_classification_boundaries_are_strict() {
        assert_eq!(classify(2.0), Some(MoveQuality::Good));
        assert_eq!(classify(-2.0), Some(MoveQuality::Mistake));
        assert_eq!(classify(1.0), Some(MoveQuality::Solid));
        assert_eq!(classify(0.5), None);
        assert_eq!(classify(-0.5), None);
    }

    #[test]
    fn test_prompt_embeds_analysis() {
        let prompt = build_prompt(&analysis(1.234), "e4", Side::White);
        assert!(prompt.contains("Move: e4 by White"));
        assert!(prompt.contains("Evaluation: Good move (Score: +1.23)"));
        assert!(prompt.contains("Stockfish's best move: g1f3"));
        assert!(prompt.contains("Best continuation: Nf3 Nc6 Bb5 a6 d4 exd4\n"));
    }

    #[test]
    fn test_prompt_joins_top_three_lines() {
        let mut a = analysis(0.2);
        a.candidate_lines = vec![
            "e4 e5 Nf3 Nc6".into(),
            "d4 d5".into(),
            "Nf3 d5".into(),
            "c4 e5".into(),
        ];
        let prompt = build_prompt(&a, "e4", Side::White);
        assert!(prompt.contains("Best continuation: e4 e5 Nf3 Nc6 d4 d5 Nf3 d5\n"));
    }

    #[test]
    fn test_prompt_with_unclassified_score() {
        let prompt = build_prompt(&analysis(-0.5), "Qh5", Side::Black);
        assert!(prompt.contains("Evaluation:  (Score: -0.50)"));
    }

    #[tokio::test]
    async fn test_explain_trims_model_text() {
        let text = explain(&Echo, &analysis(0.1), "d4", Side::White).await.unwrap();
        assert_eq!(text, "Move: d4 by White");
    }

    #[tokio::test]
    async fn test_failure_rendered_inline() {
        let result = explain(&Broken, &analysis(0.1), "d4", Side::White).await;
        assert_eq!(
            render(result),
            "Error analyzing position: API returned 429: quota exceeded"
        );
    }
}
