//! Live sessions: one board per connection, one reply per command.

mod common;

use common::{DownModel, EchoModel, ScriptedEngine};

use chess_core::notation;
use commentator::engine::SearchLimit;
use commentator::live::{Analyst, ClientCommand, LiveSession, ServerEvent};
use shakmaty::{Chess, Position};

const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

fn analyst<M>(model: M) -> Analyst<ScriptedEngine, M>
where
    M: commentator::narrative::TextModel,
{
    Analyst::new(
        ScriptedEngine::new(-25),
        model,
        SearchLimit { depth: 12, lines: 3 },
    )
}

#[tokio::test]
async fn test_analyze_position_replies_with_analysis() {
    let analyst = analyst(EchoModel);
    let mut session = LiveSession::new();

    let event = session
        .handle_text(
            &format!(r#"{{"command":"analyze_position","fen":"{AFTER_E4}","last_move":"e4"}}"#),
            &analyst,
        )
        .await
        .expect("analysis reply");

    match event {
        ServerEvent::Analysis {
            score,
            best_move,
            analysis,
            pv,
        } => {
            assert!((score + 0.25).abs() < 1e-9);
            assert_eq!(best_move.len(), 4, "best move is UCI: {best_move}");
            assert_eq!(analysis, "Move: e4 by White");
            assert_eq!(pv.len(), 3);
        }
        other => panic!("expected analysis, got {other:?}"),
    }

    let expected = notation::parse_fen(AFTER_E4).unwrap();
    assert_eq!(session.board().board(), expected.board());
    assert_eq!(session.board().turn(), expected.turn());
}

#[tokio::test]
async fn test_missing_last_move_is_unknown() {
    let analyst = analyst(EchoModel);
    let mut session = LiveSession::new();

    let event = session
        .handle(
            ClientCommand::AnalyzePosition {
                fen: Some(AFTER_E4.to_string()),
                last_move: None,
            },
            &analyst,
        )
        .await;

    let Some(ServerEvent::Analysis { analysis, .. }) = event else {
        panic!("expected analysis, got {event:?}");
    };
    assert_eq!(analysis, "Move: unknown by White");
}

#[tokio::test]
async fn test_invalid_fen_leaves_board_alone() {
    let analyst = analyst(EchoModel);
    let mut session = LiveSession::new();

    session
        .handle(
            ClientCommand::AnalyzePosition {
                fen: Some(AFTER_E4.to_string()),
                last_move: Some("e4".into()),
            },
            &analyst,
        )
        .await;
    let before = session.board().clone();

    let event = session
        .handle(
            ClientCommand::AnalyzePosition {
                fen: Some("not a fen".into()),
                last_move: None,
            },
            &analyst,
        )
        .await;

    assert_eq!(event, Some(ServerEvent::error("Invalid FEN position")));
    assert_eq!(session.board().board(), before.board());
    assert_eq!(session.board().turn(), before.turn());
}

#[tokio::test]
async fn test_missing_fen_is_an_error() {
    let analyst = analyst(EchoModel);
    let mut session = LiveSession::new();

    let event = session
        .handle_text(r#"{"command":"analyze_position"}"#, &analyst)
        .await;
    assert_eq!(event, Some(ServerEvent::error("FEN position required")));

    let event = session
        .handle_text(r#"{"command":"analyze_position","fen":"  "}"#, &analyst)
        .await;
    assert_eq!(event, Some(ServerEvent::error("FEN position required")));
}

#[tokio::test]
async fn test_reset_restores_start_position() {
    let analyst = analyst(EchoModel);
    let mut session = LiveSession::new();

    session
        .handle(
            ClientCommand::AnalyzePosition {
                fen: Some(AFTER_E4.to_string()),
                last_move: Some("e4".into()),
            },
            &analyst,
        )
        .await;
    assert_ne!(session.board().turn(), Chess::default().turn());

    let event = session.handle_text(r#"{"command":"reset"}"#, &analyst).await;
    assert_eq!(event, Some(ServerEvent::ResetConfirmed));
    assert_eq!(session.board().board(), Chess::default().board());
    assert_eq!(session.board().turn(), Chess::default().turn());
}

#[tokio::test]
async fn test_unknown_command_gets_no_reply() {
    let analyst = analyst(EchoModel);
    let mut session = LiveSession::new();

    let event = session
        .handle_text(r#"{"command":"resign"}"#, &analyst)
        .await;
    assert_eq!(event, None);
}

#[tokio::test]
async fn test_garbage_frame_is_an_error() {
    let analyst = analyst(EchoModel);
    let mut session = LiveSession::new();

    let event = session.handle_text("{not json", &analyst).await;
    let Some(ServerEvent::Error { message }) = event else {
        panic!("expected error, got {event:?}");
    };
    assert!(message.starts_with("Invalid message:"), "{message}");
}

#[tokio::test]
async fn test_model_failure_is_still_an_analysis() {
    let analyst = analyst(DownModel);
    let mut session = LiveSession::new();

    let event = session
        .handle(
            ClientCommand::AnalyzePosition {
                fen: Some(AFTER_E4.to_string()),
                last_move: Some("e4".into()),
            },
            &analyst,
        )
        .await;

    let Some(ServerEvent::Analysis { analysis, .. }) = event else {
        panic!("expected analysis, got {event:?}");
    };
    assert!(analysis.starts_with("Error analyzing position:"), "{analysis}");
}

#[tokio::test]
async fn test_checkmated_position_reports_failure() {
    let analyst = analyst(EchoModel);
    let mut session = LiveSession::new();
    // Fool's mate, white to move and mated
    let fen = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";

    let event = session
        .handle(
            ClientCommand::AnalyzePosition {
                fen: Some(fen.to_string()),
                last_move: Some("Qh4#".into()),
            },
            &analyst,
        )
        .await;

    let Some(ServerEvent::Error { message }) = event else {
        panic!("expected error, got {event:?}");
    };
    assert!(message.starts_with("Analysis failed:"), "{message}");
}

#[test]
fn test_event_wire_format() {
    let event = ServerEvent::Analysis {
        score: 0.3,
        best_move: "e2e4".into(),
        analysis: "text".into(),
        pv: vec!["e4 e5".into()],
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "analysis");
    assert_eq!(json["bestMove"], "e2e4");

    let json = serde_json::to_value(ServerEvent::ResetConfirmed).unwrap();
    assert_eq!(json["type"], "reset_confirmed");
}
