//! PGN parsing utilities: a lightweight regex-based parser.
//!
//! Accepts full PGN (headers, comments, variations, NAGs) as well as bare
//! movetext such as `1. e4 e5 2. Nf3`.

use std::sync::LazyLock;

use regex::Regex;

use crate::game_data::{GameData, GameMetadata};

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#).expect("valid header regex"));
static HEADER_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid header line regex"));
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}|;[^\n]*").expect("valid comment regex"));
static VARIATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^()]*\)").expect("valid variation regex"));
static MOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?|O-O-O[+#]?|O-O[+#]?")
        .expect("valid move regex")
});

/// Parse a PGN string into a GameData struct.
///
/// Returns `None` when no game can be read: no moves and no custom starting
/// position.
pub fn parse_pgn(pgn: &str) -> Option<GameData> {
    let mut metadata = GameMetadata {
        white: "Unknown".to_string(),
        black: "Unknown".to_string(),
        result: "*".to_string(),
        ..GameMetadata::default()
    };
    let mut setup = None;
    let mut fen = None;

    for cap in HEADER_RE.captures_iter(pgn) {
        let key = &cap[1];
        let value = cap[2].to_string();
        match key {
            "White" => metadata.white = value,
            "Black" => metadata.black = value,
            "Result" => metadata.result = value,
            "Date" => metadata.date = Some(value),
            "Event" => metadata.event = Some(value),
            "Opening" => metadata.opening = Some(value),
            "ECO" => metadata.eco = Some(value),
            "SetUp" => setup = Some(value),
            "FEN" => fen = Some(value),
            _ => {}
        }
    }

    // A FEN header without SetUp is still honoured, as most readers do.
    let start_fen = match (setup.as_deref(), fen) {
        (Some("0"), _) => None,
        (_, f) => f,
    };

    let moves = extract_moves(pgn);

    if moves.is_empty() && start_fen.is_none() {
        return None;
    }

    Some(GameData {
        metadata,
        start_fen,
        moves,
    })
}

/// Extract SAN moves from PGN text (after removing headers, comments, variations).
fn extract_moves(pgn: &str) -> Vec<String> {
    let no_headers = HEADER_LINE_RE.replace_all(pgn, "");
    let no_comments = COMMENT_RE.replace_all(&no_headers, "");

    // Variations may nest; strip innermost first until none are left.
    let mut movetext = no_comments.into_owned();
    while VARIATION_RE.is_match(&movetext) {
        movetext = VARIATION_RE.replace_all(&movetext, "").into_owned();
    }

    MOVE_RE
        .find_iter(&movetext)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pgn_basic() {
        let pgn = r#"[White "Player1"]
[Black "Player2"]
[Result "1-0"]
[Date "2025.01.15"]

1. e4 e5 2. Nf3 Nc6 1-0"#;

        let game = parse_pgn(pgn).unwrap();
        assert_eq!(game.metadata.white, "Player1");
        assert_eq!(game.metadata.black, "Player2");
        assert_eq!(game.metadata.result, "1-0");
        assert_eq!(game.moves, vec!["e4", "e5", "Nf3", "Nc6"]);
        assert!(game.start_fen.is_none());
    }

    #[test]
    fn test_parse_bare_movetext() {
        let game = parse_pgn("e4 e5 Nf3").unwrap();
        assert_eq!(game.moves.len(), 3);
        assert_eq!(game.metadata.white, "Unknown");
    }

    #[test]
    fn test_comments_and_nested_variations_are_skipped() {
        let pgn = "1. e4 {best by test} e5 (1... c5 2. Nf3 (2. c3 d5) d6) 2. Nf3 ; aside\n2... Nc6 *";
        let game = parse_pgn(pgn).unwrap();
        assert_eq!(game.moves, vec!["e4", "e5", "Nf3", "Nc6"]);
    }

    #[test]
    fn test_castling_and_promotion_tokens() {
        let game = parse_pgn("10. O-O-O+ exd8=Q# 11. O-O").unwrap();
        assert_eq!(game.moves, vec!["O-O-O+", "exd8=Q#", "O-O"]);
    }

    #[test]
    fn test_setup_header_sets_start_position() {
        let pgn = r#"[SetUp "1"]
[FEN "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"]

1. e4 *"#;
        let game = parse_pgn(pgn).unwrap();
        assert_eq!(
            game.start_fen.as_deref(),
            Some("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1")
        );
    }

    #[test]
    fn test_empty_input_is_no_game() {
        assert!(parse_pgn("").is_none());
        assert!(parse_pgn("[Event \"Casual\"]\n\n*").is_none());
    }
}
