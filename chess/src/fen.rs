use cozy_chess::Board;

/// FEN of the standard starting position.
pub const STANDARD_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parse a FEN string into a Board
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    let trimmed = fen.trim();
    let fields = trimmed.split_whitespace().count();
    if fields == 0 {
        return Err(FenError::Empty);
    }
    if fields != 6 {
        return Err(FenError::FieldCount(fields));
    }

    trimmed
        .parse()
        .map_err(|_| FenError::InvalidFormat(trimmed.to_string()))
}

/// Format a Board as a FEN string
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Empty FEN string")]
    Empty,
    #[error("Expected 6 FEN fields, found {0}")]
    FieldCount(usize),
    #[error("Invalid FEN: {0}")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_fen_matches_default_board() {
        let board = parse_fen(STANDARD_FEN).unwrap();
        assert_eq!(board, Board::default());
        assert_eq!(format_fen(&board), STANDARD_FEN);
    }

    #[test]
    fn rejects_empty_and_truncated_fens() {
        assert_eq!(parse_fen("   "), Err(FenError::Empty));
        assert_eq!(
            parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w"),
            Err(FenError::FieldCount(2))
        );
    }

    #[test]
    fn rejects_garbage_board() {
        assert!(matches!(
            parse_fen("not/a/board/at/all/x/y/z w KQkq - 0 1"),
            Err(FenError::InvalidFormat(_))
        ));
    }
}
