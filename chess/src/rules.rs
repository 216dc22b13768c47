//! Legal-move application. Every non-root [`Position`] is built here.

use std::fmt;
use std::str::FromStr;

use cozy_chess::{Board, Move, Piece, Square};

use crate::position::Position;
use crate::san::parse_san;
use crate::types::PieceKind;
use crate::uci::{
    convert_uci_castling_to_cozy, cozy_castling_to_standard, format_square, parse_square,
    parse_uci_move,
};

/// A from/to move request, as reported by a drag-and-drop board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveAttempt {
    pub from: Square,
    pub to: Square,
    /// Piece to promote to; `None` auto-queens when promotion is required.
    pub promotion: Option<PieceKind>,
}

impl MoveAttempt {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, piece: PieceKind) -> Self {
        self.promotion = Some(piece);
        self
    }

    /// Build an attempt from two square names such as `"e2"` and `"e4"`.
    pub fn parse(from: &str, to: &str) -> Result<Self, RulesError> {
        let from_sq = parse_square(from).ok_or_else(|| RulesError::InvalidSquare(from.into()))?;
        let to_sq = parse_square(to).ok_or_else(|| RulesError::InvalidSquare(to.into()))?;
        Ok(Self::new(from_sq, to_sq))
    }
}

impl FromStr for MoveAttempt {
    type Err = RulesError;

    /// Parses UCI-style text: `e2e4`, `e7e8q`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mv = parse_uci_move(s).ok_or_else(|| RulesError::InvalidMove(s.into()))?;
        Ok(Self {
            from: mv.from,
            to: mv.to,
            promotion: mv.promotion.map(PieceKind::from),
        })
    }
}

impl fmt::Display for MoveAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_square(self.from), format_square(self.to))?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.san_letter().to_ascii_lowercase())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
    #[error("Invalid move: {0}")]
    InvalidMove(String),
}

/// A recorded move that could not be played while replaying a line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("move {index} ({notation}) is not legal in the replayed position")]
pub struct ReplayError {
    /// 0-based index into the replayed sequence.
    pub index: usize,
    pub notation: String,
}

pub(crate) fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

/// Apply a from/to attempt. `None` means the move is illegal.
pub fn apply_move(position: &Position, attempt: MoveAttempt) -> Option<Position> {
    let board = position.board();
    let mv = resolve_attempt(board, attempt)?;
    Some(play(board, mv))
}

/// Apply a recorded move in SAN or UCI notation. `None` means it is
/// unparseable or illegal here.
pub fn apply_notation(position: &Position, notation: &str) -> Option<Position> {
    let board = position.board();
    let mv = parse_notation(board, notation)?;
    Some(play(board, mv))
}

/// From/to squares of a recorded move, castling given as the king's path.
pub fn resolve_notation(position: &Position, notation: &str) -> Option<MoveAttempt> {
    let board = position.board();
    let mv = cozy_castling_to_standard(board, parse_notation(board, notation)?);
    Some(MoveAttempt {
        from: mv.from,
        to: mv.to,
        promotion: mv.promotion.map(PieceKind::from),
    })
}

/// Legal destinations for the piece on `from`, castling given as the king's path.
pub fn legal_targets(position: &Position, from: Square) -> Vec<Square> {
    let board = position.board();
    let mut targets: Vec<Square> = legal_moves(board)
        .into_iter()
        .filter(|mv| mv.from == from)
        .map(|mv| cozy_castling_to_standard(board, mv).to)
        .collect();
    targets.sort_by_key(|sq| *sq as usize);
    targets.dedup();
    targets
}

/// Play a sequence of recorded moves from `start`.
pub fn replay<'a, I>(start: &Position, moves: I) -> Result<Position, ReplayError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut position = start.clone();
    for (index, notation) in moves.into_iter().enumerate() {
        position = apply_notation(&position, notation).ok_or_else(|| ReplayError {
            index,
            notation: notation.to_string(),
        })?;
    }
    Ok(position)
}

fn resolve_attempt(board: &Board, attempt: MoveAttempt) -> Option<Move> {
    let legal = legal_moves(board);
    let raw = Move {
        from: attempt.from,
        to: attempt.to,
        promotion: attempt.promotion.map(Piece::from),
    };

    let mv = convert_uci_castling_to_cozy(board, raw, &legal);
    if legal.contains(&mv) {
        return Some(mv);
    }

    if attempt.promotion.is_none() {
        let queen = Move {
            promotion: Some(Piece::Queen),
            ..raw
        };
        if legal.contains(&queen) {
            return Some(queen);
        }
    }

    None
}

fn parse_notation(board: &Board, notation: &str) -> Option<Move> {
    if let Some(raw) = parse_uci_move(notation) {
        let legal = legal_moves(board);
        let mv = convert_uci_castling_to_cozy(board, raw, &legal);
        if legal.contains(&mv) {
            return Some(mv);
        }
    }
    parse_san(board, notation).ok()
}

fn play(board: &Board, mv: Move) -> Position {
    let mut next = board.clone();
    next.play_unchecked(mv);
    Position::from_board(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn attempt(from: &str, to: &str) -> MoveAttempt {
        MoveAttempt::parse(from, to).unwrap()
    }

    #[test]
    fn legal_attempt_produces_successor() {
        let start = Position::standard();
        let next = apply_move(&start, attempt("e2", "e4")).unwrap();
        assert_eq!(next.side_to_move(), crate::PieceColor::Black);
        assert_eq!(Some(next), apply_notation(&start, "e4"));
    }

    #[test]
    fn illegal_attempt_is_none() {
        let start = Position::standard();
        assert_eq!(apply_move(&start, attempt("e2", "e5")), None);
        assert_eq!(apply_move(&start, attempt("e7", "e5")), None);
        assert_eq!(apply_move(&start, attempt("a3", "a4")), None);
    }

    #[test]
    fn san_and_uci_notation_agree() {
        let start = Position::standard();
        assert_eq!(apply_notation(&start, "Nf3"), apply_notation(&start, "g1f3"));
        assert_eq!(apply_notation(&start, "Nf6"), None);
        assert_eq!(apply_notation(&start, ""), None);
    }

    #[test]
    fn king_two_squares_castles() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let by_drag = apply_move(&pos, attempt("e1", "g1")).unwrap();
        let by_san = apply_notation(&pos, "O-O").unwrap();
        let by_uci = apply_notation(&pos, "e1g1").unwrap();
        assert_eq!(by_drag, by_san);
        assert_eq!(by_drag, by_uci);
        assert!(by_drag.fen().starts_with("r3k2r/8/8/8/8/8/8/R4RK1 b"));
    }

    #[test]
    fn rook_drag_along_back_rank_lands_where_dropped() {
        let pos = Position::from_fen("3k4/8/8/8/8/8/K7/4R3 w - - 0 1").unwrap();
        let dragged = apply_move(&pos, attempt("e1", "g1")).unwrap();
        assert!(dragged.fen().starts_with("3k4/8/8/8/8/8/K7/6R1 b"));
        assert_eq!(apply_notation(&pos, "e1g1"), Some(dragged.clone()));
        assert_eq!(apply_notation(&pos, "Rg1"), Some(dragged));
    }

    #[test]
    fn promotion_defaults_to_queen() {
        let pos = Position::from_fen("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let queened = apply_move(&pos, attempt("e7", "e8")).unwrap();
        assert_eq!(Some(queened.clone()), apply_notation(&pos, "e8=Q"));

        let knighted = apply_move(&pos, attempt("e7", "e8").with_promotion(PieceKind::Knight));
        assert_eq!(knighted, apply_notation(&pos, "e7e8n"));
        assert_ne!(knighted, Some(queened));
    }

    #[test]
    fn resolve_notation_reports_king_path_for_castling() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let castle = resolve_notation(&pos, "O-O-O").unwrap();
        assert_eq!(castle.to_string(), "e1c1");
        assert_eq!(
            resolve_notation(&Position::standard(), "Nc3").unwrap().to_string(),
            "b1c3"
        );
    }

    #[test]
    fn legal_targets_for_knight_and_empty_square() {
        let start = Position::standard();
        let targets: Vec<String> = legal_targets(&start, parse_square("g1").unwrap())
            .into_iter()
            .map(format_square)
            .collect();
        assert_eq!(targets, vec!["f3", "h3"]);
        assert!(legal_targets(&start, parse_square("e4").unwrap()).is_empty());
    }

    #[test]
    fn replay_reports_first_illegal_move() {
        let start = Position::standard();
        let err = replay(&start, ["e4", "e5", "Ke3"]).unwrap_err();
        assert_eq!(
            err,
            ReplayError {
                index: 2,
                notation: "Ke3".into()
            }
        );
        assert!(replay(&start, ["e4", "e5", "Ke2"]).is_ok());
    }

    #[test]
    fn move_attempt_parses_from_text() {
        let a: MoveAttempt = "e7e8q".parse().unwrap();
        assert_eq!(a.promotion, Some(PieceKind::Queen));
        assert_eq!(a.to_string(), "e7e8q");
        assert!(MoveAttempt::parse("e2", "z9").is_err());
        assert!("nonsense".parse::<MoveAttempt>().is_err());
    }

    /// Walk a random legal line, choosing move `i % n` at each step.
    fn random_line(choices: &[usize]) -> Vec<String> {
        let mut position = Position::standard();
        let mut line = Vec::new();
        for choice in choices {
            let legal = legal_moves(position.board());
            if legal.is_empty() {
                break;
            }
            let mv = legal[choice % legal.len()];
            line.push(crate::uci::format_uci_move(cozy_castling_to_standard(
                position.board(),
                mv,
            )));
            position = play(position.board(), mv);
        }
        line
    }

    proptest! {
        #[test]
        fn replay_is_incremental(choices in proptest::collection::vec(0usize..64, 0..40), split in 0usize..40) {
            let line = random_line(&choices);
            let start = Position::standard();
            let full = replay(&start, line.iter().map(String::as_str)).unwrap();

            let k = split.min(line.len());
            let prefix = replay(&start, line[..k].iter().map(String::as_str)).unwrap();
            let rest = replay(&prefix, line[k..].iter().map(String::as_str)).unwrap();
            prop_assert_eq!(full, rest);
        }
    }
}
