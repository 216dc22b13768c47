use std::fmt;
use std::str::FromStr;

use cozy_chess::Board;

use crate::fen::{format_fen, parse_fen, FenError};
use crate::types::PieceColor;

/// Immutable chess position: placement, side to move, castling and en-passant rights.
///
/// Only three things can produce one: [`Position::standard`],
/// [`Position::from_fen`], and the rules module applying a legal move to an
/// existing position. There is no mutable access to the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    board: Board,
}

impl Position {
    /// The standard initial position.
    pub fn standard() -> Self {
        Self {
            board: Board::default(),
        }
    }

    /// Parse a position from FEN.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        parse_fen(fen).map(|board| Self { board })
    }

    /// Successor constructor, reserved for the rules module.
    pub(crate) fn from_board(board: Board) -> Self {
        Self { board }
    }

    pub(crate) fn board(&self) -> &Board {
        &self.board
    }

    /// Serialized board state, as rendered by a board widget.
    pub fn fen(&self) -> String {
        format_fen(&self.board)
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.board.side_to_move().into()
    }

    /// Whether the side to move has no legal moves left.
    pub fn is_terminal(&self) -> bool {
        crate::rules::legal_moves(&self.board).is_empty()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::standard()
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fen())
    }
}
