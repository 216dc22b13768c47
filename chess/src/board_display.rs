//! Plain-text board rendering for terminals and logs.

use cozy_chess::{File, Rank, Square};

use crate::position::Position;
use crate::types::{PieceColor, PieceKind};

/// An 8x8 snapshot of piece placement, indexed `[rank][file]` from a1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayBoard {
    squares: [[Option<(PieceKind, PieceColor)>; 8]; 8],
}

impl DisplayBoard {
    pub fn from_position(position: &Position) -> Self {
        let board = position.board();
        let mut squares = [[None; 8]; 8];
        for (rank, row) in squares.iter_mut().enumerate() {
            for (file, cell) in row.iter_mut().enumerate() {
                let sq = Square::new(File::index(file), Rank::index(rank));
                *cell = board
                    .piece_on(sq)
                    .zip(board.color_on(sq))
                    .map(|(piece, color)| (piece.into(), color.into()));
            }
        }
        Self { squares }
    }

    pub fn piece_at(&self, file: u8, rank: u8) -> Option<(PieceKind, PieceColor)> {
        if file > 7 || rank > 7 {
            return None;
        }
        self.squares[rank as usize][file as usize]
    }

    /// Render as text with rank and file labels, `perspective` at the bottom.
    /// Empty squares are `.`; `highlight` squares are bracketed.
    pub fn render(&self, perspective: PieceColor, highlight: &[Square]) -> String {
        let ranks: Vec<usize> = match perspective {
            PieceColor::White => (0..8).rev().collect(),
            PieceColor::Black => (0..8).collect(),
        };
        let files: Vec<usize> = match perspective {
            PieceColor::White => (0..8).collect(),
            PieceColor::Black => (0..8).rev().collect(),
        };

        let mut out = String::new();
        for &rank in &ranks {
            out.push_str(&format!("{} ", rank + 1));
            for &file in &files {
                let glyph = self.squares[rank][file]
                    .map(|(kind, color)| kind.glyph(color))
                    .unwrap_or('.');
                let sq = Square::new(File::index(file), Rank::index(rank));
                if highlight.contains(&sq) {
                    out.push_str(&format!("[{}]", glyph));
                } else {
                    out.push_str(&format!(" {} ", glyph));
                }
            }
            out.push('\n');
        }
        out.push_str("  ");
        for &file in &files {
            out.push_str(&format!(" {} ", (b'a' + file as u8) as char));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uci::parse_square;

    #[test]
    fn test_starting_position() {
        let board = DisplayBoard::from_position(&Position::standard());
        assert_eq!(
            board.piece_at(0, 0),
            Some((PieceKind::Rook, PieceColor::White))
        );
        assert_eq!(
            board.piece_at(4, 0),
            Some((PieceKind::King, PieceColor::White))
        );
        assert_eq!(
            board.piece_at(3, 7),
            Some((PieceKind::Queen, PieceColor::Black))
        );
        assert_eq!(board.piece_at(4, 4), None);
        assert_eq!(board.piece_at(8, 0), None);
    }

    #[test]
    fn render_white_perspective_puts_rank_eight_on_top() {
        let text = DisplayBoard::from_position(&Position::standard()).render(PieceColor::White, &[]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("8  r  n  b  q  k"));
        assert!(lines[7].starts_with("1  R  N  B  Q  K"));
        assert!(lines[8].contains(" a  b  c"));
    }

    #[test]
    fn render_black_perspective_and_highlights() {
        let board = DisplayBoard::from_position(&Position::standard());
        let text = board.render(PieceColor::Black, &[parse_square("h1").unwrap()]);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("1 [R] N  B  K  Q"));
        assert!(lines[8].contains(" h  g  f"));
    }
}
