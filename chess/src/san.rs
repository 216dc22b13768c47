//! Standard Algebraic Notation parsing against a concrete board.

use cozy_chess::{Board, Move, Piece, Square};

use crate::rules::legal_moves;
use crate::types::PieceKind;
use crate::uci::parse_square;

/// Parse a SAN move (`e4`, `Nbd7`, `exd5`, `O-O`, `e8=Q+`) into the legal
/// cozy-chess move it denotes.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let body = san
        .trim()
        .trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));
    if body.is_empty() || !body.is_ascii() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    let legal = legal_moves(board);

    if let Some(kingside) = castling_side(body) {
        return legal
            .into_iter()
            .find(|mv| is_castle(board, *mv) == Some(kingside))
            .ok_or_else(|| SanError::NoLegalMove(san.to_string()));
    }

    let pattern = SanPattern::parse(body).ok_or_else(|| SanError::InvalidFormat(san.to_string()))?;

    let mut candidates = legal
        .into_iter()
        .filter(|mv| is_castle(board, *mv).is_none() && pattern.matches(board, *mv));

    match (candidates.next(), candidates.next()) {
        (Some(mv), None) => Ok(mv),
        (None, _) => Err(SanError::NoLegalMove(san.to_string())),
        (Some(_), Some(_)) => Err(SanError::AmbiguousMove(san.to_string())),
    }
}

/// Decomposed non-castling SAN token.
#[derive(Debug, PartialEq)]
struct SanPattern {
    piece: Piece,
    from_file: Option<u8>,
    from_rank: Option<u8>,
    to: Square,
    promotion: Option<Piece>,
}

impl SanPattern {
    fn parse(body: &str) -> Option<Self> {
        let (body, promotion) = split_promotion(body)?;

        let (piece, rest) = match body.chars().next()? {
            c @ ('N' | 'B' | 'R' | 'Q' | 'K') => (PieceKind::from_char(c)?.into(), &body[1..]),
            _ => (Piece::Pawn, body),
        };

        let squares: String = rest.chars().filter(|&c| c != 'x' && c != '-').collect();
        if squares.len() < 2 || squares.len() > 4 {
            return None;
        }
        let (hint, dest) = squares.split_at(squares.len() - 2);
        let to = parse_square(dest)?;

        let mut from_file = None;
        let mut from_rank = None;
        for b in hint.bytes() {
            match b {
                b'a'..=b'h' if from_file.is_none() => from_file = Some(b - b'a'),
                b'1'..=b'8' if from_rank.is_none() => from_rank = Some(b - b'1'),
                _ => return None,
            }
        }

        if promotion.is_some() && piece != Piece::Pawn {
            return None;
        }

        Some(Self {
            piece,
            from_file,
            from_rank,
            to,
            promotion,
        })
    }

    fn matches(&self, board: &Board, mv: Move) -> bool {
        board.piece_on(mv.from) == Some(self.piece)
            && mv.to == self.to
            && mv.promotion == self.promotion
            && self.from_file.map_or(true, |f| mv.from.file() as u8 == f)
            && self.from_rank.map_or(true, |r| mv.from.rank() as u8 == r)
    }
}

/// Split a trailing promotion (`=Q` or bare `Q` after the rank digit).
fn split_promotion(body: &str) -> Option<(&str, Option<Piece>)> {
    if let Some((head, piece)) = body.split_once('=') {
        let mut chars = piece.chars();
        let kind = PieceKind::from_char(chars.next()?).filter(|k| k.is_promotion_target())?;
        if chars.next().is_some() {
            return None;
        }
        return Some((head, Some(kind.into())));
    }

    let bytes = body.as_bytes();
    if bytes.len() >= 3
        && bytes[bytes.len() - 2].is_ascii_digit()
        && matches!(bytes[bytes.len() - 1], b'N' | b'B' | b'R' | b'Q')
    {
        let kind = PieceKind::from_char(bytes[bytes.len() - 1] as char)?;
        return Some((&body[..body.len() - 1], Some(kind.into())));
    }

    Some((body, None))
}

/// `Some(true)` for kingside, `Some(false)` for queenside.
fn castling_side(body: &str) -> Option<bool> {
    match body {
        "O-O" | "0-0" => Some(true),
        "O-O-O" | "0-0-0" => Some(false),
        _ => None,
    }
}

/// Castling side of a cozy-chess move, if it is one.
fn is_castle(board: &Board, mv: Move) -> Option<bool> {
    let castles = board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to) == Some(board.side_to_move());
    castles.then(|| (mv.to.file() as u8) > (mv.from.file() as u8))
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SanError {
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uci::format_uci_move;

    fn board(fen: &str) -> Board {
        fen.parse().unwrap()
    }

    fn uci(board: &Board, san: &str) -> String {
        format_uci_move(parse_san(board, san).unwrap())
    }

    #[test]
    fn pawn_and_piece_moves_from_start() {
        let start = Board::default();
        assert_eq!(uci(&start, "e4"), "e2e4");
        assert_eq!(uci(&start, "Nf3"), "g1f3");
        assert_eq!(uci(&start, "Nc3+"), "b1c3");
    }

    #[test]
    fn illegal_san_is_rejected() {
        let start = Board::default();
        assert_eq!(
            parse_san(&start, "e5"),
            Err(SanError::NoLegalMove("e5".into()))
        );
        assert_eq!(
            parse_san(&start, "Qh5"),
            Err(SanError::NoLegalMove("Qh5".into()))
        );
        assert!(matches!(parse_san(&start, "zz"), Err(SanError::InvalidFormat(_))));
    }

    #[test]
    fn captures_use_origin_file() {
        let b = board("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
        assert_eq!(uci(&b, "exd5"), "e4d5");
    }

    #[test]
    fn disambiguation_by_file_and_rank() {
        // Knights on b1 and f3 can both reach d2.
        let b = board("4k3/8/8/8/8/5N2/8/1N2K3 w - - 0 1");
        assert_eq!(
            parse_san(&b, "Nd2"),
            Err(SanError::AmbiguousMove("Nd2".into()))
        );
        assert_eq!(uci(&b, "Nbd2"), "b1d2");
        assert_eq!(uci(&b, "Nfd2"), "f3d2");

        // Rooks on a1 and a5 both reach a3.
        let b = board("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1");
        assert_eq!(uci(&b, "R1a3"), "a1a3");
        assert_eq!(uci(&b, "R5a3"), "a5a3");
    }

    #[test]
    fn castling_both_sides() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let kingside = parse_san(&b, "O-O").unwrap();
        assert_eq!(kingside.from, parse_square("e1").unwrap());
        assert_eq!(kingside.to, parse_square("h1").unwrap());

        let queenside = parse_san(&b, "0-0-0").unwrap();
        assert_eq!(queenside.to, parse_square("a1").unwrap());
    }

    #[test]
    fn promotions_with_and_without_equals() {
        let b = board("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(uci(&b, "e8=Q"), "e7e8q");
        assert_eq!(uci(&b, "e8N+"), "e7e8n");
        assert!(parse_san(&b, "e8").is_err());
    }
}
