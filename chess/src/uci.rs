//! UCI (Universal Chess Interface) move notation

use cozy_chess::{Board, File, Move, Piece, Rank, Square};

use crate::types::PieceKind;

/// Parse a square string like "e2". Case-insensitive on the file.
pub fn parse_square(s: &str) -> Option<Square> {
    let bytes = s.trim().as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = match bytes[0].to_ascii_lowercase() {
        b @ b'a'..=b'h' => File::index((b - b'a') as usize),
        _ => return None,
    };
    let rank = match bytes[1] {
        b @ b'1'..=b'8' => Rank::index((b - b'1') as usize),
        _ => return None,
    };
    Some(Square::new(file, rank))
}

/// Format a square as "e2".
pub fn format_square(sq: Square) -> String {
    let file = (b'a' + sq.file() as u8) as char;
    let rank = (b'1' + sq.rank() as u8) as char;
    format!("{}{}", file, rank)
}

/// Parse "e2e4" / "e7e8q" into a raw move. No legality check.
pub fn parse_uci_move(s: &str) -> Option<Move> {
    let s = s.trim();
    if !(s.len() == 4 || s.len() == 5) || !s.is_ascii() {
        return None;
    }
    let from = parse_square(&s[0..2])?;
    let to = parse_square(&s[2..4])?;
    let promotion = match s[4..].chars().next() {
        Some(c) => {
            let kind = PieceKind::from_char(c).filter(|k| k.is_promotion_target())?;
            Some(Piece::from(kind))
        }
        None => None,
    };
    Some(Move {
        from,
        to,
        promotion,
    })
}

/// Convert UCI castling notation to cozy_chess notation
///
/// UCI moves the king two squares (e1g1); cozy_chess encodes castling as
/// king-takes-own-rook (e1h1). Only a king move that is not itself legal
/// is rewritten; the cozy form is returned when it is legal, otherwise the
/// move unchanged.
pub fn convert_uci_castling_to_cozy(board: &Board, mv: Move, legal_moves: &[Move]) -> Move {
    if legal_moves.contains(&mv) || board.piece_on(mv.from) != Some(Piece::King) {
        return mv;
    }
    let back_rank = matches!(mv.from.rank(), Rank::First | Rank::Eighth);
    if !back_rank
        || mv.from.file() != File::E
        || mv.from.rank() != mv.to.rank()
        || mv.promotion.is_some()
    {
        return mv;
    }

    let rook_file = match mv.to.file() {
        File::G => File::H,
        File::C => File::A,
        _ => return mv,
    };
    let converted = Move {
        from: mv.from,
        to: Square::new(rook_file, mv.from.rank()),
        promotion: None,
    };

    if legal_moves.contains(&converted) {
        converted
    } else {
        mv
    }
}

/// Rewrite a cozy castling move (king onto own rook) to the king's
/// real destination square. Non-castling moves pass through.
pub fn cozy_castling_to_standard(board: &Board, mv: Move) -> Move {
    let is_castle = board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to) == Some(board.side_to_move());
    if !is_castle {
        return mv;
    }
    let king_file = if (mv.to.file() as u8) > (mv.from.file() as u8) {
        File::G
    } else {
        File::C
    };
    Move {
        from: mv.from,
        to: Square::new(king_file, mv.from.rank()),
        promotion: None,
    }
}

/// Format a move in UCI notation (e.g., "e2e4", "e7e8q")
pub fn format_uci_move(mv: Move) -> String {
    let mut s = format!("{}{}", format_square(mv.from), format_square(mv.to));
    if let Some(promo) = mv.promotion {
        s.push(PieceKind::from(promo).san_letter().to_ascii_lowercase());
    }
    s
}
