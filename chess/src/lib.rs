//! Chess primitives for game review.
//!
//! [`Position`] is the only board value the rest of the workspace sees.
//! Positions come from the standard setup, from a FEN string, or from
//! [`rules::apply_move`] / [`rules::apply_notation`]. Apart from `Square`,
//! cozy-chess types stay behind this crate.

pub mod board_display;
pub mod fen;
pub mod position;
pub mod rules;
pub mod san;
pub mod types;
pub mod uci;

pub use board_display::DisplayBoard;
pub use cozy_chess::Square;
pub use fen::{FenError, STANDARD_FEN};
pub use position::Position;
pub use rules::{
    apply_move, apply_notation, legal_targets, replay, resolve_notation, MoveAttempt, ReplayError,
    RulesError,
};
pub use types::{PieceColor, PieceKind};
pub use uci::{format_square, parse_square};

/// Returns true if the given 1-indexed ply belongs to White.
/// Convention: odd plies (1, 3, 5, …) are White moves; even plies (2, 4, 6, …) are Black.
pub fn is_white_ply(ply: usize) -> bool {
    ply % 2 == 1
}
