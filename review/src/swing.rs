//! Swing aggregation: which moves mattered.

use chess::Position;

use crate::classify::{classify, Classification, ClassificationBands};
use crate::model::Evaluation;

/// Default materiality threshold, in swing units.
pub const DEFAULT_SWING_THRESHOLD: f64 = 1.0;

/// A move whose `|swing|` exceeded the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct NotableSwingPoint {
    /// 1-based ply of the move.
    pub ply: usize,
    pub notation: String,
    pub swing: f64,
    /// Gateway label when it has one, otherwise the band for `swing`.
    pub classification: Classification,
    /// Position after the move, when known.
    pub position: Option<Position>,
}

/// Evaluations with `|swing| > threshold`, in move order.
///
/// Positions come from each evaluation's FEN; a missing or unparseable FEN
/// leaves `position` empty for the caller to resolve.
pub fn aggregate(
    evaluations: &[Evaluation],
    threshold: f64,
    bands: &ClassificationBands,
) -> Vec<NotableSwingPoint> {
    evaluations
        .iter()
        .enumerate()
        .filter(|(_, eval)| eval.swing.abs() > threshold)
        .map(|(i, eval)| NotableSwingPoint {
            ply: i + 1,
            notation: eval.notation.clone(),
            swing: eval.swing,
            classification: classify(eval, bands),
            position: eval
                .fen
                .as_deref()
                .and_then(|fen| Position::from_fen(fen).ok()),
        })
        .collect()
}
