use crate::classify::ClassificationBands;
use crate::swing::DEFAULT_SWING_THRESHOLD;

/// Tunables of the review core.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewConfig {
    /// Swing cutpoints used when the gateway supplies no label.
    pub bands: ClassificationBands,
    /// Minimum `|swing|` (exclusive) for a move to count as notable.
    pub swing_threshold: f64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            bands: ClassificationBands::default(),
            swing_threshold: DEFAULT_SWING_THRESHOLD,
        }
    }
}
