//! Error types for the review core

use chess::FenError;
use thiserror::Error;

/// Failures of review navigation and game selection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReviewError {
    /// Cursor outside `0..=total_plies`. Only reachable through a caller bug.
    #[error("ply {requested} is out of range (game has {total} plies)")]
    OutOfRange { requested: usize, total: usize },

    #[error("No game is loaded")]
    NoActiveGame,

    #[error("Navigation is suspended while the board diverges from the game; pick a move to re-anchor")]
    NavigationSuspended,

    /// A recorded move could not be replayed to rebuild a missing position.
    #[error("recorded move {notation} at ply {ply} is not legal")]
    ReplayFailed { ply: usize, notation: String },

    #[error("No game at index {0}")]
    GameNotFound(usize),

    #[error(transparent)]
    InvalidGame(#[from] InvalidGame),

    #[error("Invalid classification bands: {0}")]
    InvalidBands(String),

    #[error("Unknown classification: {0}")]
    UnknownClassification(String),
}

/// Structural problems with a game received from the gateway or the cache.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidGame {
    #[error("game id is empty")]
    EmptyId,

    #[error("game {id} has an invalid starting position: {source}")]
    StartingPosition { id: String, source: FenError },

    #[error("game {id}: evaluation at ply {ply} has no move")]
    EmptyMove { id: String, ply: usize },

    #[error("game {id}: evaluation at ply {ply} has a non-finite swing")]
    NonFiniteSwing { id: String, ply: usize },
}

/// Why a game-list fetch failed, as the review session sees it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("handle {handle} not found")]
    HandleNotFound { handle: String },

    #[error("network failure: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::HandleNotFound { handle } => format!("No games found for '{}'.", handle),
            Self::Network(_) | Self::InvalidResponse(_) => {
                "Could not reach the game service. Try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_differs_from_network_failure() {
        let not_found = FetchError::HandleNotFound {
            handle: "doesnotexist".into(),
        };
        let network = FetchError::Network("connection refused".into());
        assert_eq!(not_found.user_message(), "No games found for 'doesnotexist'.");
        assert_ne!(not_found.user_message(), network.user_message());
        assert_eq!(
            network.user_message(),
            FetchError::InvalidResponse("bad json".into()).user_message()
        );
    }
}
