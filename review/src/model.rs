//! Games and per-move evaluations, shaped like the gateway's JSON.

use chess::{FenError, Position};
use serde::{Deserialize, Serialize};

use crate::error::InvalidGame;

/// One side of a game. Display-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u32>,
}

/// Game metadata as reported by the gateway. The core never reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    #[serde(default)]
    pub white: PlayerInfo,
    #[serde(default)]
    pub black: PlayerInfo,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_control: Option<String>,
}

/// Evaluation of a single ply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Move played, in SAN or UCI.
    #[serde(rename = "move")]
    pub notation: String,
    /// Evaluation change attributed to the move; only its magnitude matters.
    pub swing: f64,
    /// Gateway-supplied label. Authoritative when it names a known classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    /// FEN after the move, when the gateway provides it.
    #[serde(
        default,
        alias = "resultingPosition",
        skip_serializing_if = "Option::is_none"
    )]
    pub fen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_evaluation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_evaluation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Evaluation {
    pub fn new(notation: impl Into<String>, swing: f64) -> Self {
        Self {
            notation: notation.into(),
            swing,
            classification: None,
            fen: None,
            previous_evaluation: None,
            current_evaluation: None,
            timestamp: None,
        }
    }

    pub fn with_fen(mut self, fen: impl Into<String>) -> Self {
        self.fen = Some(fen.into());
        self
    }

    pub fn with_classification(mut self, label: impl Into<String>) -> Self {
        self.classification = Some(label.into());
        self
    }
}

/// A played game with one evaluation per ply, in ply order.
///
/// Evaluation `i` (0-based) is ply `i + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    #[serde(rename = "game", default)]
    pub info: GameInfo,
    /// Position before ply 1; the standard position when absent.
    #[serde(
        rename = "startingFen",
        alias = "starting_fen",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub starting_fen: Option<String>,
    #[serde(default)]
    pub evaluations: Vec<Evaluation>,
}

impl Game {
    pub fn new(id: impl Into<String>, evaluations: Vec<Evaluation>) -> Self {
        Self {
            id: id.into(),
            info: GameInfo::default(),
            starting_fen: None,
            evaluations,
        }
    }

    pub fn total_plies(&self) -> usize {
        self.evaluations.len()
    }

    /// Evaluation for a 1-based ply.
    pub fn evaluation(&self, ply: usize) -> Option<&Evaluation> {
        ply.checked_sub(1).and_then(|i| self.evaluations.get(i))
    }

    pub fn starting_position(&self) -> Result<Position, FenError> {
        match &self.starting_fen {
            Some(fen) if !fen.trim().is_empty() => Position::from_fen(fen),
            _ => Ok(Position::standard()),
        }
    }

    /// Short human label, e.g. `hikaru (3200) vs magnuscarlsen (3150)`.
    pub fn title(&self) -> String {
        let side = |p: &PlayerInfo| match p.rating {
            Some(rating) => format!("{} ({})", p.username, rating),
            None => p.username.clone(),
        };
        format!("{} vs {}", side(&self.info.white), side(&self.info.black))
    }

    /// Structural checks applied to everything coming from the gateway or the cache.
    pub fn validate(&self) -> Result<(), InvalidGame> {
        if self.id.trim().is_empty() {
            return Err(InvalidGame::EmptyId);
        }
        self.starting_position()
            .map_err(|source| InvalidGame::StartingPosition {
                id: self.id.clone(),
                source,
            })?;
        for (i, eval) in self.evaluations.iter().enumerate() {
            if eval.notation.trim().is_empty() {
                return Err(InvalidGame::EmptyMove {
                    id: self.id.clone(),
                    ply: i + 1,
                });
            }
            if !eval.swing.is_finite() {
                return Err(InvalidGame::NonFiniteSwing {
                    id: self.id.clone(),
                    ply: i + 1,
                });
            }
        }
        Ok(())
    }
}
