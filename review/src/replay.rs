//! Replay state machine: the reviewed game, the cursor and the board.

use chess::{MoveAttempt, Position, Square};

use crate::classify::{classify, Classification, ClassificationSummary};
use crate::config::ReviewConfig;
use crate::error::{InvalidGame, ReviewError};
use crate::model::{Evaluation, Game};
use crate::swing::{aggregate, NotableSwingPoint};

/// Coarse state of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPhase {
    /// No game loaded.
    Empty,
    /// Game loaded, cursor on the starting position.
    Ready,
    /// Cursor on a recorded move.
    Navigating,
    /// Board shows a manual move that is not part of the game.
    Diverged,
}

/// Result of a manual move attempt, as the board widget needs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum MoveOutcome {
    Accepted,
    /// Rejected; the widget puts the piece back.
    Snapback,
}

/// Everything a board widget needs to draw the current state.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardFrame {
    pub position: Position,
    pub fen: String,
    pub phase: ReviewPhase,
    pub cursor: usize,
    pub total_plies: usize,
    pub diverged: bool,
    /// Move that led to the shown position, for highlighting.
    pub last_move: Option<MoveAttempt>,
    /// Evaluation of the move at the cursor (absent at ply 0 and while diverged).
    pub evaluation: Option<Evaluation>,
    pub classification: Option<Classification>,
}

struct ActiveReview {
    game: Game,
    start: Position,
    cursor: usize,
    current: Position,
    /// Set while the board shows a manual move off the recorded line.
    manual_move: Option<MoveAttempt>,
    notable: Vec<NotableSwingPoint>,
}

impl ActiveReview {
    fn diverged(&self) -> bool {
        self.manual_move.is_some()
    }

    /// Recorded position after `ply` moves.
    ///
    /// Uses the evaluation's FEN when it has a valid one, otherwise
    /// replays the recorded moves from the starting position.
    fn position_at(&self, ply: usize) -> Result<Position, ReviewError> {
        if ply == 0 {
            return Ok(self.start.clone());
        }
        let total = self.game.total_plies();
        let eval = self.game.evaluation(ply).ok_or(ReviewError::OutOfRange {
            requested: ply,
            total,
        })?;

        if let Some(fen) = eval.fen.as_deref() {
            match Position::from_fen(fen) {
                Ok(position) => return Ok(position),
                Err(e) => {
                    tracing::warn!(game = %self.game.id, ply, error = %e, "Invalid recorded FEN, replaying moves instead");
                }
            }
        }

        let moves = self.game.evaluations[..ply].iter().map(|e| e.notation.as_str());
        chess::replay(&self.start, moves).map_err(|e| ReviewError::ReplayFailed {
            ply: e.index + 1,
            notation: e.notation,
        })
    }
}

/// Owns the game under review and derives the board shown for it.
///
/// The shown position is always either the recorded position at the
/// cursor, or one legal manual move away from it (diverged). Positions are
/// replaced, never mutated.
pub struct ReplayMachine {
    config: ReviewConfig,
    active: Option<ActiveReview>,
}

impl ReplayMachine {
    pub fn new(config: ReviewConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Start reviewing `game` from its starting position.
    ///
    /// On error the machine keeps its previous state.
    pub fn load_game(&mut self, game: Game) -> Result<(), ReviewError> {
        game.validate()?;
        let start = game
            .starting_position()
            .map_err(|source| InvalidGame::StartingPosition {
                id: game.id.clone(),
                source,
            })?;

        let mut review = ActiveReview {
            current: start.clone(),
            start,
            cursor: 0,
            manual_move: None,
            notable: aggregate(&game.evaluations, self.config.swing_threshold, &self.config.bands),
            game,
        };

        let missing: Vec<usize> = review
            .notable
            .iter()
            .enumerate()
            .filter(|(_, p)| p.position.is_none())
            .map(|(i, _)| i)
            .collect();
        for i in missing {
            let ply = review.notable[i].ply;
            review.notable[i].position = review.position_at(ply).ok();
        }

        tracing::info!(
            game = %review.game.id,
            plies = review.game.total_plies(),
            notable = review.notable.len(),
            "Game loaded for review"
        );
        self.active = Some(review);
        Ok(())
    }

    /// Drop the active game.
    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn phase(&self) -> ReviewPhase {
        match &self.active {
            None => ReviewPhase::Empty,
            Some(r) if r.diverged() => ReviewPhase::Diverged,
            Some(r) if r.cursor == 0 => ReviewPhase::Ready,
            Some(_) => ReviewPhase::Navigating,
        }
    }

    pub fn game(&self) -> Option<&Game> {
        self.active.as_ref().map(|r| &r.game)
    }

    /// Last confirmed recorded ply (0 with no game).
    pub fn cursor(&self) -> usize {
        self.active.as_ref().map_or(0, |r| r.cursor)
    }

    pub fn total_plies(&self) -> usize {
        self.active.as_ref().map_or(0, |r| r.game.total_plies())
    }

    pub fn is_diverged(&self) -> bool {
        self.active.as_ref().is_some_and(ActiveReview::diverged)
    }

    pub fn current_position(&self) -> Option<&Position> {
        self.active.as_ref().map(|r| &r.current)
    }

    /// Notable swing points, computed once when the game was loaded.
    pub fn notable_points(&self) -> &[NotableSwingPoint] {
        self.active.as_ref().map_or(&[], |r| r.notable.as_slice())
    }

    /// Recorded position after `ply` moves, without moving the cursor.
    pub fn position_at(&self, ply: usize) -> Result<Position, ReviewError> {
        let review = self.active.as_ref().ok_or(ReviewError::NoActiveGame)?;
        if ply > review.game.total_plies() {
            return Err(ReviewError::OutOfRange {
                requested: ply,
                total: review.game.total_plies(),
            });
        }
        review.position_at(ply)
    }

    /// Move the cursor to `ply` and show the recorded position there.
    ///
    /// Valid for `0..=total_plies`; clears divergence. On error nothing changes.
    pub fn jump_to(&mut self, ply: usize) -> Result<&Position, ReviewError> {
        let review = self.active.as_mut().ok_or(ReviewError::NoActiveGame)?;
        let total = review.game.total_plies();
        if ply > total {
            tracing::error!(game = %review.game.id, ply, total, "Jump target out of range");
            return Err(ReviewError::OutOfRange {
                requested: ply,
                total,
            });
        }

        let position = review.position_at(ply)?;
        if review.diverged() {
            tracing::debug!(game = %review.game.id, ply, "Re-anchored to recorded line");
        }
        review.cursor = ply;
        review.current = position;
        review.manual_move = None;
        tracing::debug!(game = %review.game.id, ply, "Jumped");
        Ok(&review.current)
    }

    /// Return to the recorded line at `ply`. The only way out of divergence.
    pub fn reanchor(&mut self, ply: usize) -> Result<&Position, ReviewError> {
        self.jump_to(ply)
    }

    pub fn next(&mut self) -> Result<(), ReviewError> {
        let (cursor, total) = self.navigable()?;
        if cursor < total {
            self.jump_to(cursor + 1)?;
        }
        Ok(())
    }

    pub fn prev(&mut self) -> Result<(), ReviewError> {
        let (cursor, _) = self.navigable()?;
        if cursor > 0 {
            self.jump_to(cursor - 1)?;
        }
        Ok(())
    }

    pub fn go_to_start(&mut self) -> Result<(), ReviewError> {
        self.navigable()?;
        self.jump_to(0).map(|_| ())
    }

    pub fn go_to_end(&mut self) -> Result<(), ReviewError> {
        let (_, total) = self.navigable()?;
        self.jump_to(total).map(|_| ())
    }

    /// Cursor and length, if cursor-relative navigation is allowed.
    fn navigable(&self) -> Result<(usize, usize), ReviewError> {
        let review = self.active.as_ref().ok_or(ReviewError::NoActiveGame)?;
        if review.diverged() {
            return Err(ReviewError::NavigationSuspended);
        }
        Ok((review.cursor, review.game.total_plies()))
    }

    /// Try a manual move on the shown board.
    ///
    /// A legal move from the recorded position replaces the shown position
    /// and marks the board diverged; the cursor stays put. Illegal moves,
    /// moves with no game loaded, and further moves while already diverged
    /// snap back without touching state.
    pub fn attempt_move(&mut self, attempt: MoveAttempt) -> MoveOutcome {
        let Some(review) = self.active.as_mut() else {
            return MoveOutcome::Snapback;
        };
        if review.diverged() {
            tracing::debug!(game = %review.game.id, %attempt, "Manual move rejected: already diverged");
            return MoveOutcome::Snapback;
        }

        match chess::apply_move(&review.current, attempt) {
            Some(next) => {
                tracing::debug!(game = %review.game.id, cursor = review.cursor, %attempt, "Manual move diverges from game");
                review.current = next;
                review.manual_move = Some(attempt);
                MoveOutcome::Accepted
            }
            None => {
                tracing::debug!(game = %review.game.id, %attempt, "Illegal manual move");
                MoveOutcome::Snapback
            }
        }
    }

    /// Legal destinations from `from` on the shown board.
    pub fn legal_targets(&self, from: Square) -> Vec<Square> {
        self.active
            .as_ref()
            .map(|r| chess::legal_targets(&r.current, from))
            .unwrap_or_default()
    }

    /// Classification of the move at a 1-based ply.
    pub fn classification_at(&self, ply: usize) -> Option<Classification> {
        let eval = self.game()?.evaluation(ply)?;
        Some(classify(eval, &self.config.bands))
    }

    pub fn summary(&self) -> ClassificationSummary {
        self.game()
            .map(|g| ClassificationSummary::from_evaluations(&g.evaluations, &self.config.bands))
            .unwrap_or_default()
    }

    /// The move that produced the shown position.
    pub fn last_move(&self) -> Option<MoveAttempt> {
        let review = self.active.as_ref()?;
        if let Some(manual) = review.manual_move {
            return Some(manual);
        }
        let eval = review.game.evaluation(review.cursor)?;
        let before = review.position_at(review.cursor - 1).ok()?;
        chess::resolve_notation(&before, &eval.notation)
    }

    /// Snapshot of what to render. `None` with no game loaded.
    pub fn frame(&self) -> Option<BoardFrame> {
        let review = self.active.as_ref()?;
        let diverged = review.diverged();
        let evaluation = if diverged {
            None
        } else {
            review.game.evaluation(review.cursor).cloned()
        };
        let classification = evaluation
            .as_ref()
            .map(|e| classify(e, &self.config.bands));

        Some(BoardFrame {
            fen: review.current.fen(),
            position: review.current.clone(),
            phase: self.phase(),
            cursor: review.cursor,
            total_plies: review.game.total_plies(),
            diverged,
            last_move: self.last_move(),
            evaluation,
            classification,
        })
    }
}

impl Default for ReplayMachine {
    fn default() -> Self {
        Self::new(ReviewConfig::default())
    }
}
