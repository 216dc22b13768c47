//! Review session controller.
//!
//! Ties the replay machine to the game list, the last handle and the
//! session cache, and tracks the in-flight game-list fetch. Every change to
//! the handle, the list or the active game is mirrored to the cache.

use chess::{MoveAttempt, Square};

use crate::cache::{ActiveGame, CacheError, SessionCache, SessionSnapshot};
use crate::config::ReviewConfig;
use crate::error::{FetchError, ReviewError};
use crate::model::Game;
use crate::replay::{MoveOutcome, ReplayMachine};

/// Identifies one issued fetch. Only the most recently issued ticket is
/// ever applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    handle: String,
}

impl FetchTicket {
    /// Normalized handle the fetch is for.
    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading { handle: String },
    Failed(FetchError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch was issued after this one; the result was dropped.
    Superseded,
}

/// Case- and whitespace-normalized player handle.
pub fn normalize_handle(handle: &str) -> String {
    handle.trim().to_lowercase()
}

pub struct ReviewSession<C: SessionCache> {
    machine: ReplayMachine,
    games: Vec<Game>,
    last_handle: Option<String>,
    cache: C,
    status: FetchStatus,
    generation: u64,
}

impl<C: SessionCache> ReviewSession<C> {
    pub fn new(cache: C, config: ReviewConfig) -> Self {
        Self {
            machine: ReplayMachine::new(config),
            games: Vec::new(),
            last_handle: None,
            cache,
            status: FetchStatus::Idle,
            generation: 0,
        }
    }

    pub fn machine(&self) -> &ReplayMachine {
        &self.machine
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn last_handle(&self) -> Option<&str> {
        self.last_handle.as_deref()
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, FetchStatus::Loading { .. })
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Seed the session from the cache. Returns whether a snapshot was used.
    ///
    /// A malformed snapshot is discarded and cleared; no cache problem is
    /// ever returned to the caller.
    pub fn restore(&mut self) -> bool {
        let snapshot = match self.cache.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return false,
            Err(CacheError::Malformed(reason)) => {
                tracing::warn!(%reason, "Discarding malformed session snapshot");
                if let Err(e) = self.cache.clear() {
                    tracing::warn!(error = %e, "Failed to clear malformed session snapshot");
                }
                return false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load session snapshot");
                return false;
            }
        };

        let active = snapshot.active_game().cloned().zip(snapshot.active.clone());
        self.games = snapshot.games;
        self.last_handle = snapshot.last_handle;
        self.machine.clear();

        if let Some((game, ActiveGame { game_id, cursor })) = active {
            let resumed = self
                .machine
                .load_game(game)
                .and_then(|()| self.machine.jump_to(cursor).map(|_| ()));
            if let Err(e) = resumed {
                tracing::warn!(game = %game_id, cursor, error = %e, "Could not resume cached game");
                self.machine.clear();
            }
        }

        tracing::info!(
            handle = ?self.last_handle,
            games = self.games.len(),
            active = ?self.machine.game().map(|g| &g.id),
            "Session restored from cache"
        );
        true
    }

    /// Start a fetch for `handle`, superseding any fetch still in flight.
    pub fn begin_fetch(&mut self, handle: &str) -> FetchTicket {
        self.generation += 1;
        let handle = normalize_handle(handle);
        tracing::info!(%handle, generation = self.generation, "Fetching games");
        self.status = FetchStatus::Loading {
            handle: handle.clone(),
        };
        FetchTicket {
            generation: self.generation,
            handle,
        }
    }

    /// Apply a fetch result if `ticket` is the most recently issued one.
    pub fn complete_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<Game>, FetchError>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                handle = %ticket.handle,
                generation = ticket.generation,
                latest = self.generation,
                "Dropping superseded fetch result"
            );
            return FetchOutcome::Superseded;
        }

        self.last_handle = Some(ticket.handle.clone());
        match result {
            Ok(games) => {
                tracing::info!(handle = %ticket.handle, games = games.len(), "Games fetched");
                self.refresh_active(&games);
                self.games = games;
                self.status = FetchStatus::Idle;
            }
            Err(error @ FetchError::HandleNotFound { .. }) => {
                tracing::info!(handle = %ticket.handle, "Handle not found");
                self.games.clear();
                self.machine.clear();
                self.status = FetchStatus::Failed(error);
            }
            Err(error) => {
                tracing::warn!(handle = %ticket.handle, error = %error, "Fetch failed, keeping previous game list");
                self.status = FetchStatus::Failed(error);
            }
        }
        self.persist();
        FetchOutcome::Applied
    }

    /// Reconcile the active review with a freshly fetched list: drop it when
    /// its game is gone, reload it when the gateway returned different
    /// contents under the same id.
    fn refresh_active(&mut self, games: &[Game]) {
        let Some(active) = self.machine.game() else {
            return;
        };
        let Some(fresh) = games.iter().find(|g| g.id == active.id) else {
            self.machine.clear();
            return;
        };
        if fresh == active {
            return;
        }

        let cursor = self.machine.cursor();
        let reloaded = self
            .machine
            .load_game(fresh.clone())
            .and_then(|()| {
                let total = self.machine.total_plies();
                self.machine.jump_to(cursor.min(total)).map(|_| ())
            });
        if let Err(error) = reloaded {
            tracing::warn!(game = %fresh.id, error = %error, "Refetched game no longer loads, closing review");
            self.machine.clear();
        }
    }

    /// Load game `index` of the list into the replay machine.
    pub fn select_game(&mut self, index: usize) -> Result<(), ReviewError> {
        let game = self
            .games
            .get(index)
            .cloned()
            .ok_or(ReviewError::GameNotFound(index))?;
        self.machine.load_game(game)?;
        self.persist();
        Ok(())
    }

    pub fn jump_to(&mut self, ply: usize) -> Result<(), ReviewError> {
        self.machine.jump_to(ply)?;
        self.persist();
        Ok(())
    }

    pub fn reanchor(&mut self, ply: usize) -> Result<(), ReviewError> {
        self.machine.reanchor(ply)?;
        self.persist();
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), ReviewError> {
        self.machine.next()?;
        self.persist();
        Ok(())
    }

    pub fn prev(&mut self) -> Result<(), ReviewError> {
        self.machine.prev()?;
        self.persist();
        Ok(())
    }

    pub fn go_to_start(&mut self) -> Result<(), ReviewError> {
        self.machine.go_to_start()?;
        self.persist();
        Ok(())
    }

    pub fn go_to_end(&mut self) -> Result<(), ReviewError> {
        self.machine.go_to_end()?;
        self.persist();
        Ok(())
    }

    /// Manual move on the shown board. Divergence is not persisted.
    pub fn attempt_move(&mut self, attempt: MoveAttempt) -> MoveOutcome {
        self.machine.attempt_move(attempt)
    }

    pub fn legal_targets(&self, from: Square) -> Vec<Square> {
        self.machine.legal_targets(from)
    }

    /// What the cache would store right now.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            last_handle: self.last_handle.clone(),
            games: self.games.clone(),
            active: self.machine.game().map(|g| ActiveGame {
                game_id: g.id.clone(),
                cursor: self.machine.cursor(),
            }),
        }
    }

    /// Drop every cached entry and reset to an empty session.
    pub fn clear(&mut self) -> Result<(), CacheError> {
        self.machine.clear();
        self.games.clear();
        self.last_handle = None;
        self.status = FetchStatus::Idle;
        self.cache.clear()
    }

    fn persist(&self) {
        if let Err(e) = self.cache.save(&self.snapshot()) {
            tracing::warn!(error = %e, "Failed to save session snapshot");
        }
    }
}
