//! Session cache: the last handle, the game list and the active game,
//! persisted between runs so a review can resume before any fetch completes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Game;

const LAST_HANDLE_FILE: &str = "last_handle.json";
const GAMES_FILE: &str = "games.json";
const ACTIVE_GAME_FILE: &str = "active_game.json";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Stored data does not describe a usable session.
    #[error("malformed cached snapshot: {0}")]
    Malformed(String),
}

/// Game under review and where the cursor was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveGame {
    pub game_id: String,
    pub cursor: usize,
}

/// Everything the cache stores. Last write wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub last_handle: Option<String>,
    #[serde(default)]
    pub games: Vec<Game>,
    pub active: Option<ActiveGame>,
}

impl SessionSnapshot {
    /// Schema checks beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), CacheError> {
        for game in &self.games {
            game.validate()
                .map_err(|e| CacheError::Malformed(e.to_string()))?;
        }
        if let Some(active) = &self.active {
            let game = self.active_game().ok_or_else(|| {
                CacheError::Malformed(format!("active game {} is not in the game list", active.game_id))
            })?;
            if active.cursor > game.total_plies() {
                return Err(CacheError::Malformed(format!(
                    "cursor {} out of range for game {} ({} plies)",
                    active.cursor,
                    game.id,
                    game.total_plies()
                )));
            }
        }
        Ok(())
    }

    /// The game `active` points at, if any.
    pub fn active_game(&self) -> Option<&Game> {
        let id = &self.active.as_ref()?.game_id;
        self.games.iter().find(|g| &g.id == id)
    }
}

/// Storage for [`SessionSnapshot`]s.
///
/// `load` returns `Ok(None)` when nothing is stored and
/// [`CacheError::Malformed`] when what is stored fails validation.
pub trait SessionCache: Send {
    fn load(&self) -> Result<Option<SessionSnapshot>, CacheError>;
    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), CacheError>;
    fn clear(&self) -> Result<(), CacheError>;
}

/// One JSON file per logical key inside a cache directory.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn read<T: serde::de::DeserializeOwned>(&self, file: &str) -> Result<Option<T>, CacheError> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| CacheError::Malformed(format!("{}: {}", file, e)))
    }

    fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(self.path(file), json)?;
        Ok(())
    }
}

impl SessionCache for JsonFileCache {
    fn load(&self) -> Result<Option<SessionSnapshot>, CacheError> {
        let last_handle: Option<Option<String>> = self.read(LAST_HANDLE_FILE)?;
        let games: Option<Vec<Game>> = self.read(GAMES_FILE)?;
        let active: Option<Option<ActiveGame>> = self.read(ACTIVE_GAME_FILE)?;

        if last_handle.is_none() && games.is_none() && active.is_none() {
            return Ok(None);
        }

        let snapshot = SessionSnapshot {
            last_handle: last_handle.flatten(),
            games: games.unwrap_or_default(),
            active: active.flatten(),
        };
        snapshot.validate()?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir)?;
        self.write(LAST_HANDLE_FILE, &snapshot.last_handle)?;
        self.write(GAMES_FILE, &snapshot.games)?;
        self.write(ACTIVE_GAME_FILE, &snapshot.active)?;
        tracing::debug!(dir = %self.dir.display(), games = snapshot.games.len(), "Session snapshot saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        for file in [LAST_HANDLE_FILE, GAMES_FILE, ACTIVE_GAME_FILE] {
            let path = self.path(file);
            if path.exists() {
                std::fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

/// In-process cache holding the serialized snapshot.
#[derive(Debug, Default)]
pub struct MemoryCache {
    stored: Mutex<Option<String>>,
    saves: AtomicUsize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-seeded with raw stored text, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            stored: Mutex::new(Some(raw.into())),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn raw(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.stored.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionCache for MemoryCache {
    fn load(&self) -> Result<Option<SessionSnapshot>, CacheError> {
        let Some(raw) = self.lock().clone() else {
            return Ok(None);
        };
        let snapshot: SessionSnapshot =
            serde_json::from_str(&raw).map_err(|e| CacheError::Malformed(e.to_string()))?;
        snapshot.validate()?;
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), CacheError> {
        let json = serde_json::to_string(snapshot)?;
        *self.lock() = Some(json);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        *self.lock() = None;
        Ok(())
    }
}

impl<C: SessionCache + Sync> SessionCache for std::sync::Arc<C> {
    fn load(&self) -> Result<Option<SessionSnapshot>, CacheError> {
        (**self).load()
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<(), CacheError> {
        (**self).save(snapshot)
    }

    fn clear(&self) -> Result<(), CacheError> {
        (**self).clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Evaluation;

    fn sample_snapshot() -> SessionSnapshot {
        SessionSnapshot {
            last_handle: Some("magnuscarlsen".to_string()),
            games: vec![Game::new(
                "game-1",
                vec![
                    Evaluation::new("e4", 0.2),
                    Evaluation::new("e5", 0.3),
                    Evaluation::new("Qh5", 4.1),
                ],
            )],
            active: Some(ActiveGame {
                game_id: "game-1".to_string(),
                cursor: 2,
            }),
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonFileCache::new(dir.path());
        let snapshot = sample_snapshot();

        cache.save(&snapshot).unwrap();
        assert!(dir.path().join(GAMES_FILE).exists());
        assert!(dir.path().join(LAST_HANDLE_FILE).exists());
        assert!(dir.path().join(ACTIVE_GAME_FILE).exists());

        assert_eq!(cache.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn test_load_nonexistent_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonFileCache::new(dir.path().join("not-created-yet"));
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn test_clear_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonFileCache::new(dir.path());
        cache.save(&sample_snapshot()).unwrap();
        cache.clear().unwrap();
        assert!(cache.load().unwrap().is_none());
        assert!(!dir.path().join(GAMES_FILE).exists());
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonFileCache::new(dir.path());
        cache.save(&sample_snapshot()).unwrap();

        let replacement = SessionSnapshot {
            last_handle: Some("hikaru".to_string()),
            games: Vec::new(),
            active: None,
        };
        cache.save(&replacement).unwrap();
        assert_eq!(cache.load().unwrap(), Some(replacement));
    }

    #[test]
    fn test_garbage_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonFileCache::new(dir.path());
        cache.save(&sample_snapshot()).unwrap();
        std::fs::write(dir.path().join(GAMES_FILE), "{not json").unwrap();
        assert!(matches!(cache.load(), Err(CacheError::Malformed(_))));
    }

    #[test]
    fn test_dangling_active_game_is_malformed() {
        let mut snapshot = sample_snapshot();
        snapshot.active = Some(ActiveGame {
            game_id: "gone".to_string(),
            cursor: 0,
        });
        assert!(matches!(snapshot.validate(), Err(CacheError::Malformed(_))));
    }

    #[test]
    fn test_cursor_past_end_is_malformed() {
        let mut snapshot = sample_snapshot();
        snapshot.active = Some(ActiveGame {
            game_id: "game-1".to_string(),
            cursor: 4,
        });
        assert!(matches!(snapshot.validate(), Err(CacheError::Malformed(_))));
    }

    #[test]
    fn test_invalid_game_is_malformed() {
        let mut snapshot = sample_snapshot();
        snapshot.games[0].starting_fen = Some("not a fen".to_string());
        assert!(matches!(snapshot.validate(), Err(CacheError::Malformed(_))));
    }

    #[test]
    fn test_memory_cache_counts_saves() {
        let cache = MemoryCache::new();
        assert!(cache.load().unwrap().is_none());
        cache.save(&sample_snapshot()).unwrap();
        cache.save(&sample_snapshot()).unwrap();
        assert_eq!(cache.save_count(), 2);
        assert_eq!(cache.load().unwrap(), Some(sample_snapshot()));
        cache.clear().unwrap();
        assert!(cache.raw().is_none());
    }

    #[test]
    fn test_memory_cache_rejects_wrong_shape() {
        let cache = MemoryCache::with_raw(r#"{"games": "nope"}"#);
        assert!(matches!(cache.load(), Err(CacheError::Malformed(_))));
    }

    #[test]
    fn test_snapshot_serialization() {
        let json = serde_json::to_string(&sample_snapshot()).unwrap();
        assert!(json.contains("magnuscarlsen"));
        assert!(json.contains("Qh5"));
        assert!(json.contains("\"cursor\":2"));
    }
}
