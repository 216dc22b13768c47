//! Move review core.
//!
//! Owns a reviewed game's evaluation sequence and everything derived from
//! it: the navigation cursor and board position ([`ReplayMachine`]), the
//! swing-to-category policy ([`classify`]), the notable swing points
//! ([`swing::aggregate`]) and the session snapshot persisted between runs
//! ([`SessionCache`]). [`ReviewSession`] ties them together with the game
//! list and the fetch lifecycle.

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod replay;
pub mod session;
pub mod swing;

pub use cache::{ActiveGame, CacheError, JsonFileCache, MemoryCache, SessionCache, SessionSnapshot};
pub use classify::{
    classify, Classification, ClassificationBands, ClassificationSummary, DisplayStyle, Rgb,
};
pub use config::ReviewConfig;
pub use error::{FetchError, InvalidGame, ReviewError};
pub use model::{Evaluation, Game, GameInfo, PlayerInfo};
pub use replay::{BoardFrame, MoveOutcome, ReplayMachine, ReviewPhase};
pub use session::{normalize_handle, FetchOutcome, FetchStatus, FetchTicket, ReviewSession};
pub use swing::{aggregate, NotableSwingPoint, DEFAULT_SWING_THRESHOLD};
