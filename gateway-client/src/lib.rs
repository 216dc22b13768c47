//! Game data gateway client
//!
//! Fetches a player's reviewed games from the game service. [`HttpGateway`]
//! talks to the real service; [`MockGateway`] (feature `mock`) serves canned
//! responses for tests and offline runs. Both implement [`GameGateway`].
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use gateway_client::{GameGateway, HttpGateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = HttpGateway::new("http://localhost:8000", Duration::from_secs(30))?;
//!     let games = gateway.fetch_games("MagnusCarlsen").await?;
//!     println!("{} games", games.len());
//!     Ok(())
//! }
//! ```

mod error;
mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod traits;

pub use error::{GatewayError, GatewayResult};
pub use http::{games_url, GamesResponse, HttpGateway};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCall, MockGateway};
pub use traits::GameGateway;
