//! GameGateway trait abstraction for gateway implementations

use crate::error::GatewayResult;
use async_trait::async_trait;
use review::Game;

/// Source of a player's reviewed games.
/// Implemented by both HttpGateway and MockGateway
#[async_trait]
pub trait GameGateway: Send + Sync {
    /// Fetch every reviewed game for `handle`. Handles are case-insensitive.
    async fn fetch_games(&self, handle: &str) -> GatewayResult<Vec<Game>>;
}

#[async_trait]
impl<G: GameGateway + ?Sized> GameGateway for std::sync::Arc<G> {
    async fn fetch_games(&self, handle: &str) -> GatewayResult<Vec<Game>> {
        (**self).fetch_games(handle).await
    }
}
