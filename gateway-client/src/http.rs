//! HTTP implementation of the game gateway

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use review::{normalize_handle, Game};
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};
use crate::traits::GameGateway;

/// Body of `GET /games/{handle}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamesResponse {
    /// One entry per game, each with its per-move evaluations.
    #[serde(default)]
    pub evaluations: Vec<Game>,
}

impl GamesResponse {
    /// Games that pass validation. Invalid ones are logged and dropped.
    pub fn into_valid_games(self) -> Vec<Game> {
        self.evaluations
            .into_iter()
            .filter(|game| match game.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(game = %game.id, error = %e, "Dropping invalid game from gateway response");
                    false
                }
            })
            .collect()
    }
}

/// URL of a player's game list; the handle is lowercased.
pub fn games_url(base_url: &str, handle: &str) -> String {
    format!(
        "{}/games/{}",
        base_url.trim_end_matches('/'),
        normalize_handle(handle)
    )
}

/// Map a response status to the gateway's error taxonomy.
fn check_status(status: StatusCode, handle: &str) -> GatewayResult<()> {
    if status == StatusCode::NOT_FOUND {
        return Err(GatewayError::NotFound {
            handle: normalize_handle(handle),
        });
    }
    if !status.is_success() {
        return Err(GatewayError::Status(status.as_u16()));
    }
    Ok(())
}

/// Network client for the game service.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> GatewayResult<Self> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(GatewayError::InvalidUrl(base_url));
        }

        let client = Client::builder()
            .user_agent(concat!("swing-review/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GameGateway for HttpGateway {
    async fn fetch_games(&self, handle: &str) -> GatewayResult<Vec<Game>> {
        let url = games_url(&self.base_url, handle);
        tracing::debug!(%url, "Requesting games");

        let resp = self.client.get(&url).send().await?;
        check_status(resp.status(), handle)?;

        let body: GamesResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::InvalidData(e.to_string()))?;

        let games = body.into_valid_games();
        tracing::info!(handle = %normalize_handle(handle), games = games.len(), "Gateway returned games");
        Ok(games)
    }
}
