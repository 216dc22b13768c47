//! Mock GameGateway implementation for testing

use crate::error::{GatewayError, GatewayResult};
use crate::traits::GameGateway;
use async_trait::async_trait;
use review::{normalize_handle, Game};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

type Responder = Box<dyn Fn() -> GatewayResult<Vec<Game>> + Send>;

/// Mock gateway for testing - only compiled in test mode or with mock feature
#[derive(Clone, Default)]
pub struct MockGateway {
    responses: Arc<Mutex<HashMap<String, Responder>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    FetchGames { handle: String },
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the response for `handle`
    pub fn with_response<F>(self, handle: &str, f: F) -> Self
    where
        F: Fn() -> GatewayResult<Vec<Game>> + Send + 'static,
    {
        lock(&self.responses).insert(normalize_handle(handle), Box::new(f));
        self
    }

    /// Serve a fixed game list for `handle`
    pub fn with_games(self, handle: &str, games: Vec<Game>) -> Self {
        self.with_response(handle, move || Ok(games.clone()))
    }

    /// Answer `handle` with a 404
    pub fn with_not_found(self, handle: &str) -> Self {
        let normalized = normalize_handle(handle);
        self.with_response(handle, move || {
            Err(GatewayError::NotFound {
                handle: normalized.clone(),
            })
        })
    }

    /// Hold every response for `handle` back by `delay`
    pub fn with_delay(self, handle: &str, delay: Duration) -> Self {
        lock(&self.delays).insert(normalize_handle(handle), delay);
        self
    }

    /// Get recorded calls for verification
    pub fn get_calls(&self) -> Vec<MockCall> {
        lock(&self.call_log).clone()
    }

    /// Clear call history
    pub fn clear_calls(&self) {
        lock(&self.call_log).clear()
    }
}

#[async_trait]
impl GameGateway for MockGateway {
    async fn fetch_games(&self, handle: &str) -> GatewayResult<Vec<Game>> {
        let handle = normalize_handle(handle);
        lock(&self.call_log).push(MockCall::FetchGames {
            handle: handle.clone(),
        });

        let delay = lock(&self.delays).get(&handle).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let responses = lock(&self.responses);
        match responses.get(&handle) {
            Some(f) => f(),
            None => Err(GatewayError::NotConfigured(format!("fetch_games({})", handle))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review::{Evaluation, FetchError, FetchOutcome, MemoryCache, ReviewConfig, ReviewSession};
    use tokio::sync::mpsc;

    fn game(id: &str) -> Game {
        Game::new(id, vec![Evaluation::new("e4", 0.2)])
    }

    #[tokio::test]
    async fn test_serves_configured_games_case_insensitively() {
        let mock = MockGateway::new().with_games("MagnusCarlsen", vec![game("g1")]);

        let games = mock.fetch_games("magnuscarlsen").await.unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(
            mock.get_calls(),
            vec![MockCall::FetchGames {
                handle: "magnuscarlsen".into()
            }]
        );

        mock.clear_calls();
        assert!(mock.get_calls().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_converts_to_fetch_error() {
        let mock = MockGateway::new().with_not_found("doesnotexist");
        let err = mock.fetch_games("doesnotexist").await.unwrap_err();
        assert_eq!(
            FetchError::from(err),
            FetchError::HandleNotFound {
                handle: "doesnotexist".into()
            }
        );
    }

    #[tokio::test]
    async fn test_unconfigured_handle() {
        let mock = MockGateway::new();
        assert!(matches!(
            mock.fetch_games("nobody").await,
            Err(GatewayError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn test_slow_superseded_fetch_is_discarded() {
        let mock = MockGateway::new()
            .with_games("a", vec![game("from-a")])
            .with_delay("a", Duration::from_millis(200))
            .with_games("b", vec![game("from-b")])
            .with_delay("b", Duration::from_millis(10));

        let mut session = ReviewSession::new(MemoryCache::new(), ReviewConfig::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        for handle in ["a", "b"] {
            let ticket = session.begin_fetch(handle);
            let gateway = mock.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = gateway
                    .fetch_games(ticket.handle())
                    .await
                    .map_err(FetchError::from);
                let _ = tx.send((ticket, result));
            });
        }
        drop(tx);

        let mut outcomes = Vec::new();
        while let Some((ticket, result)) = rx.recv().await {
            outcomes.push((ticket.handle().to_string(), session.complete_fetch(&ticket, result)));
        }

        assert_eq!(
            outcomes,
            vec![
                ("b".to_string(), FetchOutcome::Applied),
                ("a".to_string(), FetchOutcome::Superseded),
            ]
        );
        assert_eq!(session.games()[0].id, "from-b");
        assert_eq!(session.last_handle(), Some("b"));
    }
}
