//! HttpGateway against a one-shot local HTTP responder.

use std::time::Duration;

use gateway_client::{GameGateway, GatewayError, HttpGateway};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve exactly one response; yields the request head it received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (base, handle)
}

const GAMES_BODY: &str = r#"{
    "evaluations": [
        {
            "id": "g1",
            "game": {
                "white": {"username": "MagnusCarlsen", "rating": 2882},
                "black": {"username": "Hikaru", "rating": 2850},
                "time_class": "blitz"
            },
            "evaluations": [
                {"move": "e4", "swing": 0.2},
                {"move": "e5", "swing": 0.3},
                {"move": "Qh5", "swing": 4.1, "classification": "blunder"}
            ]
        }
    ]
}"#;

#[tokio::test]
async fn fetches_games_with_lowercased_handle() {
    let (base, server) = serve_once("200 OK", GAMES_BODY).await;
    let gateway = HttpGateway::new(base, Duration::from_secs(5)).unwrap();

    let games = gateway.fetch_games("MagnusCarlsen").await.unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].total_plies(), 3);
    assert_eq!(games[0].info.white.username, "MagnusCarlsen");

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /games/magnuscarlsen HTTP/1.1"));
}

#[tokio::test]
async fn not_found_is_distinct() {
    let (base, _server) = serve_once("404 Not Found", "{}").await;
    let gateway = HttpGateway::new(base, Duration::from_secs(5)).unwrap();

    let err = gateway.fetch_games("doesnotexist").await.unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { handle } if handle == "doesnotexist"));
}

#[tokio::test]
async fn server_error_is_status() {
    let (base, _server) = serve_once("503 Service Unavailable", "{}").await;
    let gateway = HttpGateway::new(base, Duration::from_secs(5)).unwrap();

    let err = gateway.fetch_games("hikaru").await.unwrap_err();
    assert!(matches!(err, GatewayError::Status(503)));
}

#[tokio::test]
async fn garbage_body_is_invalid_data() {
    let (base, _server) = serve_once("200 OK", "not json").await;
    let gateway = HttpGateway::new(base, Duration::from_secs(5)).unwrap();

    let err = gateway.fetch_games("hikaru").await.unwrap_err();
    assert!(matches!(err, GatewayError::InvalidData(_)));
}

#[tokio::test]
async fn unreachable_service_is_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let gateway = HttpGateway::new(base, Duration::from_secs(2)).unwrap();
    let err = gateway.fetch_games("hikaru").await.unwrap_err();
    assert!(matches!(err, GatewayError::Request(_)));
}
