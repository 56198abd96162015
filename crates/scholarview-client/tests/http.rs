//! Integration tests for the reqwest transport
//!
//! Each test starts a throwaway HTTP/1.1 server on 127.0.0.1 that answers
//! from a fixed route table, then drives the real client against it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use scholarview_client::{
    Acquisition, AcquisitionController, ClientError, ControllerState, HttpTransport,
    ReadinessPolicy, Transport,
};

/// Canned response for one route
#[derive(Clone)]
enum Reply {
    Json(u16, String),
    Redirect(&'static str),
    Sse(Vec<String>),
}

struct Backend {
    base_url: String,
    hits: Arc<Mutex<Vec<String>>>,
}

impl Backend {
    fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

async fn serve(routes: Vec<(&'static str, Reply)>) -> Backend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes: Arc<HashMap<&'static str, Reply>> = Arc::new(routes.into_iter().collect());
    let hits = Arc::new(Mutex::new(Vec::new()));
    let log = hits.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let routes = routes.clone();
            let log = log.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&buf).to_string();
                let mut parts = head.split_whitespace();
                let method = parts.next().unwrap_or("").to_string();
                let path = parts.next().unwrap_or("").to_string();
                log.lock().unwrap().push(format!("{method} {path}"));

                match routes.get(path.as_str()) {
                    Some(Reply::Json(status, body)) => {
                        let resp = format!(
                            "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                            body.len()
                        );
                        let _ = socket.write_all(resp.as_bytes()).await;
                    }
                    Some(Reply::Redirect(location)) => {
                        let resp = format!(
                            "HTTP/1.1 307 Temporary Redirect\r\nlocation: {location}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                        );
                        let _ = socket.write_all(resp.as_bytes()).await;
                    }
                    Some(Reply::Sse(events)) => {
                        let head = "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\nconnection: close\r\n\r\n";
                        if socket.write_all(head.as_bytes()).await.is_err() {
                            return;
                        }
                        for event in events {
                            let frame = format!("data: {event}\n\n");
                            if socket.write_all(frame.as_bytes()).await.is_err() {
                                return;
                            }
                            let _ = socket.flush().await;
                            tokio::time::sleep(Duration::from_millis(5)).await;
                        }
                    }
                    None => {
                        let _ = socket
                            .write_all(b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                            .await;
                    }
                }
                let _ = socket.shutdown().await;
            });
        }
    });

    Backend {
        base_url: format!("http://{addr}/api"),
        hits,
    }
}

const PROFILE: &str = r#"{"author":{"name":"Jane Doe","citations":1200,"hIndex":18,"i10Index":25},
    "publications":[
        {"title":"EEG study of epilepsy","authors":"J Doe","venue":"Brain","year":2020,"citations":5,"url":null,"abstract":null},
        {"title":"Algorithm for detection","authors":"J Doe and A Roe","venue":null,"year":null,"citations":20,"url":"https://x","abstract":"text"}
    ]}"#;

fn ready() -> (&'static str, Reply) {
    (
        "/api/status",
        Reply::Json(200, r#"{"status":"ready","cache_exists":true}"#.to_string()),
    )
}

fn transport(backend: &Backend) -> HttpTransport {
    HttpTransport::new(&backend.base_url, Duration::from_secs(5)).unwrap()
}

fn fast_policy() -> ReadinessPolicy {
    ReadinessPolicy {
        retry_delay: Duration::from_millis(10),
        max_attempts: Some(3),
    }
}

#[tokio::test]
async fn cached_response_is_immediate() {
    let body = format!(
        r#"{{"data":{PROFILE},"fromCache":true,"isFresh":true,"lastUpdated":"2024-03-01T00:00:00"}}"#
    );
    let backend = serve(vec![ready(), ("/api/publications", Reply::Json(200, body))]).await;

    let acquisition = transport(&backend).acquire().await.unwrap();
    let Acquisition::Immediate(result) = acquisition else {
        panic!("expected immediate result");
    };
    assert!(result.from_cache);
    assert!(result.is_fresh);
    assert_eq!(result.author.h_index, 18);
    assert_eq!(result.publications.len(), 2);
    assert_eq!(result.publications[1].year, 0);
}

#[tokio::test]
async fn redirect_opens_stream_and_controller_reaches_ready() {
    let events = vec![
        r#"{"progress":{"current":0,"total":2,"latest":"Starting..."}}"#.to_string(),
        r#"{"progress":{"current":1,"total":2,"latest":"EEG study of epilepsy"}}"#.to_string(),
        r#"{"progress":{"current":2,"total":2,"latest":"Algorithm for detection"}}"#.to_string(),
        format!(r#"{{"done":true,"data":{}}}"#, PROFILE.replace('\n', " ")),
    ];
    let backend = serve(vec![
        ready(),
        ("/api/publications", Reply::Redirect("/api/publications/stream")),
        ("/api/publications/stream", Reply::Sse(events)),
    ])
    .await;

    let ctl = AcquisitionController::new(transport(&backend), fast_policy());
    let mut progress = ctl.subscribe_progress();
    let result = ctl.run(&CancellationToken::new()).await.unwrap();

    assert!(!result.from_cache);
    assert_eq!(result.publications.len(), 2);
    assert_eq!(result.author.name, "Jane Doe");
    assert!(matches!(ctl.state(), ControllerState::Ready(_)));
    assert_eq!(progress.borrow_and_update().current, 2);
    assert_eq!(
        backend.hits(),
        vec![
            "GET /api/status",
            "GET /api/publications",
            "GET /api/publications/stream"
        ]
    );
}

#[tokio::test]
async fn stream_error_event_fails_cycle() {
    let events = vec![
        r#"{"progress":{"current":1,"total":3,"latest":"A"}}"#.to_string(),
        r#"{"error":"x"}"#.to_string(),
    ];
    let backend = serve(vec![
        ready(),
        ("/api/publications", Reply::Redirect("/api/publications/stream")),
        ("/api/publications/stream", Reply::Sse(events)),
    ])
    .await;

    let ctl = AcquisitionController::new(transport(&backend), fast_policy());
    let err = ctl.run(&CancellationToken::new()).await.unwrap_err();

    assert_eq!(err, ClientError::Stream("x".to_string()));
    assert_eq!(ctl.state(), ControllerState::Failed("x".to_string()));
}

#[tokio::test]
async fn stream_ending_early_fails_cycle() {
    let events = vec![r#"{"progress":{"current":1,"total":3,"latest":"A"}}"#.to_string()];
    let backend = serve(vec![
        ready(),
        ("/api/publications", Reply::Redirect("/api/publications/stream")),
        ("/api/publications/stream", Reply::Sse(events)),
    ])
    .await;

    let ctl = AcquisitionController::new(transport(&backend), fast_policy());
    let err = ctl.run(&CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::Stream(_)));
}

#[tokio::test]
async fn error_body_is_server_reported() {
    let backend = serve(vec![
        ready(),
        (
            "/api/publications",
            Reply::Json(200, r#"{"error":"rate limited"}"#.to_string()),
        ),
    ])
    .await;

    let err = transport(&backend).acquire().await.unwrap_err();
    assert_eq!(err, ClientError::ServerReported("rate limited".to_string()));
}

#[tokio::test]
async fn unready_server_times_out_with_bounded_policy() {
    let backend = serve(vec![(
        "/api/status",
        Reply::Json(503, "starting".to_string()),
    )])
    .await;

    let ctl = AcquisitionController::new(transport(&backend), fast_policy());
    let err = ctl.run(&CancellationToken::new()).await.unwrap_err();

    assert_eq!(err, ClientError::ReadinessTimeout { attempts: 3 });
    assert_eq!(backend.hits().len(), 3);
}

#[tokio::test]
async fn update_success_and_failure() {
    let ok = serve(vec![(
        "/api/publications/update",
        Reply::Json(
            200,
            format!(
                r#"{{"success":true,"message":"Data updated successfully","lastUpdated":"2024-03-01T09:30:00.123456","data":{PROFILE}}}"#
            ),
        ),
    )])
    .await;
    let outcome = transport(&ok).update().await.unwrap();
    assert!(outcome.last_updated.is_some());
    assert_eq!(outcome.data.unwrap().publications.len(), 2);
    assert_eq!(ok.hits(), vec!["POST /api/publications/update"]);

    let failing = serve(vec![(
        "/api/publications/update",
        Reply::Json(
            500,
            r#"{"success":false,"message":"Failed to fetch new data"}"#.to_string(),
        ),
    )])
    .await;
    assert_eq!(
        transport(&failing).update().await.unwrap_err(),
        ClientError::UpdateFailure("Failed to fetch new data".to_string())
    );
}

#[tokio::test]
async fn cache_status_round_trip() {
    let backend = serve(vec![(
        "/api/publications/status",
        Reply::Json(
            200,
            r#"{"has_cache":true,"last_updated":"2024-03-01T09:30:00","is_fresh":false}"#
                .to_string(),
        ),
    )])
    .await;

    let status = transport(&backend).cache_status().await.unwrap();
    assert!(status.has_cache);
    assert!(!status.is_fresh);
    assert!(status.last_updated.is_some());
}
