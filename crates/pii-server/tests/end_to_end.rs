use std::sync::Arc;

use pii_core::OutputFormat;
use pii_engine::Sanitizer;
use pii_security::RuleSet;
use pii_server::SanitizerServer;
use pii_sink::FileSink;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn post(addr: std::net::SocketAddr, path: &str, content_type: &str, body: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "POST {} HTTP/1.1\r\nHost: localhost\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        path,
        content_type,
        body.len(),
        body
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn test_post_over_tcp_appends_sanitized_line() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("sanitized-app.log");

    let sink = Arc::new(FileSink::open(&log_path, true).await.unwrap());
    let sanitizer = Arc::new(Sanitizer::new(&RuleSet::default(), sink, OutputFormat::Plain).unwrap());
    let app = Arc::new(SanitizerServer {
        sanitizer,
        max_line_bytes: 1024,
        dry_run: false,
    })
    .router(64 * 1024, false);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let response = post(
        addr,
        "/api/logs",
        "application/json",
        r#"{"message": "payment by erin@example.net card 4111-1111-1111-1111"}"#,
    )
    .await;
    assert!(response.starts_with("HTTP/1.1 201"), "unexpected response: {}", response);

    let response = post(addr, "/api/logs", "text/plain", "").await;
    assert!(response.starts_with("HTTP/1.1 400"), "unexpected response: {}", response);

    server.abort();

    let content = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("payment by [REDACTED:EMAIL] card [REDACTED:CREDIT_CARD]"));
    assert!(!content.contains("erin@example.net"));
    assert!(!content.contains("4111"));
}
