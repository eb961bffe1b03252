// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::evaluate::EvalContext;
use crate::protocol::{call, read_message, write_message, Request};
use harbor_core::test_support::nightly_repository;
use std::time::Duration;
use tokio::net::{TcpStream, UnixStream};

fn handler() -> Arc<Handler> {
    Arc::new(Handler::new(
        "w",
        "etl",
        Ok(vec![nightly_repository("R")]),
        EvalContext {
            working_dir: std::env::temp_dir(),
            command_timeout: Duration::from_secs(5),
        },
    ))
}

async fn start(addr: BindAddr) -> (Arc<Server>, String) {
    let server = Arc::new(Server::bind(&addr).await.unwrap());
    let local = server.local_addr();
    let running = Arc::clone(&server);
    tokio::spawn(async move { running.run(handler()).await });
    (server, local)
}

#[tokio::test]
async fn serves_unix_socket_requests() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("sockets/w.sock");
    let (_server, local) = start(BindAddr::Unix(path.clone())).await;
    assert_eq!(local, path.display().to_string());

    for _ in 0..2 {
        let mut stream = UnixStream::connect(&path).await.unwrap();
        let response = call(&mut stream, &Request::Ping, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(response, Response::Pong);
    }
}

#[tokio::test]
async fn serves_tcp_requests_on_ephemeral_port() {
    let (_server, local) = start(BindAddr::Tcp {
        host: "127.0.0.1".into(),
        port: 0,
    })
    .await;
    let mut stream = TcpStream::connect(&local).await.unwrap();
    let response = call(&mut stream, &Request::ListRepositories, Duration::from_secs(2))
        .await
        .unwrap();
    assert!(matches!(response, Response::Repositories { repositories } if repositories.len() == 1));
}

#[tokio::test]
async fn replaces_stale_socket_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("w.sock");
    std::fs::write(&path, "stale").unwrap();
    let server = Server::bind(&BindAddr::Unix(path.clone())).await.unwrap();
    assert_eq!(server.socket_path(), Some(&path));
}

#[tokio::test]
async fn answers_other_protocol_versions_with_mismatch() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("w.sock");
    let (_server, _) = start(BindAddr::Unix(path.clone())).await;

    let mut stream = UnixStream::connect(&path).await.unwrap();
    write_message(&mut stream, br#"{"protocol": 7, "body": {"type": "Ping"}}"#)
        .await
        .unwrap();
    let bytes = read_message(&mut stream).await.unwrap();
    let response: Response = protocol::decode(&bytes).unwrap();
    assert!(matches!(
        response,
        Response::Error { error } if error.kind == LocationErrorKind::ProtocolVersionMismatch
    ));
}

#[tokio::test]
async fn answers_garbage_with_malformed_error() {
    let (mut host, worker) = tokio::io::duplex(4096);
    let h = handler();
    let serve = tokio::spawn(async move { serve_connection(worker, &h).await });

    write_message(&mut host, b"not json").await.unwrap();
    let response: Response = protocol::decode(&read_message(&mut host).await.unwrap()).unwrap();
    assert!(matches!(
        response,
        Response::Error { error } if error.message.starts_with("malformed request")
    ));
    serve.await.unwrap().unwrap();
}
