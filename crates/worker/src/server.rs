// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Accept loop: one task per connection, one request per connection.

use std::path::PathBuf;
use std::sync::Arc;

use harbor_core::LocationErrorKind;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, UnixListener};
use tracing::{debug, error, warn};

use crate::handler::Handler;
use crate::protocol::{self, ProtocolError, Response, DEFAULT_TIMEOUT};

/// Where the worker listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindAddr {
    Unix(PathBuf),
    Tcp { host: String, port: u16 },
}

pub enum Server {
    Unix { listener: UnixListener, path: PathBuf },
    Tcp(TcpListener),
}

impl Server {
    pub async fn bind(addr: &BindAddr) -> std::io::Result<Self> {
        match addr {
            BindAddr::Unix(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                // A stale socket from a killed worker would make bind fail
                if path.exists() {
                    std::fs::remove_file(path)?;
                }
                let listener = UnixListener::bind(path)?;
                Ok(Server::Unix {
                    listener,
                    path: path.clone(),
                })
            }
            BindAddr::Tcp { host, port } => {
                let listener = TcpListener::bind((host.as_str(), *port)).await?;
                Ok(Server::Tcp(listener))
            }
        }
    }

    /// Printable listen address (socket path or `host:port`)
    pub fn local_addr(&self) -> String {
        match self {
            Server::Unix { path, .. } => path.display().to_string(),
            Server::Tcp(listener) => listener
                .local_addr()
                .map(|a| a.to_string())
                .unwrap_or_default(),
        }
    }

    /// Socket file to remove on exit
    pub fn socket_path(&self) -> Option<&PathBuf> {
        match self {
            Server::Unix { path, .. } => Some(path),
            Server::Tcp(_) => None,
        }
    }

    /// Accept connections forever, spawning a task for each.
    pub async fn run(&self, handler: Arc<Handler>) {
        loop {
            let accepted = match self {
                Server::Unix { listener, .. } => listener.accept().await.map(|(stream, _)| {
                    spawn_connection(stream, Arc::clone(&handler));
                }),
                Server::Tcp(listener) => listener.accept().await.map(|(stream, peer)| {
                    debug!(%peer, "accepted");
                    spawn_connection(stream, Arc::clone(&handler));
                }),
            };
            if let Err(e) = accepted {
                error!("accept error: {}", e);
            }
        }
    }
}

fn spawn_connection<S>(stream: S, handler: Arc<Handler>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = serve_connection(stream, &handler).await {
            match e {
                ProtocolError::ConnectionClosed => debug!("host disconnected"),
                ProtocolError::Timeout(_) => warn!("connection timeout"),
                _ => error!("connection error: {}", e),
            }
        }
    });
}

/// Read one request, answer it, and close.
pub async fn serve_connection<S>(stream: S, handler: &Handler) -> Result<(), ProtocolError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut reader, mut writer) = tokio::io::split(stream);

    let response = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(request) => {
            debug!(kind = request.kind(), "received request");
            handler.handle(request).await
        }
        Err(ProtocolError::VersionMismatch { expected, found }) => Response::error(
            LocationErrorKind::ProtocolVersionMismatch,
            format!("worker speaks protocol {}, host sent {}", expected, found),
        ),
        Err(ProtocolError::Json(e)) => Response::error(
            LocationErrorKind::ConnectionLost,
            format!("malformed request: {}", e),
        ),
        Err(e) => return Err(e),
    };

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
