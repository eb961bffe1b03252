// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker addresses and the connection-per-call transport.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use harbor_core::LocationErrorKind;
use harbor_worker::protocol::{self, ProtocolError};
use harbor_worker::{Request, Response, PROTOCOL_VERSION};
use tokio::net::{TcpStream, UnixStream};

use super::{CallError, LaunchError};

/// Where a worker accepts connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Unix(PathBuf),
    Tcp { host: String, port: u16 },
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "unix:{}", path.display()),
            Endpoint::Tcp { host, port } => write!(f, "tcp:{}:{}", host, port),
        }
    }
}

/// Identity the worker reported in its handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Hello {
    pub worker_id: String,
    pub pid: u32,
}

impl Endpoint {
    /// Open a connection, send `request`, and read the response.
    ///
    /// `timeout` covers connecting as well as the exchange.
    pub async fn call(&self, request: &Request, timeout: Duration) -> Result<Response, CallError> {
        match tokio::time::timeout(timeout, self.exchange(request, timeout)).await {
            Ok(result) => result.map_err(CallError::from),
            Err(_) => Err(CallError::Timeout(timeout)),
        }
    }

    async fn exchange(&self, request: &Request, timeout: Duration) -> Result<Response, ProtocolError> {
        match self {
            Endpoint::Unix(path) => {
                let mut stream = UnixStream::connect(path).await?;
                protocol::call(&mut stream, request, timeout).await
            }
            Endpoint::Tcp { host, port } => {
                let mut stream = TcpStream::connect((host.as_str(), *port)).await?;
                protocol::call(&mut stream, request, timeout).await
            }
        }
    }

    /// Versioned `Hello` exchange.
    pub(crate) async fn handshake(&self, timeout: Duration) -> Result<Hello, LaunchError> {
        let request = Request::Hello {
            version: PROTOCOL_VERSION,
            host: host_name(),
        };
        match self.call(&request, timeout).await {
            Ok(Response::Hello {
                version,
                worker_id,
                pid,
            }) => {
                if version != PROTOCOL_VERSION {
                    return Err(LaunchError::VersionMismatch(format!(
                        "host speaks {}, worker speaks {}",
                        PROTOCOL_VERSION, version
                    )));
                }
                Ok(Hello { worker_id, pid })
            }
            Ok(Response::Error { error }) if error.kind == LocationErrorKind::ProtocolVersionMismatch => {
                Err(LaunchError::VersionMismatch(error.message))
            }
            Ok(Response::Error { error }) => Err(LaunchError::Handshake(CallError::Malformed(format!(
                "worker answered Hello with an error: {}",
                error.message
            )))),
            Ok(_) => Err(LaunchError::Handshake(CallError::Malformed(
                "unexpected response to Hello".to_string(),
            ))),
            Err(CallError::VersionMismatch { expected, found }) => Err(LaunchError::VersionMismatch(
                format!("host speaks {}, worker speaks {}", expected, found),
            )),
            Err(e) => Err(LaunchError::Handshake(e)),
        }
    }
}

impl From<ProtocolError> for CallError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(e) => CallError::Disconnected(e.to_string()),
            ProtocolError::ConnectionClosed => CallError::Disconnected("connection closed".to_string()),
            ProtocolError::Timeout(d) => CallError::Timeout(d),
            ProtocolError::Json(e) => CallError::Malformed(e.to_string()),
            e @ ProtocolError::MessageTooLarge { .. } => CallError::Malformed(e.to_string()),
            ProtocolError::VersionMismatch { expected, found } => {
                CallError::VersionMismatch { expected, found }
            }
        }
    }
}

/// Identifies this host in handshakes and worker logs.
fn host_name() -> String {
    format!("harbor/{}", std::process::id())
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod tests;
