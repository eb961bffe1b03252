// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker adapters
//!
//! A [`WorkerAdapter`] materializes a [`LaunchSpec`] into a live
//! [`WorkerHandle`]: it spawns (or attaches to) the worker, performs the
//! versioned handshake, and keeps watching the worker's liveness. The
//! handle owns the worker; dropping the last reference kills it.
//!
//! ```text
//! LaunchSpec ──materialize──▶ WorkerHandle ──call──▶ Response
//!                                   │
//!                                   └── state: Connected | Disconnected { reason }
//! ```

mod endpoint;
mod process;

pub use endpoint::Endpoint;
pub use process::{ProcessHandle, ProcessWorkerAdapter};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeHandle, FakeWorkerAdapter, WorkerCall};

use async_trait::async_trait;
use harbor_core::{LocationOrigin, OriginKey};
use harbor_worker::{Request, Response, WorkerLogConfig};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Deadlines applied while launching and watching a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchTimeouts {
    /// Spawn to handshake complete (or, for grpc, all connect attempts)
    pub startup: Duration,
    /// Bound on each heartbeat ping and on the handshake call
    pub call: Duration,
    pub heartbeat_interval: Duration,
    /// Consecutive failed pings before the worker counts as lost
    pub heartbeat_failures: u32,
}

impl Default for LaunchTimeouts {
    fn default() -> Self {
        Self {
            startup: Duration::from_secs(30),
            call: Duration::from_secs(10),
            heartbeat_interval: Duration::from_secs(5),
            heartbeat_failures: 3,
        }
    }
}

/// Everything needed to bring up one location's worker
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub origin: LocationOrigin,
    pub location_name: String,
    pub origin_key: OriginKey,
    pub log: WorkerLogConfig,
    pub timeouts: LaunchTimeouts,
}

impl LaunchSpec {
    pub fn new(origin: LocationOrigin, location_name: impl Into<String>) -> Self {
        Self {
            origin_key: origin.key(),
            origin,
            location_name: location_name.into(),
            log: WorkerLogConfig::default(),
            timeouts: LaunchTimeouts::default(),
        }
    }
}

/// Liveness of an attached worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected { reason: String },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

/// Errors bringing a worker up
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("failed to spawn worker: {0}")]
    Spawn(String),
    #[error("worker exited before ready ({status}): {stderr}")]
    ExitedBeforeReady { status: String, stderr: String },
    #[error("worker not ready after {}ms", .0.as_millis())]
    StartupTimeout(Duration),
    #[error("could not connect to {endpoint} after {attempts} attempts: {reason}")]
    Connect {
        endpoint: String,
        attempts: u32,
        reason: String,
    },
    #[error("handshake failed: {0}")]
    Handshake(CallError),
    #[error("protocol version mismatch: {0}")]
    VersionMismatch(String),
}

/// Errors from a single call to an attached worker
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("no response within {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("worker disconnected: {0}")]
    Disconnected(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("protocol version mismatch: host speaks {expected}, worker speaks {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// A live connection to one worker.
///
/// Calls are independent; any number may be in flight at once.
#[async_trait]
pub trait WorkerHandle: Send + Sync + 'static {
    /// Worker-reported instance id from the handshake
    fn worker_id(&self) -> &str;

    /// Process id of a spawned worker (`None` for attached grpc workers)
    fn pid(&self) -> Option<u32>;

    /// Subscribe to liveness changes
    fn state(&self) -> watch::Receiver<ConnectionState>;

    /// Send one request and wait for its response
    async fn call(&self, request: Request, timeout: Duration) -> Result<Response, CallError>;

    /// Ask the worker to stop, then make sure it has.
    async fn terminate(&self);
}

/// Materializes location origins into worker handles
#[async_trait]
pub trait WorkerAdapter: Clone + Send + Sync + 'static {
    type Handle: WorkerHandle;

    async fn materialize(&self, spec: &LaunchSpec) -> Result<Self::Handle, LaunchError>;
}
