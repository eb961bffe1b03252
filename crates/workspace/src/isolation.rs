// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure isolation: every way a location can fail becomes a
//! [`LocationError`] value attached to that location.
//!
//! | Source                                          | Kind                    |
//! |-------------------------------------------------|-------------------------|
//! | spawn failed, worker exited before ready        | ImportFailure           |
//! | worker could not load its definitions           | (as reported by worker) |
//! | socket refused/closed, process gone, heartbeat  | ConnectionLost          |
//! | malformed frame or unexpected response          | ConnectionLost          |
//! | deadline elapsed                                | Timeout                 |
//! | envelope or handshake version differs           | ProtocolVersionMismatch |

use harbor_adapters::{CallError, LaunchError};
use harbor_core::LocationError;
use harbor_worker::Response;
use tokio::task::JoinError;

pub fn from_launch_error(err: &LaunchError) -> LocationError {
    match err {
        LaunchError::Spawn(_) | LaunchError::ExitedBeforeReady { .. } => {
            LocationError::import_failure(err.to_string())
        }
        LaunchError::StartupTimeout(_) => LocationError::timeout(err.to_string()),
        LaunchError::Connect { .. } => LocationError::connection_lost(err.to_string()),
        LaunchError::Handshake(call) => {
            let inner = from_call_error(call);
            LocationError::new(inner.kind, format!("handshake failed: {}", inner.message))
        }
        LaunchError::VersionMismatch(_) => LocationError::version_mismatch(err.to_string()),
    }
}

pub fn from_call_error(err: &CallError) -> LocationError {
    match err {
        CallError::Timeout(_) => LocationError::timeout(err.to_string()),
        CallError::Disconnected(_) | CallError::Malformed(_) => {
            LocationError::connection_lost(err.to_string())
        }
        CallError::VersionMismatch { .. } => LocationError::version_mismatch(err.to_string()),
    }
}

/// A well-formed frame carrying the wrong response variant.
pub fn unexpected_response(expected: &str, got: &Response) -> LocationError {
    LocationError::connection_lost(format!(
        "malformed response: expected {}, got {}",
        expected,
        response_name(got)
    ))
}

/// A load task that died without producing a result.
///
/// Cancellation is not a failure; the superseding load reports instead.
pub fn from_join_error(err: &JoinError) -> Option<LocationError> {
    if err.is_cancelled() {
        return None;
    }
    Some(LocationError::connection_lost(format!(
        "location load aborted: {}",
        err
    )))
}

fn response_name(response: &Response) -> &'static str {
    match response {
        Response::Hello { .. } => "Hello",
        Response::Pong => "Pong",
        Response::Repositories { .. } => "Repositories",
        Response::Repository { .. } => "Repository",
        Response::Schedule { .. } => "Schedule",
        Response::Sensor { .. } => "Sensor",
        Response::ShuttingDown => "ShuttingDown",
        Response::Error { .. } => "Error",
    }
}

#[cfg(test)]
#[path = "isolation_tests.rs"]
mod tests;
