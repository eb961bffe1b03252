// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured location failures.
//!
//! Every failure scoped to one location, whether raised by user code in
//! the worker or by the connection to it, ends up as a [`LocationError`]
//! value attached to that location. It is data, not a fault: the host
//! keeps serving every other location.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure taxonomy for a repository location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationErrorKind {
    /// The worker could not load the target (missing file, syntax error,
    /// process died during startup)
    ImportFailure,
    /// Loaded, but the definition graph is invalid
    DefinitionError,
    /// Process died or socket closed after a successful handshake
    ConnectionLost,
    /// No response within the call's deadline
    Timeout,
    /// Handshake or frame version incompatible
    ProtocolVersionMismatch,
}

impl LocationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationErrorKind::ImportFailure => "import_failure",
            LocationErrorKind::DefinitionError => "definition_error",
            LocationErrorKind::ConnectionLost => "connection_lost",
            LocationErrorKind::Timeout => "timeout",
            LocationErrorKind::ProtocolVersionMismatch => "protocol_version_mismatch",
        }
    }
}

impl fmt::Display for LocationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A displayable, serializable location failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct LocationError {
    pub kind: LocationErrorKind,
    pub message: String,
}

impl LocationError {
    pub fn new(kind: LocationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn import_failure(message: impl Into<String>) -> Self {
        Self::new(LocationErrorKind::ImportFailure, message)
    }

    pub fn definition(message: impl Into<String>) -> Self {
        Self::new(LocationErrorKind::DefinitionError, message)
    }

    pub fn connection_lost(message: impl Into<String>) -> Self {
        Self::new(LocationErrorKind::ConnectionLost, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(LocationErrorKind::Timeout, message)
    }

    pub fn version_mismatch(message: impl Into<String>) -> Self {
        Self::new(LocationErrorKind::ProtocolVersionMismatch, message)
    }

    /// Transient kinds are worth retrying for idempotent reads.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            LocationErrorKind::ConnectionLost | LocationErrorKind::Timeout
        )
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
