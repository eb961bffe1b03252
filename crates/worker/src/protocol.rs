// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RPC protocol between the host and a worker.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON envelope
//! `{ "protocol": <version>, "body": <Request|Response> }`. One request
//! and one response per connection.

use chrono::{DateTime, Utc};
use harbor_core::{
    LocationError, LocationErrorKind, Repository, RepositorySummary, ScheduleEvaluation,
    SensorEvaluation,
};
use serde::{Deserialize, Serialize};

#[path = "protocol_wire.rs"]
mod wire;
pub use wire::{
    call, decode, encode, read_message, read_request, read_response, write_message,
    write_request, write_response, ProtocolError, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE,
};

/// Protocol version; bumped on any incompatible change to the messages below
pub const PROTOCOL_VERSION: u32 = 1;

/// Every frame on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub protocol: u32,
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn new(body: T) -> Self {
        Self {
            protocol: PROTOCOL_VERSION,
            body,
        }
    }
}

/// Request from host to worker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Version handshake
    Hello { version: u32, host: String },

    /// Health check ping
    Ping,

    /// Summaries of every repository the worker loaded
    ListRepositories,

    /// Full definitions of one repository
    GetRepository { name: String },

    /// Evaluate one schedule tick
    EvaluateSchedule {
        repository: String,
        job: String,
        schedule: String,
        scheduled_time: DateTime<Utc>,
    },

    /// Evaluate one sensor tick
    EvaluateSensor {
        repository: String,
        job: String,
        sensor: String,
        #[serde(default)]
        cursor: Option<String>,
    },

    /// Stop serving and exit
    Shutdown,
}

impl Request {
    /// Short name for logs and spans
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Hello { .. } => "hello",
            Request::Ping => "ping",
            Request::ListRepositories => "list_repositories",
            Request::GetRepository { .. } => "get_repository",
            Request::EvaluateSchedule { .. } => "evaluate_schedule",
            Request::EvaluateSensor { .. } => "evaluate_sensor",
            Request::Shutdown => "shutdown",
        }
    }
}

/// Response from worker to host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Hello {
        version: u32,
        worker_id: String,
        pid: u32,
    },

    Pong,

    Repositories {
        repositories: Vec<RepositorySummary>,
    },

    Repository {
        repository: Box<Repository>,
    },

    Schedule {
        result: ScheduleEvaluation,
    },

    Sensor {
        result: SensorEvaluation,
    },

    ShuttingDown,

    Error {
        error: WireError,
    },
}

impl Response {
    pub fn error(kind: LocationErrorKind, message: impl Into<String>) -> Self {
        Response::Error {
            error: WireError {
                kind,
                message: message.into(),
            },
        }
    }
}

/// Structured error carried in [`Response::Error`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireError {
    pub kind: LocationErrorKind,
    pub message: String,
}

impl From<LocationError> for WireError {
    fn from(err: LocationError) -> Self {
        Self {
            kind: err.kind,
            message: err.message,
        }
    }
}

impl From<WireError> for LocationError {
    fn from(err: WireError) -> Self {
        LocationError::new(err.kind, err.message)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
