// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evaluation results handed to the run-launching collaborator

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A request to launch one run of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Deduplication key; the same key never launches twice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_key: Option<String>,
    pub job: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub run_config: serde_json::Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// Outcome of one schedule tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScheduleEvaluation {
    RunRequests { run_requests: Vec<RunRequest> },
    Skip { reason: String },
    /// User code failed; the tick produced nothing
    Error { message: String },
}

/// Outcome of one sensor tick.
///
/// The cursor is only ever advanced together with a complete result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SensorEvaluation {
    RunRequests {
        run_requests: Vec<RunRequest>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cursor: Option<String>,
    },
    Skip {
        reason: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cursor: Option<String>,
    },
    Error { message: String },
}

impl ScheduleEvaluation {
    pub fn run_requests(&self) -> &[RunRequest] {
        match self {
            ScheduleEvaluation::RunRequests { run_requests } => run_requests,
            _ => &[],
        }
    }
}

impl SensorEvaluation {
    pub fn run_requests(&self) -> &[RunRequest] {
        match self {
            SensorEvaluation::RunRequests { run_requests, .. } => run_requests,
            _ => &[],
        }
    }

    /// Cursor to persist for the next tick, if the evaluation produced one.
    pub fn cursor(&self) -> Option<&str> {
        match self {
            SensorEvaluation::RunRequests { cursor, .. } | SensorEvaluation::Skip { cursor, .. } => {
                cursor.as_deref()
            }
            SensorEvaluation::Error { .. } => None,
        }
    }
}
