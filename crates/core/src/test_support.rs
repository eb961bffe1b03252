// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Definition builders shared by tests across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{JobDefinition, Repository, ScheduleDefinition, SensorDefinition, SensorSource};
use std::collections::BTreeMap;

pub fn job(name: &str) -> JobDefinition {
    JobDefinition {
        name: name.to_string(),
        description: None,
        config_schema: serde_json::Value::Null,
        tags: BTreeMap::new(),
    }
}

pub fn schedule(name: &str, job: &str, cron: &str) -> ScheduleDefinition {
    ScheduleDefinition {
        name: name.to_string(),
        job: job.to_string(),
        cron: cron.to_string(),
        timezone: "UTC".to_string(),
        run_config: serde_json::Value::Null,
        tags: BTreeMap::new(),
        should_execute: None,
        description: None,
    }
}

pub fn command_sensor(name: &str, job: &str, command: &str) -> SensorDefinition {
    SensorDefinition {
        name: name.to_string(),
        job: job.to_string(),
        interval: "30s".to_string(),
        source: SensorSource::Command {
            command: command.to_string(),
        },
        run_config: serde_json::Value::Null,
        tags: BTreeMap::new(),
        description: None,
    }
}

/// Repository `name` with one job `J` and a midnight schedule `S` targeting it.
pub fn nightly_repository(name: &str) -> Repository {
    let mut repo = Repository::new(name);
    repo.jobs.push(job("J"));
    repo.schedules.push(schedule("S", "J", "0 0 * * *"));
    repo
}
