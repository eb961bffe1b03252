// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository and definition metadata.
//!
//! These records are opaque to the host: it lists and displays them and
//! passes their names back to the worker for evaluation, but never runs
//! them itself. The same types are used for the definition file format
//! (hence the singular serde aliases) and on the wire.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

/// A named collection of jobs, schedules and sensors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default, alias = "job")]
    pub jobs: Vec<JobDefinition>,
    #[serde(default, alias = "schedule")]
    pub schedules: Vec<ScheduleDefinition>,
    #[serde(default, alias = "sensor")]
    pub sensors: Vec<SensorDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Opaque schema for the job's run config
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub config_schema: serde_json::Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDefinition {
    pub name: String,
    /// Target job (same repository)
    pub job: String,
    /// Five-field cron expression, evaluated in `timezone`
    pub cron: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Run config template; string leaves may reference `${scheduled_time}` etc.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub run_config: serde_json::Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    /// Shell command gating each tick; non-zero exit skips the tick
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_execute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDefinition {
    pub name: String,
    /// Target job (same repository)
    pub job: String,
    /// Minimum time between evaluations (e.g. "30s")
    #[serde(default = "default_sensor_interval")]
    pub interval: String,
    pub source: SensorSource,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub run_config: serde_json::Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// What a sensor watches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorSource {
    /// New files in a directory, optionally filtered by name suffix
    Directory {
        directory: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
    /// Shell command printing one run key per line
    Command { command: String },
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_sensor_interval() -> String {
    "30s".to_string()
}

/// Cheap listing entry returned by `ListRepositories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub jobs: usize,
    pub schedules: usize,
    pub sensors: usize,
}

impl Repository {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            jobs: Vec::new(),
            schedules: Vec::new(),
            sensors: Vec::new(),
        }
    }

    pub fn job(&self, name: &str) -> Option<&JobDefinition> {
        self.jobs.iter().find(|j| j.name == name)
    }

    pub fn schedule(&self, name: &str) -> Option<&ScheduleDefinition> {
        self.schedules.iter().find(|s| s.name == name)
    }

    pub fn sensor(&self, name: &str) -> Option<&SensorDefinition> {
        self.sensors.iter().find(|s| s.name == name)
    }

    pub fn summary(&self) -> RepositorySummary {
        RepositorySummary {
            name: self.name.clone(),
            jobs: self.jobs.len(),
            schedules: self.schedules.len(),
            sensors: self.sensors.len(),
        }
    }

    /// Structural checks: non-empty unique names per kind, and every
    /// schedule/sensor targets a job of this repository.
    ///
    /// Returns one message per violation, prefixed with its location
    /// (e.g. `repository.etl.schedule.nightly`).
    pub fn structural_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let prefix = format!("repository.{}", self.name);

        check_names(&prefix, "job", self.jobs.iter().map(|j| &j.name), &mut errors);
        check_names(
            &prefix,
            "schedule",
            self.schedules.iter().map(|s| &s.name),
            &mut errors,
        );
        check_names(
            &prefix,
            "sensor",
            self.sensors.iter().map(|s| &s.name),
            &mut errors,
        );

        for schedule in &self.schedules {
            if self.job(&schedule.job).is_none() {
                errors.push(format!(
                    "{}.schedule.{}: references unknown job '{}'",
                    prefix, schedule.name, schedule.job
                ));
            }
        }
        for sensor in &self.sensors {
            if self.job(&sensor.job).is_none() {
                errors.push(format!(
                    "{}.sensor.{}: references unknown job '{}'",
                    prefix, sensor.name, sensor.job
                ));
            }
        }
        errors
    }
}

fn check_names<'a>(
    prefix: &str,
    kind: &str,
    names: impl Iterator<Item = &'a String>,
    errors: &mut Vec<String>,
) {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            errors.push(format!("{}.{}: name is required", prefix, kind));
        } else if !seen.insert(name.as_str()) {
            errors.push(format!("{}.{}.{}: duplicate {} name", prefix, kind, name, kind));
        }
    }
}

/// Structural checks across all repositories of one location.
pub fn structural_errors(repositories: &[Repository]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for repo in repositories {
        if repo.name.trim().is_empty() {
            errors.push("repository: name is required".to_string());
            continue;
        }
        if !seen.insert(repo.name.as_str()) {
            errors.push(format!("repository.{}: duplicate repository name", repo.name));
        }
        errors.extend(repo.structural_errors());
    }
    errors
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
