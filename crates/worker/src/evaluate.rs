// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule and sensor evaluation.
//!
//! Evaluation never fails the request: problems in user code come back
//! as `Error` outcomes so the host can tell them apart from transport
//! failures.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

use chrono::{DateTime, SecondsFormat, Utc};
use harbor_core::{
    RunRequest, ScheduleDefinition, ScheduleEvaluation, SensorDefinition, SensorEvaluation,
    SensorSource,
};
use harbor_defs::{interpolate, interpolate_value, CronSchedule};

use crate::user_command::{describe_status, run_shell, stderr_tail};

pub const TAG_SCHEDULE: &str = "harbor/schedule";
pub const TAG_SCHEDULED_TIME: &str = "harbor/scheduled_time";
pub const TAG_SENSOR: &str = "harbor/sensor";

/// Where and how long user commands may run
#[derive(Debug, Clone)]
pub struct EvalContext {
    pub working_dir: PathBuf,
    pub command_timeout: Duration,
}

pub async fn evaluate_schedule(
    ctx: &EvalContext,
    schedule: &ScheduleDefinition,
    job: &str,
    scheduled_time: DateTime<Utc>,
) -> ScheduleEvaluation {
    if schedule.job != job {
        return ScheduleEvaluation::Error {
            message: format!(
                "schedule '{}' targets job '{}', not '{}'",
                schedule.name, schedule.job, job
            ),
        };
    }

    let cron = match CronSchedule::parse(&schedule.cron) {
        Ok(cron) => cron,
        Err(e) => {
            return ScheduleEvaluation::Error {
                message: format!("schedule '{}': {}", schedule.name, e),
            }
        }
    };
    let time_str = scheduled_time.to_rfc3339_opts(SecondsFormat::Secs, true);
    if !cron.matches(&scheduled_time) {
        return ScheduleEvaluation::Error {
            message: format!(
                "{} is not a tick of schedule '{}' ({})",
                time_str, schedule.name, cron
            ),
        };
    }

    let vars: HashMap<String, String> = [
        ("scheduled_time", time_str.clone()),
        ("scheduled_date", scheduled_time.format("%Y-%m-%d").to_string()),
        ("schedule", schedule.name.clone()),
        ("job", schedule.job.clone()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    if let Some(gate) = &schedule.should_execute {
        let command = interpolate(gate, &vars);
        let description = format!("should_execute for schedule '{}'", schedule.name);
        match run_shell(
            &command,
            &ctx.working_dir,
            &[("HARBOR_SCHEDULED_TIME", time_str.as_str())],
            ctx.command_timeout,
            &description,
        )
        .await
        {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                tracing::debug!(schedule = %schedule.name, status = %describe_status(&output), "tick skipped");
                return ScheduleEvaluation::Skip {
                    reason: format!("should_execute returned {}", describe_status(&output)),
                };
            }
            Err(e) => {
                return ScheduleEvaluation::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    let mut tags = schedule.tags.clone();
    tags.insert(TAG_SCHEDULE.to_string(), schedule.name.clone());
    tags.insert(TAG_SCHEDULED_TIME.to_string(), time_str.clone());

    ScheduleEvaluation::RunRequests {
        run_requests: vec![RunRequest {
            run_key: Some(time_str),
            job: schedule.job.clone(),
            run_config: interpolate_value(&schedule.run_config, &vars),
            tags,
        }],
    }
}

pub async fn evaluate_sensor(
    ctx: &EvalContext,
    sensor: &SensorDefinition,
    job: &str,
    cursor: Option<&str>,
) -> SensorEvaluation {
    if sensor.job != job {
        return SensorEvaluation::Error {
            message: format!(
                "sensor '{}' targets job '{}', not '{}'",
                sensor.name, sensor.job, job
            ),
        };
    }

    let result = match &sensor.source {
        SensorSource::Directory { directory, pattern } => {
            let directory = ctx.working_dir.join(directory);
            let pattern = pattern.clone();
            let after = cursor.map(str::to_string);
            tokio::task::spawn_blocking(move || scan_directory(&directory, pattern.as_deref(), after.as_deref()))
                .await
                .unwrap_or_else(|e| Err(format!("directory scan failed: {}", e)))
        }
        SensorSource::Command { command } => run_command_sensor(ctx, sensor, command, cursor).await,
    };

    match result {
        Ok(Tick::Nothing(reason)) => SensorEvaluation::Skip {
            reason,
            cursor: cursor.map(str::to_string),
        },
        Ok(Tick::Keys { keys, cursor }) => {
            let mut tags = sensor.tags.clone();
            tags.insert(TAG_SENSOR.to_string(), sensor.name.clone());
            let run_requests = keys
                .into_iter()
                .map(|(run_key, extra)| request_for(sensor, run_key, extra, &tags))
                .collect();
            SensorEvaluation::RunRequests {
                run_requests,
                cursor: Some(cursor),
            }
        }
        Err(message) => SensorEvaluation::Error { message },
    }
}

/// What one sensor tick found: run keys with their template variables
enum Tick {
    Nothing(String),
    Keys {
        keys: Vec<(String, HashMap<String, String>)>,
        cursor: String,
    },
}

fn request_for(
    sensor: &SensorDefinition,
    run_key: String,
    mut vars: HashMap<String, String>,
    tags: &BTreeMap<String, String>,
) -> RunRequest {
    vars.insert("sensor".to_string(), sensor.name.clone());
    vars.insert("job".to_string(), sensor.job.clone());
    vars.insert("run_key".to_string(), run_key.clone());
    RunRequest {
        run_config: interpolate_value(&sensor.run_config, &vars),
        run_key: Some(run_key),
        job: sensor.job.clone(),
        tags: tags.clone(),
    }
}

/// Directory cursor: `<mtime_ms>:<file name>` of the last emitted file
fn parse_dir_cursor(cursor: &str) -> Result<(u64, String), String> {
    cursor
        .split_once(':')
        .and_then(|(ms, name)| Some((ms.parse().ok()?, name.to_string())))
        .ok_or_else(|| format!("invalid directory cursor '{}'", cursor))
}

fn scan_directory(directory: &Path, pattern: Option<&str>, cursor: Option<&str>) -> Result<Tick, String> {
    let after = cursor.map(parse_dir_cursor).transpose()?;

    let entries = std::fs::read_dir(directory)
        .map_err(|e| format!("cannot read directory {}: {}", directory.display(), e))?;

    let mut files: Vec<(u64, String, PathBuf)> = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(meta) = entry.metadata() else { continue };
        if !meta.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if pattern.is_some_and(|p| !name.ends_with(p)) {
            continue;
        }
        let mtime_ms = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        files.push((mtime_ms, name, path));
    }
    files.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));

    let fresh: Vec<_> = files
        .into_iter()
        .filter(|(ms, name, _)| match &after {
            Some((after_ms, after_name)) => (*ms, name) > (*after_ms, after_name),
            None => true,
        })
        .collect();

    let Some((last_ms, last_name, _)) = fresh.last() else {
        return Ok(Tick::Nothing(format!("no new files in {}", directory.display())));
    };
    let cursor = format!("{}:{}", last_ms, last_name);

    let keys = fresh
        .into_iter()
        .map(|(ms, name, path)| {
            let vars = HashMap::from([
                ("path".to_string(), path.display().to_string()),
                ("file".to_string(), name.clone()),
                ("mtime".to_string(), ms.to_string()),
            ]);
            (name, vars)
        })
        .collect();

    Ok(Tick::Keys { keys, cursor })
}

async fn run_command_sensor(
    ctx: &EvalContext,
    sensor: &SensorDefinition,
    command: &str,
    cursor: Option<&str>,
) -> Result<Tick, String> {
    let description = format!("sensor '{}' command", sensor.name);
    let output = run_shell(
        command,
        &ctx.working_dir,
        &[("HARBOR_CURSOR", cursor.unwrap_or(""))],
        ctx.command_timeout,
        &description,
    )
    .await
    .map_err(|e| e.to_string())?;

    if !output.status.success() {
        let tail = stderr_tail(&output);
        let mut message = format!("{} returned {}", description, describe_status(&output));
        if !tail.is_empty() {
            message.push_str(":\n");
            message.push_str(&tail);
        }
        return Err(message);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let keys: Vec<String> = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    let Some(last) = keys.last().cloned() else {
        return Ok(Tick::Nothing("command printed no run keys".to_string()));
    };

    Ok(Tick::Keys {
        keys: keys.into_iter().map(|k| (k, HashMap::new())).collect(),
        cursor: last,
    })
}

#[cfg(test)]
#[path = "evaluate_tests.rs"]
mod tests;
