// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Definition graph validation

use crate::cron::CronSchedule;
use crate::duration::parse_duration;
use harbor_core::{structural_errors, Repository, SensorSource};

/// Timezones schedules may be evaluated in
const SUPPORTED_TIMEZONES: &[&str] = &["UTC"];

/// Check a location's repositories; one message per violation.
///
/// Adds cron, timezone, interval and sensor source checks on top of the
/// structural checks from `harbor-core`.
pub fn validate_repositories(repositories: &[Repository]) -> Vec<String> {
    let mut errors = structural_errors(repositories);

    for repo in repositories {
        for schedule in &repo.schedules {
            let at = format!("repository.{}.schedule.{}", repo.name, schedule.name);
            if let Err(e) = CronSchedule::parse(&schedule.cron) {
                errors.push(format!("{}: {}", at, e));
            }
            if !SUPPORTED_TIMEZONES.contains(&schedule.timezone.as_str()) {
                errors.push(format!(
                    "{}: unsupported timezone '{}' (only UTC)",
                    at, schedule.timezone
                ));
            }
            if matches!(&schedule.should_execute, Some(cmd) if cmd.trim().is_empty()) {
                errors.push(format!("{}: should_execute is empty", at));
            }
        }

        for sensor in &repo.sensors {
            let at = format!("repository.{}.sensor.{}", repo.name, sensor.name);
            match parse_duration(&sensor.interval) {
                Ok(d) if d.is_zero() => errors.push(format!("{}: interval must be positive", at)),
                Ok(_) => {}
                Err(e) => errors.push(format!("{}: {}", at, e)),
            }
            match &sensor.source {
                SensorSource::Directory { directory, .. } if directory.as_os_str().is_empty() => {
                    errors.push(format!("{}: source directory is empty", at));
                }
                SensorSource::Command { command } if command.trim().is_empty() => {
                    errors.push(format!("{}: source command is empty", at));
                }
                _ => {}
            }
        }
    }

    errors
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
