// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{command_sensor, job, nightly_repository, schedule};

#[test]
fn valid_repository_has_no_structural_errors() {
    let mut repo = nightly_repository("R");
    repo.sensors.push(command_sensor("inbox", "J", "ls"));
    assert!(repo.structural_errors().is_empty());
    assert_eq!(
        repo.summary(),
        RepositorySummary {
            name: "R".into(),
            jobs: 1,
            schedules: 1,
            sensors: 1
        }
    );
}

#[test]
fn dangling_schedule_reference_is_reported() {
    let mut repo = Repository::new("R");
    repo.jobs.push(job("J"));
    repo.schedules.push(schedule("S", "missing", "0 0 * * *"));
    let errors = repo.structural_errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("repository.R.schedule.S"), "{:?}", errors);
    assert!(errors[0].contains("unknown job 'missing'"), "{:?}", errors);
}

#[test]
fn dangling_sensor_reference_is_reported() {
    let mut repo = Repository::new("R");
    repo.sensors.push(command_sensor("watch", "ghost", "true"));
    let errors = repo.structural_errors();
    assert!(errors.iter().any(|e| e.contains("sensor.watch")), "{:?}", errors);
}

#[test]
fn duplicate_definition_names_are_reported_per_kind() {
    let mut repo = Repository::new("R");
    repo.jobs.push(job("J"));
    repo.jobs.push(job("J"));
    // Same name across kinds is fine
    repo.schedules.push(schedule("J", "J", "0 0 * * *"));
    let errors = repo.structural_errors();
    assert_eq!(errors, vec!["repository.R.job.J: duplicate job name".to_string()]);
}

#[test]
fn duplicate_repository_names_are_reported() {
    let repos = vec![nightly_repository("R"), nightly_repository("R")];
    let errors = structural_errors(&repos);
    assert_eq!(errors, vec!["repository.R: duplicate repository name".to_string()]);
}

#[test]
fn file_form_accepts_singular_keys() {
    let json = serde_json::json!({
        "name": "R",
        "job": [{ "name": "J" }],
        "schedule": [{ "name": "S", "job": "J", "cron": "0 0 * * *" }],
        "sensor": [{ "name": "files", "job": "J", "source": { "directory": "/tmp/in" } }]
    });
    let repo: Repository = serde_json::from_value(json).unwrap();
    assert_eq!(repo.schedules[0].timezone, "UTC");
    assert_eq!(repo.sensors[0].interval, "30s");
    assert!(matches!(
        repo.sensors[0].source,
        SensorSource::Directory { pattern: None, .. }
    ));
}

#[test]
fn lookups_by_name() {
    let repo = nightly_repository("R");
    assert!(repo.job("J").is_some());
    assert_eq!(repo.schedule("S").map(|s| s.job.as_str()), Some("J"));
    assert!(repo.sensor("S").is_none());
}
