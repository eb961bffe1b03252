//! `harbor tick-schedule` specs

use crate::prelude::*;

#[test]
fn explicit_time_renders_run_config() {
    let project = Project::with_broken_location();
    project
        .harbor()
        .args(&["tick-schedule", "R", "S", "--time", "2026-03-01T00:00:00Z"])
        .passes()
        .stdout_eq(
            "scheduled time: 2026-03-01T00:00:00Z\n\
             RUN KEY               JOB  CONFIG\n\
             2026-03-01T00:00:00Z  J    {\"date\":\"2026-03-01\"}\n",
        );
}

#[test]
fn json_output_includes_tags() {
    let project = Project::with_broken_location();
    let json = project
        .harbor()
        .args(&["-o", "json", "tick-schedule", "R", "S", "--time", "2026-03-01T00:00:00Z"])
        .passes()
        .json();
    assert_eq!(json["outcome"], "run_requests");
    let request = &json["run_requests"][0];
    assert_eq!(request["run_key"], "2026-03-01T00:00:00Z");
    assert_eq!(request["run_config"]["date"], "2026-03-01");
    assert_eq!(request["tags"]["harbor/schedule"], "S");
}

#[test]
fn default_time_is_latest_tick() {
    let project = Project::with_broken_location();
    let json = project
        .harbor()
        .args(&["-o", "json", "tick-schedule", "R", "S"])
        .passes()
        .json();
    let scheduled = json["scheduled_time"].as_str().unwrap();
    assert!(scheduled.ends_with("T00:00:00Z"), "{}", scheduled);
}

#[test]
fn off_tick_time_fails() {
    let project = Project::with_broken_location();
    project
        .harbor()
        .args(&["tick-schedule", "R", "S", "--time", "2026-03-01T12:30:00Z"])
        .exits(1)
        .stderr_has("is not a tick of schedule 'S'");
}

#[test]
fn unknown_schedule_fails() {
    let project = Project::with_broken_location();
    project
        .harbor()
        .args(&["tick-schedule", "R", "nope"])
        .exits(1)
        .stderr_has("schedule 'nope' not found in repository 'R'");
}
