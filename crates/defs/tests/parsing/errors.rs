// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decode errors and validation messages.

use harbor_defs::{parse_definitions, Format};

#[test]
fn toml_syntax_error() {
    let err = parse_definitions("[[repository]\n", Format::Toml).unwrap_err();
    super::assert_err_contains(&err, &["TOML parse error"]);
}

#[test]
fn json_syntax_error() {
    let err = parse_definitions("{\"repositories\": [", Format::Json).unwrap_err();
    super::assert_err_contains(&err, &["JSON parse error"]);
}

#[test]
fn missing_required_field() {
    let input = "[[repository]]\nname = \"r\"\n[[repository.schedule]]\nname = \"s\"\njob = \"j\"\n";
    let err = parse_definitions(input, Format::Toml).unwrap_err();
    super::assert_err_contains(&err, &["cron"]);
}

#[test]
fn duplicate_names_per_kind() {
    let input = r#"
[[repository]]
name = "r"
[[repository.job]]
name = "j"
[[repository.job]]
name = "j"
"#;
    assert_eq!(
        super::violations(input, Format::Toml),
        vec!["repository.r.job.j: duplicate job name"]
    );
}

#[test]
fn same_job_name_in_two_repositories_is_fine() {
    let input = r#"
[[repository]]
name = "a"
[[repository.job]]
name = "j"

[[repository]]
name = "b"
[[repository.job]]
name = "j"
"#;
    assert!(super::violations(input, Format::Toml).is_empty());
}

#[test]
fn dangling_sensor_job() {
    let input = r#"
[[repository]]
name = "r"
[[repository.sensor]]
name = "s"
job = "ghost"
source = { command = "ls" }
"#;
    assert_eq!(
        super::violations(input, Format::Toml),
        vec!["repository.r.sensor.s: references unknown job 'ghost'"]
    );
}

#[test]
fn invalid_cron_and_timezone_reported_together() {
    let input = r#"
[[repository]]
name = "r"
[[repository.job]]
name = "j"
[[repository.schedule]]
name = "s"
job = "j"
cron = "every day"
timezone = "America/New_York"
"#;
    let errors = super::violations(input, Format::Toml);
    assert_eq!(errors.len(), 2, "{:?}", errors);
    assert!(errors[0].contains("expected 5 fields, found 2"));
    assert!(errors[1].contains("unsupported timezone"));
}
