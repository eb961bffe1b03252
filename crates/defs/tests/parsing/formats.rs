// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The same definitions expressed in each supported format.

use harbor_defs::Format;
use harbor_core::SensorSource;

const TOML: &str = r#"
[[repository]]
name = "etl"

[[repository.job]]
name = "ingest"
description = "Load raw files"
config_schema = { path = "string" }
tags = { team = "data" }

[[repository.schedule]]
name = "nightly"
job = "ingest"
cron = "0 0 * * *"
run_config = { date = "${scheduled_date}" }

[[repository.sensor]]
name = "inbox"
job = "ingest"
interval = "30s"
source = { directory = "/data/inbox", pattern = ".csv" }
run_config = { path = "${path}" }
"#;

const JSON: &str = r#"{
  "repositories": [{
    "name": "etl",
    "jobs": [{
      "name": "ingest",
      "description": "Load raw files",
      "config_schema": { "path": "string" },
      "tags": { "team": "data" }
    }],
    "schedules": [{
      "name": "nightly",
      "job": "ingest",
      "cron": "0 0 * * *",
      "run_config": { "date": "${scheduled_date}" }
    }],
    "sensors": [{
      "name": "inbox",
      "job": "ingest",
      "interval": "30s",
      "source": { "directory": "/data/inbox", "pattern": ".csv" },
      "run_config": { "path": "${path}" }
    }]
  }]
}"#;

const HCL: &str = r#"
repository = [{
  name = "etl"
  job = [{
    name          = "ingest"
    description   = "Load raw files"
    config_schema = { path = "string" }
    tags          = { team = "data" }
  }]
  schedule = [{
    name       = "nightly"
    job        = "ingest"
    cron       = "0 0 * * *"
    run_config = { date = "${scheduled_date}" }
  }]
  sensor = [{
    name       = "inbox"
    job        = "ingest"
    interval   = "30s"
    source     = { directory = "/data/inbox", pattern = ".csv" }
    run_config = { path = "${path}" }
  }]
}]
"#;

#[yare::parameterized(
    toml = { TOML, Format::Toml },
    json = { JSON, Format::Json },
    hcl = { HCL, Format::Hcl },
)]
fn parses_full_repository(input: &str, format: Format) {
    let file = crate::parse(input, format);
    assert_eq!(file.repositories.len(), 1);

    let repo = &file.repositories[0];
    assert_eq!(repo.name, "etl");
    assert_eq!(repo.jobs.len(), 1);
    assert_eq!(repo.jobs[0].tags["team"], "data");
    assert_eq!(repo.jobs[0].config_schema["path"], "string");

    let schedule = repo.schedule("nightly").unwrap();
    assert_eq!(schedule.cron, "0 0 * * *");
    assert_eq!(schedule.timezone, "UTC");
    assert_eq!(schedule.run_config["date"], "${scheduled_date}");

    let sensor = repo.sensor("inbox").unwrap();
    assert_eq!(
        sensor.source,
        SensorSource::Directory {
            directory: "/data/inbox".into(),
            pattern: Some(".csv".to_string()),
        }
    );

    assert!(crate::violations(input, format).is_empty());
}

#[test]
fn toml_and_json_agree() {
    assert_eq!(
        super::parse(TOML, Format::Toml),
        super::parse(JSON, Format::Json)
    );
}

#[test]
fn several_repositories_keep_declaration_order() {
    let input = r#"
[[repository]]
name = "b"

[[repository]]
name = "a"
"#;
    let names: Vec<_> = super::parse(input, Format::Toml)
        .repositories
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, ["b", "a"]);
}
