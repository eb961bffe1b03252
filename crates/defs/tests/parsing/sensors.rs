// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sensor source variants and defaults.

use harbor_core::SensorSource;
use harbor_defs::Format;

#[test]
fn command_source() {
    let input = r#"
[[repository]]
name = "r"
[[repository.job]]
name = "j"
[[repository.sensor]]
name = "poll"
job = "j"
source = { command = "ls /data" }
"#;
    let file = super::parse(input, Format::Toml);
    let sensor = &file.repositories[0].sensors[0];
    assert_eq!(
        sensor.source,
        SensorSource::Command {
            command: "ls /data".to_string()
        }
    );
    assert_eq!(sensor.interval, "30s");
}

#[test]
fn directory_source_without_pattern() {
    let input = r#"{"repository": [{"name": "r", "job": [{"name": "j"}],
        "sensor": [{"name": "d", "job": "j", "source": {"directory": "in"}}]}]}"#;
    let file = super::parse(input, Format::Json);
    assert_eq!(
        file.repositories[0].sensors[0].source,
        SensorSource::Directory {
            directory: "in".into(),
            pattern: None
        }
    );
}

#[test]
fn unknown_source_shape_is_rejected() {
    let input = r#"
[[repository]]
name = "r"
[[repository.sensor]]
name = "poll"
job = "j"
source = { url = "http://example.com" }
"#;
    assert!(harbor_defs::parse_definitions(input, Format::Toml).is_err());
}
