//! `harbor tick-sensor` specs

use crate::prelude::*;

#[test]
fn command_sensor_emits_keys_and_cursor() {
    let project = Project::with_broken_location();
    project
        .harbor()
        .args(&["tick-sensor", "R", "files"])
        .passes()
        .stdout_eq(
            "RUN KEY  JOB  CONFIG\n\
             a        J    -\n\
             b        J    -\n\
             cursor: b\n",
        );
}

#[test]
fn cursor_is_passed_to_the_command() {
    let project = Project::empty();
    project.file(
        "defs.toml",
        r#"
[[repository]]
name = "R"

[[repository.job]]
name = "J"

[[repository.sensor]]
name = "echo"
job = "J"
source = { command = "echo \"after-$HARBOR_CURSOR\"" }
"#,
    );
    let json = project
        .harbor()
        .args(&["-f", "defs.toml", "-o", "json", "tick-sensor", "R", "echo", "--cursor", "7"])
        .passes()
        .json();
    assert_eq!(json["run_requests"][0]["run_key"], "after-7");
    assert_eq!(json["cursor"], "after-7");
}

#[test]
fn failing_command_fails_the_tick() {
    let project = Project::empty();
    project.file(
        "defs.toml",
        r#"
[[repository]]
name = "R"

[[repository.job]]
name = "J"

[[repository.sensor]]
name = "broken"
job = "J"
source = { command = "echo nope >&2; exit 3" }
"#,
    );
    project
        .harbor()
        .args(&["-f", "defs.toml", "tick-sensor", "R", "broken"])
        .exits(1)
        .stderr_has("sensor 'broken' command returned");
}
