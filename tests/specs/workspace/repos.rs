//! `harbor repos` specs

use crate::prelude::*;

#[test]
fn lists_repositories_and_warns_about_failures() {
    let project = Project::with_broken_location();
    project
        .harbor()
        .args(&["repos"])
        .passes()
        .stdout_eq(
            "REPOSITORY  LOCATION  JOBS  SCHEDULES  SENSORS\n\
             R           etl          1          1        1\n",
        )
        .stderr_has("warning: location 'broken' failed to load: import_failure");
}

#[test]
fn single_file_mode() {
    let project = Project::empty();
    project.file("defs/nightly.toml", NIGHTLY_DEFS);
    let json = project
        .harbor()
        .args(&["-f", "defs/nightly.toml", "-o", "json", "repos"])
        .passes()
        .json();
    assert_eq!(
        json,
        serde_json::json!([
            {"location": "nightly", "name": "R", "jobs": 1, "schedules": 1, "sensors": 1}
        ])
    );
}
