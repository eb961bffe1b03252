//! `harbor show` specs

use crate::prelude::*;

#[test]
fn shows_jobs_schedules_and_sensors() {
    let project = Project::with_broken_location();
    project
        .harbor()
        .args(&["show", "R"])
        .passes()
        .stdout_eq(
            "Repository R (location etl)\n\
             \n\
             Jobs\n\
             NAME  DESCRIPTION\n\
             J     Nightly load\n\
             \n\
             Schedules\n\
             NAME  JOB  CRON       TIMEZONE  DESCRIPTION\n\
             S     J    0 0 * * *  UTC       -\n\
             \n\
             Sensors\n\
             NAME   JOB  INTERVAL  SOURCE\n\
             files  J    30s       command printf 'a\\nb\\n'\n",
        );
}

#[test]
fn json_is_the_full_definition() {
    let project = Project::with_broken_location();
    let json = project.harbor().args(&["-o", "json", "show", "R"]).passes().json();
    assert_eq!(json["location"], "etl");
    assert_eq!(json["repository"]["schedules"][0]["run_config"]["date"], "${scheduled_date}");
    assert_eq!(json["repository"]["sensors"][0]["source"]["command"], "printf 'a\\nb\\n'");
}

#[test]
fn repository_served_twice_needs_location() {
    let project = Project::empty();
    project.file("a.toml", NIGHTLY_DEFS);
    project.file("b.toml", NIGHTLY_DEFS);
    project.file(
        "workspace.toml",
        "[[location]]\nfile = \"a.toml\"\n\n[[location]]\nfile = \"b.toml\"\n",
    );
    project
        .harbor()
        .args(&["show", "R"])
        .exits(1)
        .stderr_has("several locations (a, b)");
    project
        .harbor()
        .args(&["show", "R", "-l", "b"])
        .passes()
        .stdout_has("(location b)");
}
