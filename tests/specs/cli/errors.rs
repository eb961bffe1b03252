//! CLI error handling specs
//!
//! Exit codes: 2 usage, 3 missing workspace file, 4 failed location,
//! 1 everything else.

use crate::prelude::*;

#[test]
fn unknown_subcommand_is_usage_error() {
    cli().args(&["bogus"]).exits(2);
}

#[test]
fn working_directory_without_entry_is_usage_error() {
    let project = Project::empty();
    project
        .harbor()
        .args(&["-d", "jobs", "locations"])
        .exits(2)
        .stderr_has("--file");
}

#[test]
fn missing_default_workspace_file() {
    let project = Project::empty();
    project
        .harbor()
        .args(&["locations"])
        .exits(3)
        .stderr_has("workspace file not found")
        .stderr_has("workspace.toml");
}

#[test]
fn missing_explicit_workspace_file() {
    let project = Project::empty();
    project
        .harbor()
        .args(&["-w", "elsewhere.hcl", "repos"])
        .exits(3)
        .stderr_has("elsewhere.hcl");
}

#[test]
fn unparseable_workspace_file_is_general_error() {
    let project = Project::empty();
    project.file("workspace.toml", "[[location]\n");
    project
        .harbor()
        .args(&["locations"])
        .exits(1)
        .stderr_has("failed to parse");
}

#[test]
fn single_file_that_fails_to_load() {
    let project = Project::empty();
    project.file("defs.toml", BROKEN_DEFS);
    project
        .harbor()
        .args(&["-f", "defs.toml", "locations"])
        .exits(4)
        .stdout_has("failed")
        .stderr_has("location 'defs' failed to load: import_failure");
}

#[test]
fn targeting_failed_location_in_workspace() {
    let project = Project::with_broken_location();
    project
        .harbor()
        .args(&["repos", "-l", "broken"])
        .exits(4)
        .stderr_has("location 'broken' failed to load");
}

#[test]
fn unknown_location_is_general_error() {
    let project = Project::with_broken_location();
    project
        .harbor()
        .args(&["show", "R", "-l", "nope"])
        .exits(1)
        .stderr_has("Error: unknown location 'nope'");
}
