//! `harbor locations` specs

use crate::prelude::*;

#[test]
fn broken_location_does_not_hide_others() {
    let project = Project::with_broken_location();
    let run = project.harbor().args(&["locations"]).passes();

    let stdout = run.stdout();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3, "{}", stdout);
    assert!(lines[0].starts_with("NAME    STATUS  ORIGIN"), "{}", stdout);
    assert!(lines[1].starts_with("etl     loaded  file:"), "{}", stdout);
    assert!(lines[1].contains(" R "), "{}", stdout);
    assert!(lines[2].starts_with("broken  failed  file:"), "{}", stdout);
    assert!(lines[2].contains("import_failure: "), "{}", stdout);
}

#[test]
fn json_output() {
    let project = Project::with_broken_location();
    let json = project.harbor().args(&["-o", "json", "locations"]).passes().json();

    assert_eq!(json[0]["name"], "etl");
    assert_eq!(json[0]["status"], "loaded");
    assert_eq!(json[0]["version"], 1);
    assert_eq!(json[0]["repositories"], serde_json::json!(["R"]));
    assert_eq!(json[0]["snapshot_id"].as_str().map(str::len), Some(64));
    assert!(json[0]["pid"].is_u64());

    assert_eq!(json[1]["name"], "broken");
    assert_eq!(json[1]["status"], "failed");
    assert_eq!(json[1]["error"]["kind"], "import_failure");
    assert!(json[1]["snapshot_id"].is_null());
}

#[test]
fn same_definitions_give_same_snapshot_id() {
    let project = Project::empty();
    project.file("a/defs.toml", NIGHTLY_DEFS);
    project.file("b/defs.toml", NIGHTLY_DEFS);
    project.file(
        "workspace.toml",
        r#"
[[location]]
file = "a/defs.toml"
name = "a"

[[location]]
file = "b/defs.toml"
name = "b"
"#,
    );
    let json = project.harbor().args(&["-o", "json", "locations"]).passes().json();
    assert_eq!(json[0]["snapshot_id"], json[1]["snapshot_id"]);
    assert_ne!(json[0]["origin_key"], json[1]["origin_key"]);
}

#[test]
fn hcl_workspace_file() {
    let project = Project::empty();
    project.file("etl.toml", NIGHTLY_DEFS);
    project.file(
        "ws.hcl",
        r#"
location {
  file = "etl.toml"
  name = "nightly"
}
"#,
    );
    project
        .harbor()
        .args(&["-w", "ws.hcl", "locations"])
        .passes()
        .stdout_has("nightly  loaded");
}
