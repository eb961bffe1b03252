//! CLI help and version specs

use crate::prelude::*;

#[test]
fn no_subcommand_prints_help() {
    cli()
        .passes()
        .stdout_has("Usage: harbor")
        .stdout_has("tick-schedule")
        .stdout_has("-v, --version");
}

#[test]
fn version_flag_prints_version() {
    cli()
        .args(&["-v"])
        .passes()
        .stdout_eq(&format!("harbor {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn subcommand_help_lists_location_flag() {
    cli()
        .args(&["show", "--help"])
        .passes()
        .stdout_has("-l, --location <LOCATION>");
}
