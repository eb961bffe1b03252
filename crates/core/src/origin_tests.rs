// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[test]
fn key_is_stable_for_equal_origins() {
    let a = LocationOrigin::file("defs/etl.toml");
    let b = LocationOrigin::file("defs/etl.toml");
    assert_eq!(a.key(), b.key());
    assert_eq!(a.key().as_str().len(), 16);
}

#[yare::parameterized(
    current_dir = { "./defs/etl.toml", "defs/etl.toml" },
    inner_current_dir = { "defs/./etl.toml", "defs/etl.toml" },
    parent_dir = { "defs/old/../etl.toml", "defs/etl.toml" },
    absolute = { "/srv/./defs/../etl.toml", "/srv/etl.toml" },
    parent_past_root = { "/../etl.toml", "/etl.toml" },
    leading_parent = { "../defs/etl.toml", "../defs/etl.toml" },
    only_current = { ".", "." },
)]
fn normalizes_paths_lexically(input: &str, expected: &str) {
    assert_eq!(normalize_path(std::path::Path::new(input)), std::path::PathBuf::from(expected));
}

#[test]
fn path_aliases_share_a_key() {
    let plain = LocationOrigin::file("defs/etl.toml");
    let dotted = LocationOrigin::file("./defs/old/../etl.toml");
    assert_eq!(plain.key(), dotted.key());

    let scoped = |dir: &str| LocationOrigin::Module {
        name: "team.etl".into(),
        working_directory: Some(dir.into()),
    };
    assert_eq!(scoped("/srv/etl").key(), scoped("/srv/./etl/").key());
}

#[test]
fn key_differs_by_kind_and_fields() {
    let file = LocationOrigin::file("etl");
    let module = LocationOrigin::module("etl");
    let grpc = LocationOrigin::grpc("localhost", 4266);
    let other_port = LocationOrigin::grpc("localhost", 4267);
    assert_ne!(file.key(), module.key());
    assert_ne!(grpc.key(), other_port.key());
}

#[test]
fn working_directory_is_part_of_identity() {
    let plain = LocationOrigin::file("etl.toml");
    let scoped = LocationOrigin::File {
        path: "etl.toml".into(),
        working_directory: Some("/srv/etl".into()),
    };
    assert_ne!(plain.key(), scoped.key());
}

#[yare::parameterized(
    file = { LocationOrigin::file("defs/etl.toml"), "etl" },
    module = { LocationOrigin::module("reports.nightly"), "reports.nightly" },
    grpc = { LocationOrigin::grpc("10.0.0.5", 4266), "10.0.0.5:4266" },
)]
fn default_names(origin: LocationOrigin, expected: &str) {
    assert_eq!(origin.default_name(), expected);
}

#[test]
fn entry_name_override_wins_unless_blank() {
    let origin = LocationOrigin::file("defs/etl.toml");
    assert_eq!(
        LocationEntry::new(origin.clone(), Some("prod-etl".into())).name,
        "prod-etl"
    );
    assert_eq!(LocationEntry::new(origin, Some("  ".into())).name, "etl");
}

#[test]
fn origin_serializes_with_kind_tag() {
    let json = serde_json::to_value(LocationOrigin::grpc("h", 1)).unwrap();
    assert_eq!(json["kind"], "grpc");
    assert_eq!(json["port"], 1);
}

#[test]
fn only_grpc_is_attached_rather_than_spawned() {
    assert!(LocationOrigin::file("a").is_spawned());
    assert!(LocationOrigin::module("a").is_spawned());
    assert!(!LocationOrigin::grpc("h", 1).is_spawned());
}

proptest! {
    #[test]
    fn distinct_module_names_never_share_a_key(a in "[a-z]{1,12}", b in "[a-z]{1,12}") {
        prop_assume!(a != b);
        prop_assert_ne!(LocationOrigin::module(a).key(), LocationOrigin::module(b).key());
    }
}
