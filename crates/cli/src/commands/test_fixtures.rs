// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sessions over a fake worker adapter for command tests

use std::time::Duration;

use harbor_adapters::FakeWorkerAdapter;
use harbor_core::test_support::{command_sensor, nightly_repository};
use harbor_core::{LocationEntry, LocationError, LocationOrigin, Repository};
use harbor_workspace::{Workspace, WorkspaceConfig, WorkspaceSettings};

use super::Session;

pub fn origin(name: &str) -> LocationOrigin {
    LocationOrigin::file(format!("/defs/{}.toml", name))
}

/// A location declared in the fixture workspace
pub enum Declared {
    Serves(Vec<Repository>),
    Fails(LocationError),
}

pub fn serves(repositories: &[&str]) -> Declared {
    Declared::Serves(repositories.iter().map(|r| nightly_repository(r)).collect())
}

pub fn fails(message: &str) -> Declared {
    Declared::Fails(LocationError::import_failure(message))
}

/// Repository `R` with job `J`, schedule `S` and a sensor `files` that prints two keys
pub fn repository_with_sensor() -> Repository {
    let mut repo = nightly_repository("R");
    repo.sensors.push(command_sensor("files", "J", "printf 'a\\nb\\n'"));
    repo
}

pub async fn session(locations: Vec<(&str, Declared)>, single: bool) -> (Session<FakeWorkerAdapter>, FakeWorkerAdapter) {
    let adapter = FakeWorkerAdapter::new();
    let mut entries = Vec::new();
    for (name, declared) in locations {
        match declared {
            Declared::Serves(repositories) => adapter.set_definitions(&origin(name), repositories),
            Declared::Fails(error) => adapter.set_load_error(&origin(name), error),
        }
        entries.push(LocationEntry::new(origin(name), Some(name.to_string())));
    }
    let settings = WorkspaceSettings {
        call_timeout: Duration::from_secs(2),
        evaluation_timeout: Duration::from_secs(5),
        ..WorkspaceSettings::default()
    };
    let workspace = Workspace::load(WorkspaceConfig::from_entries(entries), adapter.clone(), settings).await;
    (Session::new(workspace, single), adapter)
}

pub fn text(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap_or_default()
}
