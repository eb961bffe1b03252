// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `harbor locations`: one row per declared location

use std::io::Write;

use anyhow::Result;
use harbor_adapters::WorkerAdapter;
use harbor_core::{LoadStatus, LocationError, LocationOrigin, OriginKey};
use harbor_workspace::RepositoryLocation;
use serde::Serialize;

use super::Session;
use crate::output::{write_json, OutputFormat};
use crate::table::{Cell, Column, Table};

#[derive(Serialize)]
struct LocationView<'a> {
    name: &'a str,
    origin: &'a LocationOrigin,
    origin_key: &'a OriginKey,
    status: LoadStatus,
    snapshot_id: Option<&'a str>,
    version: Option<u64>,
    repositories: Vec<&'a str>,
    pid: Option<u32>,
    error: Option<&'a LocationError>,
}

impl<'a> From<&'a RepositoryLocation> for LocationView<'a> {
    fn from(location: &'a RepositoryLocation) -> Self {
        Self {
            name: &location.name,
            origin: &location.origin,
            origin_key: &location.origin_key,
            status: location.status,
            snapshot_id: location.snapshot_id(),
            version: location.snapshot.as_ref().map(|s| s.version),
            repositories: location.repository_names(),
            pid: location.pid,
            error: location.error.as_ref(),
        }
    }
}

pub fn run<A: WorkerAdapter>(session: &Session<A>, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    let locations = session.workspace.locations();
    match format {
        OutputFormat::Json => {
            let views: Vec<LocationView> = locations.iter().map(LocationView::from).collect();
            write_json(out, &views)?;
        }
        OutputFormat::Text => {
            if locations.is_empty() {
                writeln!(out, "No locations")?;
            } else {
                render(&locations, out)?;
            }
        }
    }
    session.ensure_single_loaded()
}

fn render(locations: &[RepositoryLocation], out: &mut impl Write) -> std::io::Result<()> {
    let mut table = Table::new(vec![
        Column::new("NAME"),
        Column::new("STATUS"),
        Column::new("ORIGIN"),
        Column::new("REPOSITORIES"),
        Column::new("SNAPSHOT").with_max(12),
        Column::new("ERROR"),
    ]);
    for location in locations {
        table.row(vec![
            Cell::text(&location.name),
            Cell::Status(location.status),
            Cell::muted(location.origin.to_string()),
            Cell::list(&location.repository_names().into_iter().map(String::from).collect::<Vec<_>>()),
            Cell::muted_or_missing(location.snapshot_id()),
            location.error.clone().map_or(Cell::text(""), Cell::Error),
        ]);
    }
    table.render(out)
}

#[cfg(test)]
#[path = "locations_tests.rs"]
mod tests;
