// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `harbor repos`: repositories across loaded locations

use std::io::Write;

use anyhow::Result;
use harbor_adapters::WorkerAdapter;
use harbor_core::RepositorySummary;
use harbor_workspace::RepositoryLocation;
use serde::Serialize;

use super::Session;
use crate::output::{error_text, write_json, OutputFormat};
use crate::table::{Cell, Column, Table};

#[derive(Debug, Serialize, PartialEq)]
struct RepositoryRow {
    location: String,
    #[serde(flatten)]
    summary: RepositorySummary,
}

/// List repositories from each location's current snapshot.
///
/// Locations that failed without a snapshot are reported on `err` and
/// skipped; with `-l` the named location must have loaded.
pub fn run<A: WorkerAdapter>(
    session: &Session<A>,
    location: Option<&str>,
    format: OutputFormat,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    let locations = match location {
        Some(name) => vec![session.loaded_location(name)?],
        None => {
            session.ensure_single_loaded()?;
            session.workspace.locations()
        }
    };

    let rows = rows(&locations, err)?;
    match format {
        OutputFormat::Json => write_json(out, &rows)?,
        OutputFormat::Text if rows.is_empty() => writeln!(out, "No repositories")?,
        OutputFormat::Text => {
            let mut table = Table::new(vec![
                Column::new("REPOSITORY"),
                Column::new("LOCATION"),
                Column::count("JOBS"),
                Column::count("SCHEDULES"),
                Column::count("SENSORS"),
            ]);
            for row in &rows {
                table.row(vec![
                    Cell::text(&row.summary.name),
                    Cell::text(&row.location),
                    Cell::Count(row.summary.jobs),
                    Cell::Count(row.summary.schedules),
                    Cell::Count(row.summary.sensors),
                ]);
            }
            table.render(out)?;
        }
    }
    Ok(())
}

fn rows(locations: &[RepositoryLocation], err: &mut impl Write) -> Result<Vec<RepositoryRow>> {
    let mut rows = Vec::new();
    for location in locations {
        let Some(snapshot) = &location.snapshot else {
            if let Some(error) = &location.error {
                writeln!(err, "warning: location '{}' failed to load: {}", location.name, error_text(error))?;
            }
            continue;
        };
        rows.extend(snapshot.summaries().into_iter().map(|summary| RepositoryRow {
            location: location.name.clone(),
            summary,
        }));
    }
    Ok(rows)
}

#[cfg(test)]
#[path = "repos_tests.rs"]
mod tests;
