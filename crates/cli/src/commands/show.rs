// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `harbor show`: one repository's jobs, schedules and sensors

use std::io::Write;

use anyhow::Result;
use clap::Args;
use harbor_adapters::WorkerAdapter;
use harbor_core::{Repository, SensorSource};
use serde::Serialize;

use super::Session;
use crate::color;
use crate::output::{write_json, OutputFormat};
use crate::table::{Cell, Column, Table};

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Repository name
    pub repository: String,

    /// Location serving the repository (required when several do)
    #[arg(short = 'l', long = "location")]
    pub location: Option<String>,
}

#[derive(Serialize)]
struct ShowView<'a> {
    location: &'a str,
    repository: &'a Repository,
}

pub async fn run<A: WorkerAdapter>(
    session: &Session<A>,
    args: &ShowArgs,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let location = session.locate(args.location.as_deref(), &args.repository)?;
    let repository = session
        .workspace
        .get_repository(&location.name, &args.repository)
        .await?;

    match format {
        OutputFormat::Json => write_json(
            out,
            &ShowView {
                location: &location.name,
                repository: &repository,
            },
        )?,
        OutputFormat::Text => {
            writeln!(
                out,
                "{} {} {}",
                color::header("Repository"),
                repository.name,
                color::muted(&format!("(location {})", location.name))
            )?;
            render(&repository, out)?;
        }
    }
    Ok(())
}

fn render(repository: &Repository, out: &mut impl Write) -> Result<()> {
    if !repository.jobs.is_empty() {
        writeln!(out, "\n{}", color::header("Jobs"))?;
        let mut table = Table::new(vec![Column::new("NAME"), Column::new("DESCRIPTION")]);
        for job in &repository.jobs {
            table.row(vec![Cell::text(&job.name), Cell::muted_or_missing(job.description.as_deref())]);
        }
        table.render(out)?;
    }

    if !repository.schedules.is_empty() {
        writeln!(out, "\n{}", color::header("Schedules"))?;
        let mut table = Table::new(vec![
            Column::new("NAME"),
            Column::new("JOB"),
            Column::new("CRON"),
            Column::new("TIMEZONE"),
            Column::new("DESCRIPTION"),
        ]);
        for schedule in &repository.schedules {
            table.row(vec![
                Cell::text(&schedule.name),
                Cell::text(&schedule.job),
                Cell::text(&schedule.cron),
                Cell::text(&schedule.timezone),
                Cell::muted_or_missing(schedule.description.as_deref()),
            ]);
        }
        table.render(out)?;
    }

    if !repository.sensors.is_empty() {
        writeln!(out, "\n{}", color::header("Sensors"))?;
        let mut table = Table::new(vec![
            Column::new("NAME"),
            Column::new("JOB"),
            Column::new("INTERVAL"),
            Column::new("SOURCE").with_max(48),
        ]);
        for sensor in &repository.sensors {
            table.row(vec![
                Cell::text(&sensor.name),
                Cell::text(&sensor.job),
                Cell::text(&sensor.interval),
                Cell::muted(source_text(&sensor.source)),
            ]);
        }
        table.render(out)?;
    }
    Ok(())
}

fn source_text(source: &SensorSource) -> String {
    match source {
        SensorSource::Directory {
            directory,
            pattern: Some(pattern),
        } => format!("directory {} ({})", directory.display(), pattern),
        SensorSource::Directory { directory, .. } => format!("directory {}", directory.display()),
        SensorSource::Command { command } => format!("command {}", command),
    }
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
