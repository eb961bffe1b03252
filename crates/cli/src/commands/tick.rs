// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `harbor tick-schedule` / `harbor tick-sensor`: evaluate one tick
//!
//! The job is taken from the definition in the location's snapshot, and
//! the evaluation runs in that location's worker.

use std::io::Write;

use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::Args;
use harbor_adapters::WorkerAdapter;
use harbor_core::{Repository, ScheduleEvaluation, SensorEvaluation};
use harbor_defs::CronSchedule;
use harbor_workspace::RepositoryLocation;
use serde::Serialize;

use super::Session;
use crate::exit_error::{self, ExitError};
use crate::output::{write_json, write_run_requests, OutputFormat};

#[derive(Args, Debug, Clone)]
pub struct TickScheduleArgs {
    /// Repository name
    pub repository: String,

    /// Schedule name
    pub schedule: String,

    /// Tick to evaluate, RFC 3339 (default: latest tick at or before now)
    #[arg(long)]
    pub time: Option<DateTime<Utc>>,

    /// Location serving the repository (required when several do)
    #[arg(short = 'l', long = "location")]
    pub location: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct TickSensorArgs {
    /// Repository name
    pub repository: String,

    /// Sensor name
    pub sensor: String,

    /// Cursor returned by the previous tick
    #[arg(long)]
    pub cursor: Option<String>,

    /// Location serving the repository (required when several do)
    #[arg(short = 'l', long = "location")]
    pub location: Option<String>,
}

#[derive(Serialize)]
struct ScheduleTick<'a> {
    location: &'a str,
    repository: &'a str,
    schedule: &'a str,
    scheduled_time: String,
    #[serde(flatten)]
    evaluation: &'a ScheduleEvaluation,
}

#[derive(Serialize)]
struct SensorTick<'a> {
    location: &'a str,
    repository: &'a str,
    sensor: &'a str,
    #[serde(flatten)]
    evaluation: &'a SensorEvaluation,
}

fn repository<'a>(location: &'a RepositoryLocation, name: &str) -> Result<&'a Repository> {
    location
        .snapshot
        .as_deref()
        .and_then(|s| s.repository(name))
        .ok_or_else(|| anyhow!("repository '{}' not found in location '{}'", name, location.name))
}

pub async fn schedule<A: WorkerAdapter>(
    session: &Session<A>,
    args: &TickScheduleArgs,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let location = session.locate(args.location.as_deref(), &args.repository)?;
    let definition = repository(&location, &args.repository)?
        .schedule(&args.schedule)
        .ok_or_else(|| anyhow!("schedule '{}' not found in repository '{}'", args.schedule, args.repository))?;

    let scheduled_time = match args.time {
        Some(time) => time,
        None => CronSchedule::parse(&definition.cron)
            .map_err(|e| anyhow!("schedule '{}': {}", definition.name, e))?
            .latest_at_or_before(&Utc::now())
            .ok_or_else(|| anyhow!("schedule '{}' has no tick at or before now", definition.name))?,
    };

    let evaluation = session
        .workspace
        .evaluate_schedule(
            &location.name,
            &args.repository,
            &definition.job,
            &definition.name,
            scheduled_time,
        )
        .await?;

    let scheduled_time = scheduled_time.to_rfc3339_opts(SecondsFormat::Secs, true);
    match format {
        OutputFormat::Json => write_json(
            out,
            &ScheduleTick {
                location: &location.name,
                repository: &args.repository,
                schedule: &args.schedule,
                scheduled_time,
                evaluation: &evaluation,
            },
        )?,
        OutputFormat::Text => match &evaluation {
            ScheduleEvaluation::RunRequests { run_requests } => {
                writeln!(out, "scheduled time: {}", scheduled_time)?;
                write_run_requests(out, run_requests)?;
            }
            ScheduleEvaluation::Skip { reason } => writeln!(out, "skipped: {}", reason)?,
            ScheduleEvaluation::Error { .. } => {}
        },
    }

    match evaluation {
        ScheduleEvaluation::Error { message } => Err(evaluation_failed(&args.schedule, &message)),
        _ => Ok(()),
    }
}

pub async fn sensor<A: WorkerAdapter>(
    session: &Session<A>,
    args: &TickSensorArgs,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let location = session.locate(args.location.as_deref(), &args.repository)?;
    let definition = repository(&location, &args.repository)?
        .sensor(&args.sensor)
        .ok_or_else(|| anyhow!("sensor '{}' not found in repository '{}'", args.sensor, args.repository))?;

    let evaluation = session
        .workspace
        .evaluate_sensor(
            &location.name,
            &args.repository,
            &definition.job,
            &definition.name,
            args.cursor.clone(),
        )
        .await?;

    match format {
        OutputFormat::Json => write_json(
            out,
            &SensorTick {
                location: &location.name,
                repository: &args.repository,
                sensor: &args.sensor,
                evaluation: &evaluation,
            },
        )?,
        OutputFormat::Text => match &evaluation {
            SensorEvaluation::RunRequests { run_requests, cursor } => {
                write_run_requests(out, run_requests)?;
                write_cursor(out, cursor.as_deref())?;
            }
            SensorEvaluation::Skip { reason, cursor } => {
                writeln!(out, "skipped: {}", reason)?;
                write_cursor(out, cursor.as_deref())?;
            }
            SensorEvaluation::Error { .. } => {}
        },
    }

    match evaluation {
        SensorEvaluation::Error { message } => Err(evaluation_failed(&args.sensor, &message)),
        _ => Ok(()),
    }
}

fn write_cursor(out: &mut impl Write, cursor: Option<&str>) -> Result<()> {
    if let Some(cursor) = cursor {
        writeln!(out, "cursor: {}", cursor)?;
    }
    Ok(())
}

fn evaluation_failed(name: &str, message: &str) -> anyhow::Error {
    ExitError::new(
        exit_error::GENERAL,
        format!("evaluation of '{}' failed: {}", name, message),
    )
    .into()
}

#[cfg(test)]
#[path = "tick_tests.rs"]
mod tests;
