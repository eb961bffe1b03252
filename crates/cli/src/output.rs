// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use clap::ValueEnum;
use harbor_core::{LocationError, RunRequest};
use serde::Serialize;

use crate::table::{Cell, Column, Table};

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Write `value` as pretty-printed JSON followed by a newline.
pub fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// `kind: message` on a single line
pub fn error_text(error: &LocationError) -> String {
    format!("{}: {}", error.kind, error.message.replace('\n', " "))
}

/// Single-line JSON, or `-` for an absent value
pub fn compact_json(value: &serde_json::Value) -> String {
    if value.is_null() {
        return "-".to_string();
    }
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

/// Table of run requests: key, job, config.
pub fn write_run_requests(out: &mut impl Write, run_requests: &[RunRequest]) -> std::io::Result<()> {
    let mut table = Table::new(vec![Column::new("RUN KEY"), Column::new("JOB"), Column::new("CONFIG")]);
    for request in run_requests {
        table.row(vec![
            request.run_key.as_deref().map_or(Cell::Missing, Cell::text),
            Cell::text(&request.job),
            Cell::muted(compact_json(&request.run_config)),
        ]);
    }
    table.render(out)
}
