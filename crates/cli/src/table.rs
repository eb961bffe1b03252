// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Column-aligned tables for `harbor` list views.
//!
//! Cells are typed: a [`LoadStatus`] colors itself, a [`LocationError`]
//! shows its kind in red, counts line up on the right and an absent value
//! prints as `-`. Widths are measured on the plain text, before any ANSI
//! codes are added.

use std::io::{self, Write};

use harbor_core::{LoadStatus, LocationError, ShortId};

use crate::color;
use crate::output::error_text;

/// One value in a table row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    /// Secondary detail such as origins, ids and descriptions
    Muted(String),
    Status(LoadStatus),
    Error(LocationError),
    Count(usize),
    Missing,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn muted(value: impl Into<String>) -> Self {
        Cell::Muted(value.into())
    }

    /// Muted text, or `-` when absent.
    pub fn muted_or_missing(value: Option<&str>) -> Self {
        value.map_or(Cell::Missing, Cell::muted)
    }

    /// Comma-joined names, or `-` when there are none.
    pub fn list(names: &[String]) -> Self {
        if names.is_empty() {
            Cell::Missing
        } else {
            Cell::Text(names.join(","))
        }
    }

    fn plain(&self) -> String {
        match self {
            Cell::Text(s) | Cell::Muted(s) => s.clone(),
            Cell::Status(status) => status.to_string(),
            Cell::Error(error) => error_text(error),
            Cell::Count(n) => n.to_string(),
            Cell::Missing => "-".to_string(),
        }
    }

    /// Color already-padded text for this cell's kind.
    fn paint(&self, padded: &str) -> String {
        match self {
            Cell::Text(_) | Cell::Count(_) => padded.to_string(),
            Cell::Muted(_) | Cell::Missing => color::apply_muted(padded),
            Cell::Status(status) => color::apply_load_status(*status, padded),
            Cell::Error(error) => {
                // Kind in red, message as is
                let kind = error.kind.as_str();
                match padded.strip_prefix(kind) {
                    Some(rest) => format!("{}{}", color::apply_failure(kind), rest),
                    None => padded.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// A column header plus layout rules.
#[derive(Debug, Clone)]
pub struct Column {
    header: &'static str,
    align: Align,
    max_width: Option<usize>,
}

impl Column {
    pub fn new(header: &'static str) -> Self {
        Self {
            header,
            align: Align::Left,
            max_width: None,
        }
    }

    /// Right-aligned numeric column.
    pub fn count(header: &'static str) -> Self {
        Self {
            align: Align::Right,
            ..Self::new(header)
        }
    }

    /// Truncate values longer than `max` chars.
    pub fn with_max(mut self, max: usize) -> Self {
        self.max_width = Some(max);
        self
    }
}

pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

const SEP: &str = "  ";

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Add a row; short rows are padded with empty text.
    pub fn row(&mut self, cells: Vec<Cell>) {
        self.rows.push(cells);
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        self.write(out, color::should_colorize())
    }

    fn write(&self, out: &mut impl Write, colorize: bool) -> io::Result<()> {
        if self.rows.is_empty() {
            return Ok(());
        }
        let texts: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .enumerate()
                    .map(|(i, col)| {
                        let plain = row.get(i).map(Cell::plain).unwrap_or_default();
                        match col.max_width {
                            Some(max) => plain.short(max).to_string(),
                            None => plain,
                        }
                    })
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                texts
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain([col.header.chars().count()])
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let padded = self.pad(i, col.header, widths[i]);
                if colorize {
                    color::apply_header(&padded)
                } else {
                    padded
                }
            })
            .collect();
        writeln!(out, "{}", header.join(SEP))?;

        for (row, row_texts) in self.rows.iter().zip(&texts) {
            let cells: Vec<String> = row_texts
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    let padded = self.pad(i, text, widths[i]);
                    match row.get(i) {
                        Some(cell) if colorize => cell.paint(&padded),
                        _ => padded,
                    }
                })
                .collect();
            writeln!(out, "{}", cells.join(SEP))?;
        }
        Ok(())
    }

    /// Pad to `width`; a trailing left-aligned column is left ragged.
    fn pad(&self, index: usize, text: &str, width: usize) -> String {
        let last = index + 1 == self.columns.len();
        match self.columns[index].align {
            Align::Left if last => text.to_string(),
            Align::Left => format!("{:<width$}", text),
            Align::Right => format!("{:>width$}", text),
        }
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
