// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Module name resolution
//!
//! `reports.nightly` resolves to `reports/nightly.{toml,hcl,json}` or
//! `reports/nightly/definitions.{toml,hcl,json}`, tried in each search
//! directory in order.

use crate::parser::Format;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up inside a module directory
const PACKAGE_ENTRY: &str = "definitions";

#[derive(Debug, Error)]
pub enum FindError {
    #[error("invalid module name '{0}'")]
    InvalidName(String),
    #[error("module '{name}' not found; searched: {}", fmt_dirs(searched))]
    NotFound { name: String, searched: Vec<PathBuf> },
}

fn fmt_dirs(dirs: &[PathBuf]) -> String {
    if dirs.is_empty() {
        return "(no search directories)".to_string();
    }
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Search order: the working directory, then each entry of `module_path`
/// (a colon-separated list, as in `HARBOR_MODULE_PATH`).
pub fn module_search_dirs(working_dir: &Path, module_path: Option<&str>) -> Vec<PathBuf> {
    let mut dirs = vec![working_dir.to_path_buf()];
    if let Some(extra) = module_path {
        for entry in extra.split(':').filter(|e| !e.trim().is_empty()) {
            let dir = PathBuf::from(entry.trim());
            let dir = if dir.is_relative() {
                working_dir.join(dir)
            } else {
                dir
            };
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
    }
    dirs
}

/// Resolve a dotted module name to a definition file.
pub fn resolve_module(name: &str, search_dirs: &[PathBuf]) -> Result<PathBuf, FindError> {
    let segments: Vec<&str> = name.split('.').collect();
    let valid = segments.iter().all(|s| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    });
    if !valid {
        return Err(FindError::InvalidName(name.to_string()));
    }

    let relative: PathBuf = segments.iter().collect();
    for dir in search_dirs {
        let base = dir.join(&relative);
        for ext in Format::EXTENSIONS {
            let file = base.with_extension(ext);
            if file.is_file() {
                return Ok(file);
            }
        }
        for ext in Format::EXTENSIONS {
            let file = base.join(PACKAGE_ENTRY).with_extension(ext);
            if file.is_file() {
                return Ok(file);
            }
        }
    }

    Err(FindError::NotFound {
        name: name.to_string(),
        searched: search_dirs.to_vec(),
    })
}

#[cfg(test)]
#[path = "find_tests.rs"]
mod tests;
