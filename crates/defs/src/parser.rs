// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Definition file parsing (TOML, HCL, and JSON)

use crate::validate::validate_repositories;
use harbor_core::{LocationError, Repository};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Definition file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Hcl,
    Json,
}

impl Format {
    pub const EXTENSIONS: [&'static str; 3] = ["toml", "hcl", "json"];
}

/// Errors from decoding definition file content
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HCL parse error: {0}")]
    Hcl(#[from] hcl::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from loading a definition file from disk.
///
/// Everything except [`LoadError::Invalid`] means the file could not be
/// imported at all.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unsupported definition file extension: {}", path.display())]
    UnknownFormat { path: PathBuf },

    #[error("{}: {source}", path.display())]
    Parse { path: PathBuf, source: ParseError },

    #[error(transparent)]
    NotFound(#[from] crate::find::FindError),

    #[error("invalid definitions in {}:\n  {}", path.display(), errors.join("\n  "))]
    Invalid { path: PathBuf, errors: Vec<String> },
}

impl From<LoadError> for LocationError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Invalid { .. } => LocationError::definition(err.to_string()),
            _ => LocationError::import_failure(err.to_string()),
        }
    }
}

/// Top level of a definition file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionFile {
    #[serde(default, alias = "repository")]
    pub repositories: Vec<Repository>,
}

/// Decode definition content without validating it.
pub fn parse_definitions(content: &str, format: Format) -> Result<DefinitionFile, ParseError> {
    let file = match format {
        Format::Toml => toml::from_str(content)?,
        Format::Hcl => hcl::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };
    Ok(file)
}

pub fn format_for_path(path: &Path) -> Option<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Some(Format::Toml),
        Some("hcl") => Some(Format::Hcl),
        Some("json") => Some(Format::Json),
        _ => None,
    }
}

/// Read, decode and validate the definition file at `path`.
pub fn load_definitions(path: &Path) -> Result<Vec<Repository>, LoadError> {
    let format = format_for_path(path).ok_or_else(|| LoadError::UnknownFormat {
        path: path.to_path_buf(),
    })?;
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse_definitions(&content, format).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let errors = validate_repositories(&file.repositories);
    if !errors.is_empty() {
        return Err(LoadError::Invalid {
            path: path.to_path_buf(),
            errors,
        });
    }

    tracing::debug!(
        path = %path.display(),
        repositories = file.repositories.len(),
        "loaded definitions"
    );
    Ok(file.repositories)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
