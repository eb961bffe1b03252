// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace declaration file.
//!
//! ```toml
//! [[location]]
//! file = "defs/etl.toml"
//! working_directory = "defs"
//! name = "etl"
//!
//! [[location]]
//! module = "reports.nightly"
//!
//! [[location]]
//! grpc_server = { host = "localhost", port = 4266 }
//! ```
//!
//! Entries are checked one at a time: a bad entry is recorded as a
//! [`ConfigIssue`] and the rest of the workspace still loads.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use harbor_core::{normalize_path, LocationEntry, LocationOrigin, OriginKey};
use harbor_defs::{format_for_path, Format, ParseError};
use serde::Deserialize;
use thiserror::Error;

/// Default workspace file looked up in the current directory
pub const DEFAULT_WORKSPACE_FILE: &str = "workspace.toml";

/// Errors that prevent reading the workspace file at all
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("workspace file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unsupported workspace file extension: {} (expected .toml, .hcl or .json)", .0.display())]
    UnknownFormat(PathBuf),
    #[error("failed to parse {}: {source}", path.display())]
    Parse { path: PathBuf, source: ParseError },
}

/// A problem with one entry; the entry is skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("location #{index}: {message}")]
    InvalidEntry { index: usize, message: String },
    #[error("location #{index} ('{name}') has the same origin as '{first}'; skipped")]
    DuplicateOrigin {
        index: usize,
        name: String,
        first: String,
    },
    #[error("location #{index}: name '{name}' is already in use; skipped")]
    DuplicateName { index: usize, name: String },
}

/// Ordered, deduplicated location entries plus the issues found building them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceConfig {
    entries: Vec<LocationEntry>,
    issues: Vec<ConfigIssue>,
    path: Option<PathBuf>,
}

#[derive(Deserialize)]
struct RawWorkspace {
    /// Array of entries; a lone HCL `location {}` block decodes as one object
    #[serde(default, alias = "load_from")]
    location: serde_json::Value,
}

impl RawWorkspace {
    fn entries(self) -> Vec<serde_json::Value> {
        match self.location {
            serde_json::Value::Array(entries) => entries,
            serde_json::Value::Null => Vec::new(),
            other => vec![other],
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    #[serde(default, alias = "python_file")]
    file: Option<PathBuf>,
    #[serde(default, alias = "python_module")]
    module: Option<String>,
    #[serde(default)]
    grpc_server: Option<RawGrpc>,
    #[serde(default)]
    working_directory: Option<PathBuf>,
    #[serde(default, alias = "location_name")]
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGrpc {
    #[serde(default = "default_host")]
    host: String,
    port: u16,
}

fn default_host() -> String {
    "localhost".to_string()
}

impl WorkspaceConfig {
    /// Build from already-resolved entries, deduplicating origins and names.
    pub fn from_entries(entries: impl IntoIterator<Item = LocationEntry>) -> Self {
        let mut builder = Builder::default();
        for (i, entry) in entries.into_iter().enumerate() {
            builder.push(i + 1, entry);
        }
        builder.finish(None)
    }

    /// Workspace with a single location (CLI `-f`/`-m`/`--grpc-*`).
    pub fn single(origin: LocationOrigin, name: Option<String>) -> Self {
        Self::from_entries([LocationEntry::new(origin, name)])
    }

    /// Read and parse a workspace file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = format_for_path(path).ok_or_else(|| ConfigError::UnknownFormat(path.to_path_buf()))?;
        let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut config = Self::parse(&content, format, base_dir).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.path = Some(path.to_path_buf());
        for issue in &config.issues {
            tracing::warn!(path = %path.display(), "{}", issue);
        }
        Ok(config)
    }

    /// Parse workspace file content; relative paths resolve against `base_dir`.
    pub fn parse(content: &str, format: Format, base_dir: &Path) -> Result<Self, ParseError> {
        let raw: RawWorkspace = match format {
            Format::Toml => toml::from_str(content)?,
            Format::Hcl => hcl::from_str(content)?,
            Format::Json => serde_json::from_str(content)?,
        };
        let mut builder = Builder::default();
        for (i, value) in raw.entries().into_iter().enumerate() {
            let index = i + 1;
            match resolve_entry(value, base_dir) {
                Ok(entry) => builder.push(index, entry),
                Err(message) => builder.issues.push(ConfigIssue::InvalidEntry { index, message }),
            }
        }
        Ok(builder.finish(None))
    }

    pub fn entries(&self) -> &[LocationEntry] {
        &self.entries
    }

    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    /// File this config was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn entry(&self, name: &str) -> Option<&LocationEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn keys(&self) -> Vec<OriginKey> {
        self.entries.iter().map(LocationEntry::key).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Default)]
struct Builder {
    entries: Vec<LocationEntry>,
    issues: Vec<ConfigIssue>,
    by_key: HashMap<OriginKey, String>,
}

impl Builder {
    fn push(&mut self, index: usize, entry: LocationEntry) {
        if let Some(first) = self.by_key.get(&entry.key()) {
            self.issues.push(ConfigIssue::DuplicateOrigin {
                index,
                name: entry.name,
                first: first.clone(),
            });
            return;
        }
        if self.entries.iter().any(|e| e.name == entry.name) {
            self.issues.push(ConfigIssue::DuplicateName {
                index,
                name: entry.name,
            });
            return;
        }
        self.by_key.insert(entry.key(), entry.name.clone());
        self.entries.push(entry);
    }

    fn finish(self, path: Option<PathBuf>) -> WorkspaceConfig {
        WorkspaceConfig {
            entries: self.entries,
            issues: self.issues,
            path,
        }
    }
}

fn resolve_entry(value: serde_json::Value, base_dir: &Path) -> Result<LocationEntry, String> {
    let raw: RawEntry = serde_json::from_value(value).map_err(|e| e.to_string())?;
    let working_directory = raw.working_directory.map(|d| normalize_path(&base_dir.join(d)));

    let origin = match (raw.file, raw.module, raw.grpc_server) {
        (Some(file), None, None) => {
            if file.as_os_str().is_empty() {
                return Err("file must not be empty".to_string());
            }
            LocationOrigin::File {
                path: normalize_path(&base_dir.join(file)),
                working_directory,
            }
        }
        (None, Some(module), None) => {
            if module.trim().is_empty() {
                return Err("module must not be empty".to_string());
            }
            LocationOrigin::Module {
                name: module,
                working_directory: Some(working_directory.unwrap_or_else(|| normalize_path(base_dir))),
            }
        }
        (None, None, Some(grpc)) => {
            if working_directory.is_some() {
                return Err("working_directory does not apply to grpc_server".to_string());
            }
            if grpc.port == 0 {
                return Err("grpc_server port must be non-zero".to_string());
            }
            LocationOrigin::Grpc {
                host: grpc.host,
                port: grpc.port,
            }
        }
        (None, None, None) => {
            return Err("expected one of file, module or grpc_server".to_string())
        }
        _ => return Err("only one of file, module or grpc_server may be set".to_string()),
    };
    Ok(LocationEntry::new(origin, raw.name))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
