// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Location origins and their identity keys.
//!
//! An origin says *how* a location is materialized: a definition file or
//! module the host spawns a worker for, or an already-running worker
//! reachable over TCP. The [`OriginKey`] is derived from the origin's
//! fields only, so the same declaration always maps to the same key
//! across reloads and host restarts.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Component, Path, PathBuf};

crate::define_id! {
    /// Stable identity of a [`LocationOrigin`] (16 hex chars of SHA-256).
    pub struct OriginKey;
}

/// Length of the hex prefix kept for origin keys
const ORIGIN_KEY_LEN: usize = 16;

/// How to materialize a repository location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationOrigin {
    /// Definition file loaded by a spawned worker
    File {
        path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        working_directory: Option<PathBuf>,
    },
    /// Definition module resolved on the worker's search path
    Module {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        working_directory: Option<PathBuf>,
    },
    /// Pre-existing worker server; no process is spawned
    Grpc { host: String, port: u16 },
}

impl LocationOrigin {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        LocationOrigin::File {
            path: path.into(),
            working_directory: None,
        }
    }

    pub fn module(name: impl Into<String>) -> Self {
        LocationOrigin::Module {
            name: name.into(),
            working_directory: None,
        }
    }

    pub fn grpc(host: impl Into<String>, port: u16) -> Self {
        LocationOrigin::Grpc {
            host: host.into(),
            port,
        }
    }

    /// Identity key: a hash over the origin's fields.
    pub fn key(&self) -> OriginKey {
        let digest = Sha256::digest(self.canonical().as_bytes());
        let hex = format!("{:x}", digest);
        OriginKey::new(&hex[..ORIGIN_KEY_LEN])
    }

    /// Whether materializing this origin spawns a worker process.
    pub fn is_spawned(&self) -> bool {
        !matches!(self, LocationOrigin::Grpc { .. })
    }

    /// Name used when the declaration does not override it.
    pub fn default_name(&self) -> String {
        match self {
            LocationOrigin::File { path, .. } => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            LocationOrigin::Module { name, .. } => name.clone(),
            LocationOrigin::Grpc { host, port } => format!("{}:{}", host, port),
        }
    }

    /// Field-by-field form fed to the hash; independent of serde layout.
    fn canonical(&self) -> String {
        fn dir(d: &Option<PathBuf>) -> String {
            d.as_deref()
                .map(|p| normalize_path(p).display().to_string())
                .unwrap_or_default()
        }
        match self {
            LocationOrigin::File {
                path,
                working_directory,
            } => format!(
                "file\0{}\0{}",
                normalize_path(path).display(),
                dir(working_directory)
            ),
            LocationOrigin::Module {
                name,
                working_directory,
            } => format!("module\0{}\0{}", name, dir(working_directory)),
            LocationOrigin::Grpc { host, port } => format!("grpc\0{}\0{}", host, port),
        }
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into
/// the preceding component. The filesystem is not consulted, so symlinks
/// are left alone.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

impl fmt::Display for LocationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationOrigin::File { path, .. } => write!(f, "file:{}", path.display()),
            LocationOrigin::Module { name, .. } => write!(f, "module:{}", name),
            LocationOrigin::Grpc { host, port } => write!(f, "grpc:{}:{}", host, port),
        }
    }
}

/// One declared location: an origin plus its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub name: String,
    pub origin: LocationOrigin,
}

impl LocationEntry {
    /// Build an entry, falling back to the origin's default name.
    pub fn new(origin: LocationOrigin, name: Option<String>) -> Self {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| origin.default_name());
        Self { name, origin }
    }

    pub fn key(&self) -> OriginKey {
        self.origin.key()
    }
}

#[cfg(test)]
#[path = "origin_tests.rs"]
mod tests;
