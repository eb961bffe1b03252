// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable per-location snapshots.
//!
//! A snapshot is built once from a worker's repository graph and never
//! mutated afterwards; reload produces a new one. The snapshot id is a
//! content hash over the repositories only, so reloading unchanged code
//! yields the same id, while the `version` counter still advances.

use crate::{OriginKey, Repository, RepositorySummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSnapshot {
    pub origin_key: OriginKey,
    pub location_name: String,
    pub repositories: Vec<Repository>,
    /// Content hash of `repositories`
    pub snapshot_id: String,
    /// Publication counter for this origin, strictly increasing
    pub version: u64,
    pub loaded_at: DateTime<Utc>,
}

impl LocationSnapshot {
    pub fn new(
        origin_key: OriginKey,
        location_name: impl Into<String>,
        repositories: Vec<Repository>,
        version: u64,
    ) -> Self {
        let snapshot_id = snapshot_id(&repositories);
        Self {
            origin_key,
            location_name: location_name.into(),
            repositories,
            snapshot_id,
            version,
            loaded_at: Utc::now(),
        }
    }

    pub fn repository(&self, name: &str) -> Option<&Repository> {
        self.repositories.iter().find(|r| r.name == name)
    }

    pub fn repository_names(&self) -> Vec<&str> {
        self.repositories.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn summaries(&self) -> Vec<RepositorySummary> {
        self.repositories.iter().map(Repository::summary).collect()
    }
}

/// SHA-256 (hex) over the canonical JSON of the repositories.
///
/// Order is significant: the worker reports repositories and definitions
/// in declaration order, which is stable for unchanged source.
pub fn snapshot_id(repositories: &[Repository]) -> String {
    let mut hasher = Sha256::new();
    for repo in repositories {
        // Serializing plain data structs cannot fail; fall back to the
        // name so a hash is always produced.
        match serde_json::to_vec(repo) {
            Ok(bytes) => hasher.update(&bytes),
            Err(_) => hasher.update(repo.name.as_bytes()),
        }
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
