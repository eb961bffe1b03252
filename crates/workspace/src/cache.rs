// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Location snapshot cache.
//!
//! Readers clone an `Arc` out from under a short read lock, so they see
//! either the previous snapshot or the new one, never a mix. Publication
//! is linearized per origin by the snapshot's `version`.

use std::collections::HashMap;
use std::sync::Arc;

use harbor_core::{LocationSnapshot, OriginKey};
use parking_lot::RwLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("stale snapshot for {key}: version {offered} is not newer than {current}")]
    Stale {
        key: OriginKey,
        offered: u64,
        current: u64,
    },
    #[error("snapshot for {actual} published under {key}")]
    KeyMismatch { key: OriginKey, actual: OriginKey },
}

#[derive(Debug, Default)]
pub struct SnapshotCache {
    snapshots: RwLock<HashMap<OriginKey, Arc<LocationSnapshot>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &OriginKey) -> Option<Arc<LocationSnapshot>> {
        self.snapshots.read().get(key).cloned()
    }

    /// Replace the snapshot for `key` if `snapshot` is newer.
    pub fn publish(&self, key: &OriginKey, snapshot: Arc<LocationSnapshot>) -> Result<(), PublishError> {
        if snapshot.origin_key != *key {
            return Err(PublishError::KeyMismatch {
                key: key.clone(),
                actual: snapshot.origin_key.clone(),
            });
        }
        let mut snapshots = self.snapshots.write();
        if let Some(current) = snapshots.get(key) {
            if snapshot.version <= current.version {
                return Err(PublishError::Stale {
                    key: key.clone(),
                    offered: snapshot.version,
                    current: current.version,
                });
            }
        }
        snapshots.insert(key.clone(), snapshot);
        Ok(())
    }

    /// Whether `snapshot_id` is still what `key` serves.
    pub fn is_current(&self, key: &OriginKey, snapshot_id: &str) -> bool {
        self.snapshots
            .read()
            .get(key)
            .is_some_and(|s| s.snapshot_id == snapshot_id)
    }

    pub fn remove(&self, key: &OriginKey) -> Option<Arc<LocationSnapshot>> {
        self.snapshots.write().remove(key)
    }

    pub fn keys(&self) -> Vec<OriginKey> {
        let mut keys: Vec<_> = self.snapshots.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.snapshots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.read().is_empty()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
