// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Point-in-time view of one location as the manager sees it.

use std::sync::Arc;

use harbor_core::{LoadStatus, LocationError, LocationOrigin, LocationSnapshot, OriginKey};

/// A workspace location: origin, load status, and whatever it last loaded.
///
/// A failed reload keeps the previous snapshot, so `status == Failed`
/// with `snapshot.is_some()` means "serving stale definitions".
#[derive(Debug, Clone)]
pub struct RepositoryLocation {
    pub name: String,
    pub origin: LocationOrigin,
    pub origin_key: OriginKey,
    pub status: LoadStatus,
    pub snapshot: Option<Arc<LocationSnapshot>>,
    pub error: Option<LocationError>,
    /// Worker process id (spawned origins only)
    pub pid: Option<u32>,
    pub worker_id: Option<String>,
}

impl RepositoryLocation {
    pub fn is_loaded(&self) -> bool {
        self.status == LoadStatus::Loaded
    }

    pub fn is_failed(&self) -> bool {
        self.status == LoadStatus::Failed
    }

    pub fn snapshot_id(&self) -> Option<&str> {
        self.snapshot.as_deref().map(|s| s.snapshot_id.as_str())
    }

    pub fn repository_names(&self) -> Vec<&str> {
        self.snapshot
            .as_deref()
            .map(LocationSnapshot::repository_names)
            .unwrap_or_default()
    }
}
