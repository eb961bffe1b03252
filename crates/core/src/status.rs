// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Load status of a repository location.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a location is in its lifecycle.
///
/// `Loading -> Loaded` on a successful handshake and snapshot fetch,
/// `Loading -> Failed` on any load-time error, `Loaded -> Failed` when the
/// attached worker goes away. Reload starts over at `Loading`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    Loading,
    Loaded,
    Failed,
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStatus::Loading => write!(f, "loading"),
            LoadStatus::Loaded => write!(f, "loaded"),
            LoadStatus::Failed => write!(f, "failed"),
        }
    }
}
