// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! harbor-workspace: many repository locations behind one view
//!
//! The [`Workspace`] owns one slot per declared origin. Each slot is
//! loaded by materializing a worker, fetching its repositories, and
//! publishing an immutable [`LocationSnapshot`](harbor_core::LocationSnapshot)
//! to the [`SnapshotCache`]. A failing location is recorded on its own
//! slot and never disturbs the others.

pub mod cache;
pub mod client;
pub mod config;
mod env;
pub mod isolation;
pub mod location;
pub mod manager;
pub mod settings;

pub use cache::{PublishError, SnapshotCache};
pub use client::LocationClient;
pub use config::{ConfigError, ConfigIssue, WorkspaceConfig};
pub use location::RepositoryLocation;
pub use manager::Workspace;
pub use settings::WorkspaceSettings;
