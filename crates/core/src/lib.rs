// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! harbor-core: data model shared by the host and the workers

pub mod definition;
pub mod error;
pub mod id;
pub mod origin;
pub mod run;
pub mod snapshot;
pub mod status;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use definition::{
    structural_errors, JobDefinition, Repository, RepositorySummary, ScheduleDefinition, SensorDefinition,
    SensorSource,
};
pub use error::{LocationError, LocationErrorKind};
pub use id::{IdGen, ShortId, UuidIdGen};
pub use origin::{normalize_path, LocationEntry, LocationOrigin, OriginKey};
pub use run::{RunRequest, ScheduleEvaluation, SensorEvaluation};
pub use snapshot::{snapshot_id, LocationSnapshot};
pub use status::LoadStatus;
