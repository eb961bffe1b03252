// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace tuning: deadlines, concurrency, retries.

use std::time::Duration;

use harbor_adapters::LaunchTimeouts;
use harbor_worker::WorkerLogConfig;

use crate::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSettings {
    /// Spawn (or connect) to handshake complete
    pub startup_timeout: Duration,
    /// Definition reads, pings and heartbeats
    pub call_timeout: Duration,
    /// Schedule and sensor evaluation; runs user commands, so longer
    pub evaluation_timeout: Duration,
    pub heartbeat_interval: Duration,
    pub heartbeat_failures: u32,
    /// Locations loading at once
    pub max_concurrent_loads: usize,
    /// Extra attempts for idempotent reads on timeout or lost connection
    pub read_retries: u32,
    /// Logging handed to every spawned worker
    pub worker_log: WorkerLogConfig,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            startup_timeout: Duration::from_secs(30),
            call_timeout: Duration::from_secs(10),
            evaluation_timeout: Duration::from_secs(90),
            heartbeat_interval: Duration::from_secs(5),
            heartbeat_failures: 3,
            max_concurrent_loads: 4,
            read_retries: 2,
            worker_log: WorkerLogConfig::default(),
        }
    }
}

impl WorkspaceSettings {
    /// Defaults with `HARBOR_*` environment overrides applied.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            startup_timeout: env::startup_timeout().unwrap_or(defaults.startup_timeout),
            call_timeout: env::call_timeout().unwrap_or(defaults.call_timeout),
            evaluation_timeout: env::evaluation_timeout().unwrap_or(defaults.evaluation_timeout),
            heartbeat_interval: env::heartbeat_interval().unwrap_or(defaults.heartbeat_interval),
            max_concurrent_loads: env::max_concurrent_loads().unwrap_or(defaults.max_concurrent_loads),
            ..defaults
        }
    }

    pub fn launch_timeouts(&self) -> LaunchTimeouts {
        LaunchTimeouts {
            startup: self.startup_timeout,
            call: self.call_timeout,
            heartbeat_interval: self.heartbeat_interval,
            heartbeat_failures: self.heartbeat_failures,
        }
    }
}
