// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the workspace crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Spawn-to-handshake deadline override
pub fn startup_timeout() -> Option<Duration> {
    parse_duration_ms("HARBOR_TIMEOUT_STARTUP_MS")
}

/// Deadline for definition reads and pings
pub fn call_timeout() -> Option<Duration> {
    parse_duration_ms("HARBOR_TIMEOUT_CALL_MS")
}

/// Deadline for schedule and sensor evaluation
pub fn evaluation_timeout() -> Option<Duration> {
    parse_duration_ms("HARBOR_TIMEOUT_EVAL_MS")
}

pub fn heartbeat_interval() -> Option<Duration> {
    parse_duration_ms("HARBOR_HEARTBEAT_MS")
}

pub fn max_concurrent_loads() -> Option<usize> {
    std::env::var("HARBOR_MAX_CONCURRENT_LOADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
}
