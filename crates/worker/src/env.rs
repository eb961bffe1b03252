// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the worker crate.

use std::time::Duration;

/// Default limit for user shell commands
pub const DEFAULT_USER_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Extra module search directories (colon separated)
pub fn module_path() -> Option<String> {
    std::env::var("HARBOR_MODULE_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// User command timeout override
pub fn user_command_timeout() -> Duration {
    std::env::var("HARBOR_USER_COMMAND_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_USER_COMMAND_TIMEOUT)
}
