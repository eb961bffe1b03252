// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

/// Default filter when `HARBOR_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "warn";

// --- Logging ---

/// Tracing filter directives from HARBOR_LOG (e.g. `info,harbor::worker=debug`)
pub fn log_filter() -> String {
    std::env::var("HARBOR_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

// --- Color ---

pub fn no_color() -> bool {
    std::env::var("NO_COLOR").is_ok_and(|v| v == "1")
}

pub fn force_color() -> bool {
    std::env::var("COLOR").is_ok_and(|v| v == "1")
}
