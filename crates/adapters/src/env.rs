// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use std::path::PathBuf;

/// Resolve state directory: HARBOR_STATE_DIR > XDG_STATE_HOME/harbor > ~/.local/state/harbor
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("HARBOR_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(dir) = dirs::state_dir() {
        return dir.join("harbor");
    }
    match dirs::home_dir() {
        Some(home) => home.join(".local/state/harbor"),
        None => std::env::temp_dir().join("harbor"),
    }
}

/// Directory holding worker sockets (`<state>/sockets`).
pub fn socket_dir() -> PathBuf {
    state_dir().join("sockets")
}

/// Worker binary: HARBOR_WORKER_BINARY, else `harbor-worker` next to the
/// running executable, else `harbor-worker` on PATH.
pub fn worker_binary() -> PathBuf {
    if let Ok(path) = std::env::var("HARBOR_WORKER_BINARY") {
        return PathBuf::from(path);
    }
    let sibling = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("harbor-worker")));
    match sibling {
        Some(path) if path.exists() => path,
        _ => PathBuf::from("harbor-worker"),
    }
}
