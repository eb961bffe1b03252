// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters that turn a location origin into a live worker connection

pub mod backoff;
mod env;
pub mod traced;
pub mod worker;

pub use backoff::Backoff;
pub use traced::{TracedHandle, TracedWorker};
pub use worker::{
    CallError, ConnectionState, Endpoint, LaunchError, LaunchSpec, LaunchTimeouts,
    ProcessHandle, ProcessWorkerAdapter, WorkerAdapter, WorkerHandle,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use worker::{FakeHandle, FakeWorkerAdapter, WorkerCall};
