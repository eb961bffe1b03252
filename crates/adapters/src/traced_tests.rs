// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::worker::FakeWorkerAdapter;
use harbor_core::test_support::nightly_repository;
use harbor_core::{LocationError, LocationOrigin};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::new();
    let logs_clone = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs_clone)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

/// Assert that captured logs contain the expected substring
fn assert_log(logs: &str, label: &str, expected: &str) {
    assert!(logs.contains(expected), "Should log {label}. Logs:\n{logs}",);
}

fn origin() -> LocationOrigin {
    LocationOrigin::file("etl.toml")
}

fn traced_fake() -> (FakeWorkerAdapter, TracedWorker<FakeWorkerAdapter>) {
    let fake = FakeWorkerAdapter::new();
    fake.set_definitions(&origin(), vec![nightly_repository("R")]);
    (fake.clone(), TracedWorker::new(fake))
}

#[test]
#[serial(tracing)]
fn materialize_logs_entry_and_completion() {
    let (logs, result) = with_tracing(|| async {
        let (_, traced) = traced_fake();
        traced.materialize(&LaunchSpec::new(origin(), "etl")).await.map(|_| ())
    });

    assert!(result.is_ok(), "materialize should succeed: {:?}", result);
    assert_log(&logs, "span name", "worker.materialize");
    assert_log(&logs, "location", "location=etl");
    assert_log(&logs, "entry message", "starting");
    assert_log(&logs, "completion", "worker ready");
    assert_log(&logs, "timing", "elapsed_ms");
}

#[test]
#[serial(tracing)]
fn materialize_logs_failure() {
    let (logs, result) = with_tracing(|| async {
        let (fake, traced) = traced_fake();
        fake.fail_launch(&origin(), LaunchError::Spawn("no such file".into()));
        traced.materialize(&LaunchSpec::new(origin(), "etl")).await.map(|_| ())
    });

    assert!(result.is_err());
    assert_log(&logs, "failure", "materialize failed");
    assert_log(&logs, "error", "no such file");
}

#[test]
#[serial(tracing)]
fn call_logs_kind_and_timing() {
    let (logs, result) = with_tracing(|| async {
        let (_, traced) = traced_fake();
        let handle = traced.materialize(&LaunchSpec::new(origin(), "etl")).await.unwrap();
        handle.call(Request::ListRepositories, Duration::from_secs(1)).await
    });

    assert!(result.is_ok());
    assert_log(&logs, "call span", "worker.call");
    assert_log(&logs, "request kind", "list_repositories");
    assert_log(&logs, "completion", "answered");
}

#[test]
#[serial(tracing)]
fn call_logs_worker_reported_errors() {
    let (logs, _) = with_tracing(|| async {
        let (fake, traced) = traced_fake();
        fake.set_load_error(&origin(), LocationError::import_failure("bad syntax"));
        let handle = traced.materialize(&LaunchSpec::new(origin(), "etl")).await.unwrap();
        handle.call(Request::ListRepositories, Duration::from_secs(1)).await
    });

    assert_log(&logs, "worker error", "worker reported error");
    assert_log(&logs, "error kind", "import_failure");
}

#[test]
#[serial(tracing)]
fn call_logs_transport_failures() {
    let (logs, result) = with_tracing(|| async {
        let (fake, traced) = traced_fake();
        let handle = traced.materialize(&LaunchSpec::new(origin(), "etl")).await.unwrap();
        fake.disconnect(&origin(), "socket closed");
        handle.call(Request::Ping, Duration::from_secs(1)).await
    });

    assert!(result.is_err());
    assert_log(&logs, "failure", "call failed");
    assert_log(&logs, "reason", "socket closed");
}

#[test]
#[serial(tracing)]
fn terminate_logs_operation() {
    let (logs, _) = with_tracing(|| async {
        let (_, traced) = traced_fake();
        let handle = traced.materialize(&LaunchSpec::new(origin(), "etl")).await.unwrap();
        handle.terminate().await;
        handle.state().borrow().clone()
    });

    assert_log(&logs, "terminate span", "worker.terminate");
    assert_log(&logs, "terminate completion", "terminated");
}
