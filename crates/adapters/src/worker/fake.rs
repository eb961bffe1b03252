// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake worker adapter for testing
//!
//! Handles run the real request handler in-process over scripted (or
//! actually loaded) definitions, so evaluation behaves as in a worker
//! while launch failures, hangs and disconnects stay under test control.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{CallError, ConnectionState, LaunchError, LaunchSpec, WorkerAdapter, WorkerHandle};
use async_trait::async_trait;
use harbor_core::{LocationError, LocationOrigin, OriginKey, Repository};
use harbor_worker::{loader, EntryPoint, EvalContext, Handler, Request, Response};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;

/// Recorded adapter or handle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerCall {
    Materialize { location: String, origin_key: OriginKey },
    Call { location: String, kind: &'static str },
    Terminate { location: String },
}

/// Scripted behavior for one origin
#[derive(Default)]
struct Script {
    definitions: Option<Result<Vec<Repository>, LocationError>>,
    launch_error: Option<LaunchError>,
    launch_delay: Option<Duration>,
    hang: Arc<AtomicBool>,
    handles: Vec<Weak<watch::Sender<ConnectionState>>>,
    launches: usize,
    live: usize,
}

#[derive(Default)]
struct FakeWorkerState {
    scripts: HashMap<OriginKey, Script>,
    calls: Vec<WorkerCall>,
    next_id: u32,
}

/// Fake worker adapter for testing
#[derive(Clone, Default)]
pub struct FakeWorkerAdapter {
    inner: Arc<Mutex<FakeWorkerState>>,
}

impl FakeWorkerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn script<R>(&self, origin: &LocationOrigin, f: impl FnOnce(&mut Script) -> R) -> R {
        let mut inner = self.inner.lock();
        f(inner.scripts.entry(origin.key()).or_default())
    }

    /// Serve these definitions from workers launched for `origin`
    pub fn set_definitions(&self, origin: &LocationOrigin, repositories: Vec<Repository>) {
        self.script(origin, |s| s.definitions = Some(Ok(repositories)));
    }

    /// Launch succeeds, but the worker reports this load error
    pub fn set_load_error(&self, origin: &LocationOrigin, error: LocationError) {
        self.script(origin, |s| s.definitions = Some(Err(error)));
    }

    /// Fail every launch for `origin` until [`Self::allow_launch`]
    pub fn fail_launch(&self, origin: &LocationOrigin, error: LaunchError) {
        self.script(origin, |s| s.launch_error = Some(error));
    }

    pub fn allow_launch(&self, origin: &LocationOrigin) {
        self.script(origin, |s| s.launch_error = None);
    }

    /// Make `materialize` take this long
    pub fn delay_launch(&self, origin: &LocationOrigin, delay: Duration) {
        self.script(origin, |s| s.launch_delay = Some(delay));
    }

    /// Calls to live and future handles for `origin` stop answering
    pub fn set_hang(&self, origin: &LocationOrigin, hang: bool) {
        self.script(origin, |s| s.hang.store(hang, Ordering::SeqCst));
    }

    /// Mark every live handle for `origin` disconnected
    pub fn disconnect(&self, origin: &LocationOrigin, reason: &str) {
        self.script(origin, |s| {
            for sender in s.handles.iter().filter_map(Weak::upgrade) {
                sender.send_replace(ConnectionState::Disconnected {
                    reason: reason.to_string(),
                });
            }
        });
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<WorkerCall> {
        self.inner.lock().calls.clone()
    }

    /// Number of successful launches for `origin`
    pub fn launches(&self, origin: &LocationOrigin) -> usize {
        self.script(origin, |s| s.launches)
    }

    /// Handles for `origin` that have not been dropped
    pub fn live_handles(&self, origin: &LocationOrigin) -> usize {
        self.script(origin, |s| s.live)
    }
}

fn load_from_origin(origin: &LocationOrigin) -> Result<Vec<Repository>, LocationError> {
    let entry = match origin {
        LocationOrigin::File { path, .. } => EntryPoint::File(path.clone()),
        LocationOrigin::Module { name, .. } => EntryPoint::Module(name.clone()),
        LocationOrigin::Grpc { .. } => return Ok(Vec::new()),
    };
    loader::load(&entry, &working_dir(origin), None)
}

fn working_dir(origin: &LocationOrigin) -> std::path::PathBuf {
    match origin {
        LocationOrigin::File {
            working_directory: Some(dir),
            ..
        }
        | LocationOrigin::Module {
            working_directory: Some(dir),
            ..
        } => dir.clone(),
        _ => std::env::temp_dir(),
    }
}

#[async_trait]
impl WorkerAdapter for FakeWorkerAdapter {
    type Handle = FakeHandle;

    async fn materialize(&self, spec: &LaunchSpec) -> Result<FakeHandle, LaunchError> {
        let delay = {
            let mut inner = self.inner.lock();
            inner.calls.push(WorkerCall::Materialize {
                location: spec.location_name.clone(),
                origin_key: spec.origin_key.clone(),
            });
            inner
                .scripts
                .get(&spec.origin_key)
                .and_then(|s| s.launch_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let n = inner.next_id;
        let script = inner.scripts.entry(spec.origin_key.clone()).or_default();
        if let Some(error) = &script.launch_error {
            return Err(error.clone());
        }
        let definitions = match &script.definitions {
            Some(definitions) => definitions.clone(),
            None => load_from_origin(&spec.origin),
        };

        let (state_tx, state) = watch::channel(ConnectionState::Connected);
        let state_tx = Arc::new(state_tx);
        script.handles.retain(|w| w.strong_count() > 0);
        script.handles.push(Arc::downgrade(&state_tx));
        script.launches += 1;
        script.live += 1;

        let worker_id = format!("fake-{}", n);
        let handler = Handler::new(
            worker_id.clone(),
            spec.location_name.clone(),
            definitions,
            EvalContext {
                working_dir: working_dir(&spec.origin),
                command_timeout: Duration::from_secs(60),
            },
        );
        Ok(FakeHandle {
            worker_id,
            pid: spec.origin.is_spawned().then_some(40_000 + n),
            location: spec.location_name.clone(),
            origin_key: spec.origin_key.clone(),
            handler,
            hang: Arc::clone(&script.hang),
            state_tx,
            state,
            adapter: Arc::clone(&self.inner),
        })
    }
}

/// In-process worker handle
pub struct FakeHandle {
    worker_id: String,
    pid: Option<u32>,
    location: String,
    origin_key: OriginKey,
    handler: Handler,
    hang: Arc<AtomicBool>,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    state: watch::Receiver<ConnectionState>,
    adapter: Arc<Mutex<FakeWorkerState>>,
}

impl FakeHandle {
    fn disconnected(&self) -> Option<String> {
        match &*self.state.borrow() {
            ConnectionState::Connected => None,
            ConnectionState::Disconnected { reason } => Some(reason.clone()),
        }
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        if let Some(script) = self.adapter.lock().scripts.get_mut(&self.origin_key) {
            script.live = script.live.saturating_sub(1);
        }
    }
}

#[async_trait]
impl WorkerHandle for FakeHandle {
    fn worker_id(&self) -> &str {
        &self.worker_id
    }

    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    async fn call(&self, request: Request, timeout: Duration) -> Result<Response, CallError> {
        self.adapter.lock().calls.push(WorkerCall::Call {
            location: self.location.clone(),
            kind: request.kind(),
        });
        if let Some(reason) = self.disconnected() {
            return Err(CallError::Disconnected(reason));
        }
        if self.hang.load(Ordering::SeqCst) {
            tokio::time::sleep(timeout).await;
            return Err(CallError::Timeout(timeout));
        }
        match tokio::time::timeout(timeout, self.handler.handle(request)).await {
            Ok(response) => Ok(response),
            Err(_) => Err(CallError::Timeout(timeout)),
        }
    }

    async fn terminate(&self) {
        self.adapter.lock().calls.push(WorkerCall::Terminate {
            location: self.location.clone(),
        });
        self.state_tx.send_if_modified(|state| {
            if state.is_connected() {
                *state = ConnectionState::Disconnected {
                    reason: "worker terminated".to_string(),
                };
                true
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
