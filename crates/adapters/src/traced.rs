// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::worker::{CallError, ConnectionState, LaunchError, LaunchSpec, WorkerAdapter, WorkerHandle};
use async_trait::async_trait;
use harbor_worker::{Request, Response};
use std::time::Duration;
use tokio::sync::watch;
use tracing::Instrument;

/// Wrapper that adds tracing to any WorkerAdapter
#[derive(Clone)]
pub struct TracedWorker<A> {
    inner: A,
}

impl<A> TracedWorker<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

#[async_trait]
impl<A: WorkerAdapter> WorkerAdapter for TracedWorker<A> {
    type Handle = TracedHandle<A::Handle>;

    async fn materialize(&self, spec: &LaunchSpec) -> Result<Self::Handle, LaunchError> {
        let span = tracing::info_span!(
            "worker.materialize",
            location = %spec.location_name,
            origin = %spec.origin,
            origin_key = %spec.origin_key,
        );
        async {
            tracing::info!("starting");
            let start = std::time::Instant::now();
            let result = self.inner.materialize(spec).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(h) => tracing::info!(worker_id = h.worker_id(), pid = ?h.pid(), elapsed_ms, "worker ready"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "materialize failed"),
            }
            result.map(|inner| TracedHandle {
                inner,
                location: spec.location_name.clone(),
            })
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any WorkerHandle
pub struct TracedHandle<H> {
    inner: H,
    location: String,
}

impl<H> TracedHandle<H> {
    pub fn inner(&self) -> &H {
        &self.inner
    }
}

#[async_trait]
impl<H: WorkerHandle> WorkerHandle for TracedHandle<H> {
    fn worker_id(&self) -> &str {
        self.inner.worker_id()
    }

    fn pid(&self) -> Option<u32> {
        self.inner.pid()
    }

    fn state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state()
    }

    async fn call(&self, request: Request, timeout: Duration) -> Result<Response, CallError> {
        let kind = request.kind();
        let span = tracing::info_span!("worker.call", location = %self.location, kind);
        async {
            tracing::debug!(timeout_ms = timeout.as_millis() as u64, "sending");
            let start = std::time::Instant::now();
            let result = self.inner.call(request, timeout).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(Response::Error { error }) => {
                    tracing::warn!(elapsed_ms, error_kind = %error.kind, error = %error.message, "worker reported error")
                }
                Ok(_) => tracing::debug!(elapsed_ms, "answered"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "call failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn terminate(&self) {
        self.inner.terminate().await;
        tracing::info_span!("worker.terminate", location = %self.location)
            .in_scope(|| tracing::info!(worker_id = self.inner.worker_id(), "terminated"));
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
