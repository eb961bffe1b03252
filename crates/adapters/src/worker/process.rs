// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawned and attached workers.
//!
//! File and module origins get a fresh `harbor-worker` process listening
//! on a Unix socket; grpc origins attach to a worker someone else runs.
//! Either way a monitor task watches the worker until the handle goes
//! away, and the handle's drop kills what it spawned.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use harbor_core::{IdGen, LocationOrigin, OriginKey, UuidIdGen};
use harbor_worker::{Request, Response, READY_LINE};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{
    CallError, ConnectionState, Endpoint, LaunchError, LaunchSpec, LaunchTimeouts, WorkerAdapter,
    WorkerHandle,
};
use crate::backoff::Backoff;
use crate::env;

/// Lines of worker stderr kept for startup failure messages
const STDERR_TAIL_LINES: usize = 20;

/// How long `terminate` waits for a worker to exit after `Shutdown`
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Time allowed for the stderr forwarder to drain after an early exit
const STDERR_DRAIN: Duration = Duration::from_millis(500);

/// Spawns `harbor-worker` processes and attaches to running workers
#[derive(Clone, Debug)]
pub struct ProcessWorkerAdapter {
    worker_binary: PathBuf,
    socket_dir: PathBuf,
    backoff: Backoff,
}

impl ProcessWorkerAdapter {
    pub fn new(worker_binary: impl Into<PathBuf>, socket_dir: impl Into<PathBuf>) -> Self {
        Self {
            worker_binary: worker_binary.into(),
            socket_dir: socket_dir.into(),
            backoff: Backoff::default(),
        }
    }

    /// Worker binary and socket directory from `HARBOR_WORKER_BINARY` and
    /// `HARBOR_STATE_DIR`.
    pub fn from_env() -> Self {
        Self::new(env::worker_binary(), env::socket_dir())
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn worker_binary(&self) -> &Path {
        &self.worker_binary
    }

    fn socket_path(&self, key: &OriginKey) -> PathBuf {
        let id = UuidIdGen.next();
        let suffix = harbor_core::ShortId::short(id.as_str(), 8);
        self.socket_dir.join(format!("{}-{}.sock", key, suffix))
    }

    fn command(&self, spec: &LaunchSpec, socket: &Path) -> Result<Command, LaunchError> {
        let mut cmd = Command::new(&self.worker_binary);
        let working_directory = match &spec.origin {
            LocationOrigin::File {
                path,
                working_directory,
            } => {
                cmd.arg("--file").arg(path);
                working_directory
            }
            LocationOrigin::Module {
                name,
                working_directory,
            } => {
                cmd.arg("--module").arg(name);
                working_directory
            }
            LocationOrigin::Grpc { .. } => {
                return Err(LaunchError::Spawn(
                    "grpc origins attach to a running worker".to_string(),
                ))
            }
        };
        if let Some(dir) = working_directory {
            cmd.arg("--working-directory").arg(dir);
        }
        cmd.arg("--socket")
            .arg(socket)
            .arg("--location")
            .arg(&spec.location_name)
            .args(spec.log.to_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        Ok(cmd)
    }

    async fn spawn(&self, spec: &LaunchSpec) -> Result<ProcessHandle, LaunchError> {
        tokio::fs::create_dir_all(&self.socket_dir).await.map_err(|e| {
            LaunchError::Spawn(format!(
                "cannot create socket directory {}: {}",
                self.socket_dir.display(),
                e
            ))
        })?;
        let socket = self.socket_path(&spec.origin_key);
        // Held until the handle owns the socket; covers errors and aborted loads
        let guard = SocketGuard::new(socket.clone());
        let location = spec.location_name.clone();

        let mut child = self
            .command(spec, &socket)?
            .spawn()
            .map_err(|e| LaunchError::Spawn(format!("{}: {}", self.worker_binary.display(), e)))?;
        let pid = child.id();
        tracing::debug!(location = %location, pid, socket = %socket.display(), "worker spawned");

        let tail = Arc::new(Mutex::new(VecDeque::new()));
        let stderr_task = child.stderr.take().map(|stderr| {
            let lines = BufReader::new(stderr).lines();
            tokio::spawn(forward_lines(lines, location.clone(), "stderr", Some(Arc::clone(&tail))))
        });
        let Some(stdout) = child.stdout.take() else {
            return Err(LaunchError::Spawn("worker stdout not captured".to_string()));
        };
        let mut stdout = BufReader::new(stdout).lines();

        let startup = spec.timeouts.startup;
        match tokio::time::timeout(startup, wait_ready(&mut stdout, &location)).await {
            Ok(true) => {}
            Ok(false) => {
                let status = match child.wait().await {
                    Ok(status) => describe_status(status),
                    Err(e) => format!("wait failed: {}", e),
                };
                if let Some(task) = stderr_task {
                    let _ = tokio::time::timeout(STDERR_DRAIN, task).await;
                }
                let stderr = tail.lock().iter().cloned().collect::<Vec<_>>().join("\n");
                return Err(LaunchError::ExitedBeforeReady { status, stderr });
            }
            Err(_) => {
                let _ = child.kill().await;
                return Err(LaunchError::StartupTimeout(startup));
            }
        }
        tokio::spawn(forward_lines(stdout, location.clone(), "stdout", None));

        let endpoint = Endpoint::Unix(socket.clone());
        let hello = match endpoint.handshake(spec.timeouts.call).await {
            Ok(hello) => hello,
            Err(e) => {
                let _ = child.kill().await;
                return Err(e);
            }
        };
        tracing::info!(location = %location, pid, worker_id = %hello.worker_id, "worker ready");

        Ok(ProcessHandle::start(
            hello.worker_id,
            pid,
            endpoint,
            Some(child),
            Some(guard.disarm()),
            location,
            spec.timeouts,
        ))
    }

    async fn attach(&self, spec: &LaunchSpec, host: &str, port: u16) -> Result<ProcessHandle, LaunchError> {
        let endpoint = Endpoint::Tcp {
            host: host.to_string(),
            port,
        };
        let deadline = Instant::now() + spec.timeouts.startup;
        let call_timeout = spec.timeouts.call;
        let mut attempts = 0;
        let result = self
            .backoff
            .retry(
                deadline,
                |n| {
                    attempts = n;
                    let endpoint = endpoint.clone();
                    async move { endpoint.handshake(call_timeout).await }
                },
                |e| {
                    matches!(
                        e,
                        LaunchError::Handshake(CallError::Disconnected(_) | CallError::Timeout(_))
                    )
                },
            )
            .await;
        let hello = match result {
            Ok(hello) => hello,
            Err(LaunchError::Handshake(CallError::Disconnected(reason))) => {
                return Err(LaunchError::Connect {
                    endpoint: endpoint.to_string(),
                    attempts,
                    reason,
                })
            }
            Err(e) => return Err(e),
        };
        tracing::info!(
            location = %spec.location_name,
            %endpoint,
            attempts,
            worker_id = %hello.worker_id,
            "attached to worker"
        );

        Ok(ProcessHandle::start(
            hello.worker_id,
            None,
            endpoint,
            None,
            None,
            spec.location_name.clone(),
            spec.timeouts,
        ))
    }
}

#[async_trait]
impl WorkerAdapter for ProcessWorkerAdapter {
    type Handle = ProcessHandle;

    async fn materialize(&self, spec: &LaunchSpec) -> Result<ProcessHandle, LaunchError> {
        match &spec.origin {
            LocationOrigin::Grpc { host, port } => self.attach(spec, host, *port).await,
            LocationOrigin::File { .. } | LocationOrigin::Module { .. } => self.spawn(spec).await,
        }
    }
}

/// Live connection to a spawned or attached worker.
///
/// Dropping the handle stops the monitor, which kills a spawned worker
/// and removes its socket.
pub struct ProcessHandle {
    worker_id: String,
    pid: Option<u32>,
    endpoint: Endpoint,
    location: String,
    state: watch::Receiver<ConnectionState>,
    cancel: CancellationToken,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl ProcessHandle {
    fn start(
        worker_id: String,
        pid: Option<u32>,
        endpoint: Endpoint,
        child: Option<Child>,
        socket: Option<PathBuf>,
        location: String,
        timeouts: LaunchTimeouts,
    ) -> Self {
        let (state_tx, state) = watch::channel(ConnectionState::Connected);
        let cancel = CancellationToken::new();
        let monitor = tokio::spawn(monitor(Monitor {
            child,
            socket,
            endpoint: endpoint.clone(),
            location: location.clone(),
            timeouts,
            state: state_tx,
            cancel: cancel.clone(),
        }));
        Self {
            worker_id,
            pid,
            endpoint,
            location,
            state,
            cancel,
            monitor: Mutex::new(Some(monitor)),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn disconnected(&self) -> Option<String> {
        match &*self.state.borrow() {
            ConnectionState::Connected => None,
            ConnectionState::Disconnected { reason } => Some(reason.clone()),
        }
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[async_trait]
impl WorkerHandle for ProcessHandle {
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
        if let Some(reason) = self.disconnected() {
            return Err(CallError::Disconnected(reason));
        }
        self.endpoint.call(&request, timeout).await
    }

    async fn terminate(&self) {
        // Attached workers belong to someone else; only detach from them
        if self.pid.is_some() && self.disconnected().is_none() {
            match self.endpoint.call(&Request::Shutdown, SHUTDOWN_GRACE).await {
                Ok(_) | Err(CallError::Disconnected(_)) => {}
                Err(e) => tracing::debug!(location = %self.location, error = %e, "shutdown request failed"),
            }
            let mut state = self.state.clone();
            let exited = async { state.wait_for(|s| !s.is_connected()).await.is_ok() };
            let _ = tokio::time::timeout(SHUTDOWN_GRACE, exited).await;
        }
        self.cancel.cancel();
        let monitor = self.monitor.lock().take();
        if let Some(task) = monitor {
            let _ = task.await;
        }
        tracing::debug!(location = %self.location, worker_id = %self.worker_id, "worker terminated");
    }
}

struct Monitor {
    child: Option<Child>,
    socket: Option<PathBuf>,
    endpoint: Endpoint,
    location: String,
    timeouts: LaunchTimeouts,
    state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
}

/// Watch one worker: process exit, heartbeat pings, and cancellation.
async fn monitor(mut m: Monitor) {
    let interval = m.timeouts.heartbeat_interval;
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut failures = 0u32;
    let mut exited = false;

    loop {
        tokio::select! {
            _ = m.cancel.cancelled() => break,
            status = wait_child(&mut m.child) => {
                let reason = match status {
                    Ok(status) => format!("worker exited ({})", describe_status(status)),
                    Err(e) => format!("lost track of worker process: {}", e),
                };
                tracing::warn!(location = %m.location, %reason, "worker gone");
                m.state.send_replace(ConnectionState::Disconnected { reason });
                exited = true;
                break;
            }
            _ = ticker.tick() => {
                let result = m.endpoint.call(&Request::Ping, m.timeouts.call.min(interval)).await;
                let err = match result {
                    Ok(Response::Pong) => {
                        failures = 0;
                        continue;
                    }
                    Ok(_) => CallError::Malformed("unexpected response to Ping".to_string()),
                    Err(e) => e,
                };
                failures += 1;
                tracing::debug!(location = %m.location, failures, error = %err, "heartbeat failed");
                if failures >= m.timeouts.heartbeat_failures.max(1) {
                    let reason = format!("heartbeat lost after {} failed pings: {}", failures, err);
                    tracing::warn!(location = %m.location, %reason, "worker unresponsive");
                    m.state.send_replace(ConnectionState::Disconnected { reason });
                    break;
                }
            }
        }
    }

    if exited {
        m.child = None;
    }
    if let Some(mut child) = m.child.take() {
        let _ = child.start_kill();
        let _ = child.wait().await;
    }
    if let Some(socket) = &m.socket {
        remove_socket(socket);
    }
    m.state.send_if_modified(|state| {
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

async fn wait_child(child: &mut Option<Child>) -> std::io::Result<ExitStatus> {
    match child {
        Some(child) => child.wait().await,
        None => std::future::pending().await,
    }
}

/// Read stdout until the ready line; `false` if the worker closed stdout first.
async fn wait_ready<R: AsyncRead + Unpin>(lines: &mut Lines<BufReader<R>>, location: &str) -> bool {
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim() == READY_LINE => return true,
            Ok(Some(line)) => {
                tracing::info!(target: "harbor::worker", location, stream = "stdout", "{}", line)
            }
            Ok(None) | Err(_) => return false,
        }
    }
}

/// Re-emit worker output as host tracing events, keeping a bounded tail.
async fn forward_lines<R: AsyncRead + Unpin>(
    mut lines: Lines<BufReader<R>>,
    location: String,
    stream: &'static str,
    tail: Option<Arc<Mutex<VecDeque<String>>>>,
) {
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::info!(target: "harbor::worker", location = %location, stream, "{}", line);
        if let Some(tail) = &tail {
            let mut tail = tail.lock();
            if tail.len() == STDERR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line);
        }
    }
}

fn describe_status(status: ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;
    match (status.code(), status.signal()) {
        (Some(code), _) => format!("exit status {}", code),
        (None, Some(signal)) => format!("killed by signal {}", signal),
        (None, None) => "unknown exit status".to_string(),
    }
}

/// Removes a worker socket on drop unless disarmed.
struct SocketGuard(Option<PathBuf>);

impl SocketGuard {
    fn new(path: PathBuf) -> Self {
        Self(Some(path))
    }

    fn disarm(mut self) -> PathBuf {
        self.0.take().unwrap_or_default()
    }
}

impl Drop for SocketGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            remove_socket(&path);
        }
    }
}

fn remove_socket(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!(path = %path.display(), error = %e, "failed to remove worker socket");
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
