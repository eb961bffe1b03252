// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace manager: owns one slot per origin, loads them concurrently,
//! publishes snapshots, and routes invocations to the live worker.
//!
//! Each slot carries a generation counter. Starting a load bumps it and
//! aborts whatever load was still running for that origin; a finished
//! load only lands if its generation is still current, so at most one
//! publication per origin is ever in flight.

use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use harbor_adapters::{ConnectionState, LaunchSpec, WorkerAdapter, WorkerHandle};
use harbor_core::{
    LoadStatus, LocationEntry, LocationError, LocationSnapshot, OriginKey, Repository,
    RepositorySummary, ScheduleEvaluation, SensorEvaluation, ShortId,
};
use indexmap::IndexMap;
use parking_lot::Mutex;
use tokio::sync::{watch, Semaphore};
use tokio::task::{AbortHandle, JoinHandle, JoinSet};
use tracing::{debug, info, warn, Instrument};

use crate::cache::SnapshotCache;
use crate::client::LocationClient;
use crate::config::WorkspaceConfig;
use crate::isolation;
use crate::location::RepositoryLocation;
use crate::settings::WorkspaceSettings;

type Loaded<H> = (Arc<H>, Vec<Repository>);

/// A set of repository locations backed by worker processes.
///
/// Cloning is cheap; clones share the same slots and cache.
pub struct Workspace<A: WorkerAdapter> {
    shared: Arc<Shared<A>>,
}

impl<A: WorkerAdapter> Clone for Workspace<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<A: WorkerAdapter> {
    adapter: A,
    settings: WorkspaceSettings,
    cache: SnapshotCache,
    config: Mutex<WorkspaceConfig>,
    slots: Mutex<IndexMap<OriginKey, Slot<A::Handle>>>,
    loads: Semaphore,
}

struct Slot<H> {
    entry: LocationEntry,
    status: LoadStatus,
    error: Option<LocationError>,
    handle: Option<Arc<H>>,
    generation: u64,
    /// Version of the last snapshot this slot published
    version: u64,
    task: Option<AbortHandle>,
    watcher: Option<AbortHandle>,
}

impl<H> Slot<H> {
    fn new(entry: LocationEntry) -> Self {
        Self {
            entry,
            status: LoadStatus::Loading,
            error: None,
            handle: None,
            generation: 0,
            version: 0,
            task: None,
            watcher: None,
        }
    }

    fn stop_watching(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

impl<H> Drop for Slot<H> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.stop_watching();
    }
}

impl<A: WorkerAdapter> Workspace<A> {
    /// Materialize every location in `config` and wait for all loads.
    ///
    /// Never fails: locations that do not load are reported as `Failed`.
    pub async fn load(config: WorkspaceConfig, adapter: A, settings: WorkspaceSettings) -> Self {
        let slots: IndexMap<_, _> = config
            .entries()
            .iter()
            .map(|entry| (entry.key(), Slot::new(entry.clone())))
            .collect();
        let keys: Vec<_> = slots.keys().cloned().collect();
        let shared = Arc::new(Shared {
            loads: Semaphore::new(settings.max_concurrent_loads.max(1)),
            adapter,
            settings,
            cache: SnapshotCache::new(),
            config: Mutex::new(config),
            slots: Mutex::new(slots),
        });
        shared.run_loads(&keys).await;

        let workspace = Self { shared };
        let locations = workspace.locations();
        info!(
            locations = locations.len(),
            loaded = locations.iter().filter(|l| l.is_loaded()).count(),
            failed = locations.iter().filter(|l| l.is_failed()).count(),
            "workspace loaded"
        );
        workspace
    }

    /// Every location, in declaration order
    pub fn locations(&self) -> Vec<RepositoryLocation> {
        let slots = self.shared.slots.lock();
        slots
            .iter()
            .map(|(key, slot)| self.shared.view(key, slot))
            .collect()
    }

    pub fn location(&self, name: &str) -> Option<RepositoryLocation> {
        let slots = self.shared.slots.lock();
        slots
            .iter()
            .find(|(_, slot)| slot.entry.name == name)
            .map(|(key, slot)| self.shared.view(key, slot))
    }

    pub fn location_by_key(&self, key: &OriginKey) -> Option<RepositoryLocation> {
        let slots = self.shared.slots.lock();
        slots.get(key).map(|slot| self.shared.view(key, slot))
    }

    /// Reload one origin, or every origin when `key` is `None`.
    ///
    /// Other origins keep serving their current snapshot throughout.
    pub async fn reload(&self, key: Option<&OriginKey>) -> Result<(), LocationError> {
        let keys = {
            let slots = self.shared.slots.lock();
            match key {
                Some(key) if slots.contains_key(key) => vec![key.clone()],
                Some(key) => {
                    return Err(LocationError::definition(format!(
                        "unknown location origin {}",
                        key
                    )))
                }
                None => slots.keys().cloned().collect(),
            }
        };
        self.shared.run_loads(&keys).await;
        Ok(())
    }

    /// Swap in a new config: drop vanished origins, add new ones, reload all.
    pub async fn reload_config(&self, config: WorkspaceConfig) {
        let (keys, removed) = {
            let mut slots = self.shared.slots.lock();
            let mut previous = std::mem::take(&mut *slots);
            for entry in config.entries() {
                let key = entry.key();
                let slot = match previous.shift_remove(&key) {
                    Some(mut slot) => {
                        slot.entry = entry.clone();
                        slot
                    }
                    None => Slot::new(entry.clone()),
                };
                slots.insert(key, slot);
            }
            let mut removed = Vec::new();
            for (key, mut slot) in previous {
                info!(location = %slot.entry.name, "location removed");
                self.shared.cache.remove(&key);
                removed.extend(slot.handle.take());
            }
            (slots.keys().cloned().collect::<Vec<_>>(), removed)
        };
        *self.shared.config.lock() = config;

        for handle in removed {
            handle.terminate().await;
        }
        self.shared.run_loads(&keys).await;
    }

    /// Current snapshot for `key`, if one was ever published
    pub fn snapshot(&self, key: &OriginKey) -> Option<Arc<LocationSnapshot>> {
        self.shared.cache.get(key)
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.shared.cache
    }

    pub fn config(&self) -> WorkspaceConfig {
        self.shared.config.lock().clone()
    }

    pub fn settings(&self) -> &WorkspaceSettings {
        &self.shared.settings
    }

    pub async fn list_repositories(&self, location: &str) -> Result<Vec<RepositorySummary>, LocationError> {
        self.client(location)?.list_repositories().await
    }

    pub async fn get_repository(&self, location: &str, name: &str) -> Result<Repository, LocationError> {
        self.client(location)?.get_repository(name).await
    }

    pub async fn evaluate_schedule(
        &self,
        location: &str,
        repository: &str,
        job: &str,
        schedule: &str,
        scheduled_time: DateTime<Utc>,
    ) -> Result<ScheduleEvaluation, LocationError> {
        self.client(location)?
            .evaluate_schedule(repository, job, schedule, scheduled_time)
            .await
    }

    pub async fn evaluate_sensor(
        &self,
        location: &str,
        repository: &str,
        job: &str,
        sensor: &str,
        cursor: Option<String>,
    ) -> Result<SensorEvaluation, LocationError> {
        self.client(location)?
            .evaluate_sensor(repository, job, sensor, cursor)
            .await
    }

    pub async fn ping(&self, location: &str) -> Result<(), LocationError> {
        self.client(location)?.ping().await
    }

    /// Cancel in-flight loads and terminate every worker.
    pub async fn shutdown(&self) {
        self.shared.loads.close();
        let handles: Vec<_> = {
            let mut slots = self.shared.slots.lock();
            slots
                .values_mut()
                .filter_map(|slot| {
                    slot.generation += 1;
                    if let Some(task) = slot.task.take() {
                        task.abort();
                    }
                    slot.stop_watching();
                    slot.status = LoadStatus::Failed;
                    slot.error = Some(LocationError::connection_lost("workspace shut down"));
                    slot.handle.take().map(|handle| (slot.entry.name.clone(), handle))
                })
                .collect()
        };

        let mut terminating = JoinSet::new();
        for (name, handle) in handles {
            terminating.spawn(async move {
                handle.terminate().await;
                name
            });
        }
        while let Some(result) = terminating.join_next().await {
            match result {
                Ok(name) => debug!(location = %name, "worker terminated"),
                Err(e) => warn!(error = %e, "terminate task failed"),
            }
        }
        info!("workspace shut down");
    }

    /// Client bound to the location's current handle.
    ///
    /// The clone of the handle keeps the worker alive for the duration of
    /// the call even if a reload replaces it meanwhile.
    fn client(&self, location: &str) -> Result<LocationClient<A::Handle>, LocationError> {
        let slots = self.shared.slots.lock();
        let slot = slots
            .values()
            .find(|slot| slot.entry.name == location)
            .ok_or_else(|| LocationError::definition(format!("unknown location '{}'", location)))?;
        match &slot.handle {
            Some(handle) => Ok(LocationClient::new(
                Arc::clone(handle),
                slot.entry.name.clone(),
                &self.shared.settings,
            )),
            None => Err(slot.error.clone().unwrap_or_else(|| {
                LocationError::connection_lost(format!("location '{}' has no live worker", location))
            })),
        }
    }
}

impl<A: WorkerAdapter> Shared<A> {
    fn view(&self, key: &OriginKey, slot: &Slot<A::Handle>) -> RepositoryLocation {
        RepositoryLocation {
            name: slot.entry.name.clone(),
            origin: slot.entry.origin.clone(),
            origin_key: key.clone(),
            status: slot.status,
            snapshot: self.cache.get(key),
            error: slot.error.clone(),
            pid: slot.handle.as_ref().and_then(|h| h.pid()),
            worker_id: slot.handle.as_ref().map(|h| h.worker_id().to_string()),
        }
    }

    /// Start loads for `keys` and wait until each has settled.
    async fn run_loads(self: &Arc<Self>, keys: &[OriginKey]) {
        let started: Vec<_> = keys
            .iter()
            .filter_map(|key| {
                self.start_load(key)
                    .map(|(generation, task)| (key.clone(), generation, task))
            })
            .collect();

        for (key, generation, task) in started {
            if let Err(e) = task.await {
                // Aborts mean a newer load took over; anything else is a crash
                if let Some(error) = isolation::from_join_error(&e) {
                    self.finish_load(&key, generation, Err(error)).await;
                }
            }
        }
    }

    fn start_load(self: &Arc<Self>, key: &OriginKey) -> Option<(u64, JoinHandle<()>)> {
        if self.loads.is_closed() {
            return None;
        }
        let mut slots = self.slots.lock();
        let slot = slots.get_mut(key)?;
        slot.generation += 1;
        if let Some(task) = slot.task.take() {
            debug!(location = %slot.entry.name, "superseding in-flight load");
            task.abort();
        }
        slot.status = LoadStatus::Loading;

        let generation = slot.generation;
        let entry = slot.entry.clone();
        let span = tracing::info_span!("location.load", location = %entry.name, origin = %entry.origin);
        let shared = Arc::clone(self);
        let task_key = key.clone();
        let task = tokio::spawn(
            async move {
                let outcome = shared.materialize(&entry).await;
                shared.finish_load(&task_key, generation, outcome).await;
            }
            .instrument(span),
        );
        slot.task = Some(task.abort_handle());
        Some((generation, task))
    }

    async fn materialize(&self, entry: &LocationEntry) -> Result<Loaded<A::Handle>, LocationError> {
        let _permit = self
            .loads
            .acquire()
            .await
            .map_err(|_| LocationError::connection_lost("workspace shut down"))?;

        let spec = LaunchSpec {
            origin: entry.origin.clone(),
            location_name: entry.name.clone(),
            origin_key: entry.key(),
            log: self.settings.worker_log.clone(),
            timeouts: self.settings.launch_timeouts(),
        };
        let handle = self
            .adapter
            .materialize(&spec)
            .await
            .map_err(|e| isolation::from_launch_error(&e))?;
        let handle = Arc::new(handle);

        let client = LocationClient::new(Arc::clone(&handle), entry.name.clone(), &self.settings);
        match client.fetch_repositories().await {
            Ok(repositories) => Ok((handle, repositories)),
            Err(e) => {
                handle.terminate().await;
                Err(e)
            }
        }
    }

    async fn finish_load(
        self: &Arc<Self>,
        key: &OriginKey,
        generation: u64,
        outcome: Result<Loaded<A::Handle>, LocationError>,
    ) {
        let discarded = {
            let mut slots = self.slots.lock();
            match slots.get_mut(key) {
                Some(slot) if slot.generation == generation => {
                    slot.task = None;
                    self.apply(key, slot, outcome)
                }
                _ => {
                    debug!(origin_key = %key, generation, "discarding superseded load");
                    outcome.ok().map(|(handle, _)| handle)
                }
            }
        };
        if let Some(handle) = discarded {
            handle.terminate().await;
        }
    }

    /// Land a load result; returns a handle that lost its place.
    fn apply(
        self: &Arc<Self>,
        key: &OriginKey,
        slot: &mut Slot<A::Handle>,
        outcome: Result<Loaded<A::Handle>, LocationError>,
    ) -> Option<Arc<A::Handle>> {
        let (handle, repositories) = match outcome {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(location = %slot.entry.name, kind = %e.kind, error = %e.message, "location failed to load");
                slot.status = LoadStatus::Failed;
                slot.error = Some(e);
                slot.stop_watching();
                slot.handle = None;
                return None;
            }
        };

        let current = self.cache.get(key).map_or(0, |s| s.version);
        let version = slot.version.max(current) + 1;
        let snapshot = Arc::new(LocationSnapshot::new(
            key.clone(),
            slot.entry.name.clone(),
            repositories,
            version,
        ));
        if let Err(e) = self.cache.publish(key, Arc::clone(&snapshot)) {
            warn!(location = %slot.entry.name, error = %e, "snapshot rejected");
            slot.status = LoadStatus::Failed;
            slot.error = Some(LocationError::definition(e.to_string()));
            return Some(handle);
        }

        info!(
            location = %slot.entry.name,
            repositories = snapshot.repositories.len(),
            snapshot_id = snapshot.snapshot_id.short(12),
            version,
            "location loaded"
        );
        slot.version = version;
        slot.status = LoadStatus::Loaded;
        slot.error = None;
        slot.stop_watching();
        slot.watcher = Some(watch_liveness(
            Arc::downgrade(self),
            key.clone(),
            slot.generation,
            handle.state(),
        ));
        slot.handle = Some(handle);
        None
    }

    fn mark_disconnected(&self, key: &OriginKey, generation: u64, reason: String) {
        let dropped = {
            let mut slots = self.slots.lock();
            let Some(slot) = slots.get_mut(key) else {
                return;
            };
            if slot.generation != generation || slot.status != LoadStatus::Loaded {
                return;
            }
            warn!(location = %slot.entry.name, %reason, "worker disconnected");
            slot.status = LoadStatus::Failed;
            slot.error = Some(LocationError::connection_lost(reason));
            slot.watcher = None;
            slot.handle.take()
        };
        drop(dropped);
    }
}

/// Mark the slot failed once its worker reports a disconnect.
fn watch_liveness<A: WorkerAdapter>(
    shared: Weak<Shared<A>>,
    key: OriginKey,
    generation: u64,
    mut state: watch::Receiver<ConnectionState>,
) -> AbortHandle {
    tokio::spawn(async move {
        let reason = loop {
            if let Some(reason) = disconnect_reason(&mut state) {
                break reason;
            }
            if state.changed().await.is_err() {
                break "worker handle closed".to_string();
            }
        };
        if let Some(shared) = shared.upgrade() {
            shared.mark_disconnected(&key, generation, reason);
        }
    })
    .abort_handle()
}

fn disconnect_reason(state: &mut watch::Receiver<ConnectionState>) -> Option<String> {
    match &*state.borrow_and_update() {
        ConnectionState::Connected => None,
        ConnectionState::Disconnected { reason } => Some(reason.clone()),
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
