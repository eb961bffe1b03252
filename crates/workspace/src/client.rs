// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed calls against one location's worker.
//!
//! Definition reads are idempotent and retried on transient failures;
//! evaluations run user code and are sent exactly once.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use harbor_adapters::WorkerHandle;
use harbor_core::{LocationError, Repository, RepositorySummary, ScheduleEvaluation, SensorEvaluation};
use harbor_worker::{Request, Response};

use crate::isolation;
use crate::settings::WorkspaceSettings;

pub struct LocationClient<H> {
    handle: Arc<H>,
    location: String,
    call_timeout: Duration,
    evaluation_timeout: Duration,
    read_retries: u32,
}

impl<H> Clone for LocationClient<H> {
    fn clone(&self) -> Self {
        Self {
            handle: Arc::clone(&self.handle),
            location: self.location.clone(),
            call_timeout: self.call_timeout,
            evaluation_timeout: self.evaluation_timeout,
            read_retries: self.read_retries,
        }
    }
}

impl<H: WorkerHandle> LocationClient<H> {
    pub fn new(handle: Arc<H>, location: impl Into<String>, settings: &WorkspaceSettings) -> Self {
        Self {
            handle,
            location: location.into(),
            call_timeout: settings.call_timeout,
            evaluation_timeout: settings.evaluation_timeout,
            read_retries: settings.read_retries,
        }
    }

    pub fn handle(&self) -> &Arc<H> {
        &self.handle
    }

    pub async fn ping(&self) -> Result<(), LocationError> {
        match self.send(Request::Ping, self.call_timeout).await? {
            Response::Pong => Ok(()),
            other => Err(isolation::unexpected_response("Pong", &other)),
        }
    }

    pub async fn list_repositories(&self) -> Result<Vec<RepositorySummary>, LocationError> {
        match self.read(Request::ListRepositories).await? {
            Response::Repositories { repositories } => Ok(repositories),
            other => Err(isolation::unexpected_response("Repositories", &other)),
        }
    }

    pub async fn get_repository(&self, name: &str) -> Result<Repository, LocationError> {
        let request = Request::GetRepository {
            name: name.to_string(),
        };
        match self.read(request).await? {
            Response::Repository { repository } => Ok(*repository),
            other => Err(isolation::unexpected_response("Repository", &other)),
        }
    }

    /// Every repository in full, in the order the worker lists them.
    ///
    /// The graph is checked here as well as in the worker; an attached
    /// worker may not have run the same validation.
    pub async fn fetch_repositories(&self) -> Result<Vec<Repository>, LocationError> {
        let summaries = self.list_repositories().await?;
        let mut repositories = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let repository = self.get_repository(&summary.name).await?;
            if repository.name != summary.name {
                return Err(LocationError::definition(format!(
                    "asked for repository '{}', worker returned '{}'",
                    summary.name, repository.name
                )));
            }
            repositories.push(repository);
        }
        let errors = harbor_core::structural_errors(&repositories);
        if !errors.is_empty() {
            return Err(LocationError::definition(errors.join("; ")));
        }
        Ok(repositories)
    }

    pub async fn evaluate_schedule(
        &self,
        repository: &str,
        job: &str,
        schedule: &str,
        scheduled_time: DateTime<Utc>,
    ) -> Result<ScheduleEvaluation, LocationError> {
        let request = Request::EvaluateSchedule {
            repository: repository.to_string(),
            job: job.to_string(),
            schedule: schedule.to_string(),
            scheduled_time,
        };
        match self.send(request, self.evaluation_timeout).await? {
            Response::Schedule { result } => Ok(result),
            other => Err(isolation::unexpected_response("Schedule", &other)),
        }
    }

    pub async fn evaluate_sensor(
        &self,
        repository: &str,
        job: &str,
        sensor: &str,
        cursor: Option<String>,
    ) -> Result<SensorEvaluation, LocationError> {
        let request = Request::EvaluateSensor {
            repository: repository.to_string(),
            job: job.to_string(),
            sensor: sensor.to_string(),
            cursor,
        };
        match self.send(request, self.evaluation_timeout).await? {
            Response::Sensor { result } => Ok(result),
            other => Err(isolation::unexpected_response("Sensor", &other)),
        }
    }

    /// Idempotent request, retried on timeout or lost connection.
    async fn read(&self, request: Request) -> Result<Response, LocationError> {
        let mut attempt = 0;
        loop {
            match self.send(request.clone(), self.call_timeout).await {
                Err(e) if e.is_transient() && attempt < self.read_retries => {
                    attempt += 1;
                    tracing::debug!(
                        location = %self.location,
                        kind = request.kind(),
                        attempt,
                        error = %e,
                        "retrying read"
                    );
                }
                result => return result,
            }
        }
    }

    /// One request; worker-reported errors come back as `Err`.
    async fn send(&self, request: Request, timeout: Duration) -> Result<Response, LocationError> {
        match self.handle.call(request, timeout).await {
            Ok(Response::Error { error }) => Err(error.into()),
            Ok(response) => Ok(response),
            Err(e) => Err(isolation::from_call_error(&e)),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
