// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request handling against a worker's loaded definitions.

use std::sync::Arc;

use harbor_core::{LocationError, LocationErrorKind, Repository};
use tokio::sync::Notify;
use tracing::Instrument;

use crate::evaluate::{evaluate_schedule, evaluate_sensor, EvalContext};
use crate::protocol::{Request, Response, PROTOCOL_VERSION};

/// Serves requests for one location.
///
/// A failed load is kept and reported on every definition request; the
/// worker stays up so the host can tell an import failure from a crash.
pub struct Handler {
    worker_id: String,
    location: String,
    definitions: Result<Vec<Repository>, LocationError>,
    eval: EvalContext,
    shutdown: Arc<Notify>,
}

impl Handler {
    pub fn new(
        worker_id: impl Into<String>,
        location: impl Into<String>,
        definitions: Result<Vec<Repository>, LocationError>,
        eval: EvalContext,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            location: location.into(),
            definitions,
            eval,
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Notified when a `Shutdown` request arrives.
    pub fn shutdown_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    pub async fn handle(&self, request: Request) -> Response {
        let span = tracing::info_span!("request", location = %self.location, kind = request.kind());
        self.dispatch(request).instrument(span).await
    }

    async fn dispatch(&self, request: Request) -> Response {
        match request {
            Request::Hello { version, host } => {
                if version != PROTOCOL_VERSION {
                    tracing::warn!(%host, version, "rejecting handshake");
                    return Response::error(
                        LocationErrorKind::ProtocolVersionMismatch,
                        format!(
                            "worker speaks protocol {}, host sent {}",
                            PROTOCOL_VERSION, version
                        ),
                    );
                }
                tracing::debug!(%host, "handshake");
                Response::Hello {
                    version: PROTOCOL_VERSION,
                    worker_id: self.worker_id.clone(),
                    pid: std::process::id(),
                }
            }

            Request::Ping => Response::Pong,

            Request::ListRepositories => match &self.definitions {
                Ok(repos) => Response::Repositories {
                    repositories: repos.iter().map(Repository::summary).collect(),
                },
                Err(e) => Response::Error { error: e.clone().into() },
            },

            Request::GetRepository { name } => match self.repository(&name) {
                Ok(repo) => Response::Repository {
                    repository: Box::new(repo.clone()),
                },
                Err(e) => Response::Error { error: e.into() },
            },

            Request::EvaluateSchedule {
                repository,
                job,
                schedule,
                scheduled_time,
            } => {
                let found = self.repository(&repository).and_then(|repo| {
                    repo.schedule(&schedule).ok_or_else(|| {
                        unknown(format!("schedule '{}' in repository '{}'", schedule, repository))
                    })
                });
                let definition = match found {
                    Ok(definition) => definition,
                    Err(e) => return Response::Error { error: e.into() },
                };
                let result = evaluate_schedule(&self.eval, definition, &job, scheduled_time)
                    .instrument(tracing::info_span!("schedule", %repository, %schedule))
                    .await;
                tracing::info!(%repository, %schedule, outcome = outcome_name(&result), "evaluated schedule");
                Response::Schedule { result }
            }

            Request::EvaluateSensor {
                repository,
                job,
                sensor,
                cursor,
            } => {
                let found = self.repository(&repository).and_then(|repo| {
                    repo.sensor(&sensor).ok_or_else(|| {
                        unknown(format!("sensor '{}' in repository '{}'", sensor, repository))
                    })
                });
                let definition = match found {
                    Ok(definition) => definition,
                    Err(e) => return Response::Error { error: e.into() },
                };
                let result = evaluate_sensor(&self.eval, definition, &job, cursor.as_deref())
                    .instrument(tracing::info_span!("sensor", %repository, %sensor))
                    .await;
                tracing::info!(
                    %repository,
                    %sensor,
                    run_requests = result.run_requests().len(),
                    "evaluated sensor"
                );
                Response::Sensor { result }
            }

            Request::Shutdown => {
                tracing::info!("shutdown requested");
                self.shutdown.notify_one();
                Response::ShuttingDown
            }
        }
    }

    fn repository(&self, name: &str) -> Result<&Repository, LocationError> {
        let repos = self.definitions.as_ref().map_err(Clone::clone)?;
        repos
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| unknown(format!("repository '{}'", name)))
    }
}

fn unknown(what: String) -> LocationError {
    LocationError::definition(format!("unknown {}", what))
}

fn outcome_name(result: &harbor_core::ScheduleEvaluation) -> &'static str {
    match result {
        harbor_core::ScheduleEvaluation::RunRequests { .. } => "run_requests",
        harbor_core::ScheduleEvaluation::Skip { .. } => "skip",
        harbor_core::ScheduleEvaluation::Error { .. } => "error",
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
