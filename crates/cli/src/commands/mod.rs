// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subcommands and the shared workspace selection they run against.

pub mod locations;
pub mod repos;
pub mod show;
pub mod tick;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{ArgGroup, Args};
use harbor_adapters::{ProcessWorkerAdapter, TracedWorker, WorkerAdapter};
use harbor_core::{normalize_path, LocationOrigin};
use harbor_workspace::config::DEFAULT_WORKSPACE_FILE;
use harbor_workspace::{ConfigError, RepositoryLocation, Workspace, WorkspaceConfig, WorkspaceSettings};
use tracing::debug;

use crate::exit_error::{self, ExitError};
use crate::output::error_text;

pub type HostSession = Session<TracedWorker<ProcessWorkerAdapter>>;

/// Which locations to load; given before the subcommand
#[derive(Args, Debug, Clone, Default)]
#[command(group(ArgGroup::new("entry").args(["file", "module"])))]
pub struct TargetArgs {
    /// Workspace file (default: ./workspace.toml)
    #[arg(short = 'w', long = "workspace", conflicts_with_all = ["file", "module", "grpc_host"])]
    pub workspace: Option<PathBuf>,

    /// Single definition file
    #[arg(short = 'f', long = "file", conflicts_with = "grpc_host")]
    pub file: Option<PathBuf>,

    /// Single definition module
    #[arg(short = 'm', long = "module", conflicts_with = "grpc_host")]
    pub module: Option<String>,

    /// Working directory for -f / -m
    #[arg(short = 'd', long = "working-directory", requires = "entry")]
    pub working_directory: Option<PathBuf>,

    /// Attach to a running worker at this host
    #[arg(long = "grpc-host", requires = "grpc_port")]
    pub grpc_host: Option<String>,

    #[arg(long = "grpc-port", requires = "grpc_host")]
    pub grpc_port: Option<u16>,
}

/// Workspace file vs. a single location given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    File(PathBuf),
    Single(LocationOrigin),
}

impl TargetArgs {
    /// Resolve flags against `cwd`.
    pub fn selection(&self, cwd: &Path) -> Selection {
        let working_directory = self
            .working_directory
            .as_ref()
            .map(|d| normalize_path(&cwd.join(d)));
        if let Some(file) = &self.file {
            return Selection::Single(LocationOrigin::File {
                path: normalize_path(&cwd.join(file)),
                working_directory,
            });
        }
        if let Some(module) = &self.module {
            return Selection::Single(LocationOrigin::Module {
                name: module.clone(),
                working_directory: Some(working_directory.unwrap_or_else(|| normalize_path(cwd))),
            });
        }
        if let (Some(host), Some(port)) = (&self.grpc_host, self.grpc_port) {
            return Selection::Single(LocationOrigin::grpc(host.clone(), port));
        }
        let path = self
            .workspace
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE_FILE));
        Selection::File(normalize_path(&cwd.join(path)))
    }
}

/// A loaded workspace plus how it was selected
pub struct Session<A: WorkerAdapter> {
    pub workspace: Workspace<A>,
    /// One location from -f / -m / --grpc-*
    pub single: bool,
}

impl HostSession {
    pub async fn open(target: &TargetArgs) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let (config, single) = match target.selection(&cwd) {
            Selection::Single(origin) => (WorkspaceConfig::single(origin, None), true),
            Selection::File(path) => match WorkspaceConfig::load(&path) {
                Ok(config) => (config, false),
                Err(ConfigError::NotFound(path)) => {
                    return Err(ExitError::new(
                        exit_error::WORKSPACE_NOT_FOUND,
                        format!("workspace file not found: {}", path.display()),
                    )
                    .into())
                }
                Err(e) => return Err(e.into()),
            },
        };

        debug!(locations = config.entries().len(), single, "opening workspace");
        let adapter = TracedWorker::new(ProcessWorkerAdapter::from_env());
        let workspace = Workspace::load(config, adapter, WorkspaceSettings::from_env()).await;
        Ok(Self { workspace, single })
    }
}

impl<A: WorkerAdapter> Session<A> {
    pub fn new(workspace: Workspace<A>, single: bool) -> Self {
        Self { workspace, single }
    }

    /// In single-location mode, a failed load fails the command.
    pub fn ensure_single_loaded(&self) -> Result<()> {
        if !self.single {
            return Ok(());
        }
        match self.workspace.locations().into_iter().find(|l| l.is_failed()) {
            Some(location) => Err(location_failed(&location).into()),
            None => Ok(()),
        }
    }

    /// Location `-l` names, which must have loaded.
    pub fn loaded_location(&self, name: &str) -> Result<RepositoryLocation> {
        let location = self
            .workspace
            .location(name)
            .ok_or_else(|| anyhow::anyhow!("unknown location '{}'", name))?;
        if location.snapshot.is_none() {
            return Err(location_failed(&location).into());
        }
        Ok(location)
    }

    /// The location serving `repository`, or the one `-l` names.
    pub fn locate(&self, location: Option<&str>, repository: &str) -> Result<RepositoryLocation> {
        if let Some(name) = location {
            let location = self.loaded_location(name)?;
            if !location.repository_names().contains(&repository) {
                anyhow::bail!("repository '{}' not found in location '{}'", repository, name);
            }
            return Ok(location);
        }

        self.ensure_single_loaded()?;
        let locations = self.workspace.locations();
        let serving: Vec<_> = locations
            .iter()
            .filter(|l| l.repository_names().contains(&repository))
            .collect();
        match serving.as_slice() {
            [one] => Ok((*one).clone()),
            [] => {
                let failed: Vec<_> = locations
                    .iter()
                    .filter(|l| l.is_failed())
                    .map(|l| l.name.as_str())
                    .collect();
                if failed.is_empty() {
                    anyhow::bail!("repository '{}' not found", repository)
                }
                anyhow::bail!(
                    "repository '{}' not found; failed to load: {}",
                    repository,
                    failed.join(", ")
                )
            }
            many => {
                let names: Vec<_> = many.iter().map(|l| l.name.as_str()).collect();
                anyhow::bail!(
                    "repository '{}' is served by several locations ({}); pick one with -l",
                    repository,
                    names.join(", ")
                )
            }
        }
    }
}

fn location_failed(location: &RepositoryLocation) -> ExitError {
    let reason = location
        .error
        .as_ref()
        .map(error_text)
        .unwrap_or_else(|| "not loaded".to_string());
    ExitError::new(
        exit_error::LOCATION_FAILED,
        format!("location '{}' failed to load: {}", location.name, reason),
    )
}

#[cfg(test)]
#[path = "test_fixtures.rs"]
pub(crate) mod fixtures;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
