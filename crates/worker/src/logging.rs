// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker log capture configuration.
//!
//! The host decides what a worker logs and passes it on the command line;
//! the worker never reads ambient logging configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

/// What a worker captures and how it writes it to stderr
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerLogConfig {
    /// Level for captured targets (`error` .. `trace`)
    pub level: String,
    /// Targets logged at `level`; everything else only at `warn`.
    /// Empty means every target is logged at `level`.
    #[serde(default)]
    pub capture: Vec<String>,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for WorkerLogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            capture: Vec::new(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid log filter '{directives}': {source}")]
    Filter {
        directives: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("failed to install log subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

impl WorkerLogConfig {
    /// Command-line flags for `harbor-worker`.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["--log-level".to_string(), self.level.clone()];
        if !self.capture.is_empty() {
            args.push("--log-capture".to_string());
            args.push(self.capture.join(","));
        }
        args.push("--log-format".to_string());
        args.push(self.format.as_str().to_string());
        args
    }

    /// Filter directives, e.g. `warn,harbor_worker=debug`.
    pub fn directives(&self) -> String {
        if self.capture.is_empty() {
            return self.level.clone();
        }
        let mut parts = vec!["warn".to_string()];
        parts.extend(self.capture.iter().map(|t| format!("{}={}", t, self.level)));
        parts.join(",")
    }

    pub fn env_filter(&self) -> Result<tracing_subscriber::EnvFilter, LogError> {
        let directives = self.directives();
        tracing_subscriber::EnvFilter::try_new(&directives).map_err(|source| LogError::Filter {
            directives,
            source,
        })
    }

    /// Install the global subscriber, writing to stderr through a
    /// non-blocking writer. Keep the guard alive until exit.
    pub fn init(&self) -> Result<WorkerGuard, LogError> {
        use tracing_subscriber::{fmt, prelude::*};

        let filter = self.env_filter()?;
        let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

        let (text, json) = match self.format {
            LogFormat::Text => (Some(fmt::layer().with_ansi(false).with_writer(writer)), None),
            LogFormat::Json => (None, Some(fmt::layer().json().with_writer(writer))),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(text)
            .with(json)
            .try_init()?;

        Ok(guard)
    }
}
