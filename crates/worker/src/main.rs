// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Harbor worker (harbor-worker)
//!
//! Spawned by the host for one repository location, or run by hand and
//! attached to over TCP. Loads the entry point, binds, prints `READY`,
//! and serves until `Shutdown` or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgGroup, Parser};
use harbor_core::{IdGen, UuidIdGen};
use harbor_worker::{
    env, loader, BindAddr, EntryPoint, EvalContext, Handler, LogFormat, Server, WorkerLogConfig,
    READY_LINE,
};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "harbor-worker", version, about = "Harbor repository location worker")]
#[command(group(ArgGroup::new("entry").required(true).args(["file", "module"])))]
#[command(group(ArgGroup::new("listen").required(true).args(["socket", "port"])))]
struct Args {
    /// Definition file to load
    #[arg(long)]
    file: Option<PathBuf>,

    /// Dotted module name resolved on the search path
    #[arg(long)]
    module: Option<String>,

    /// Directory user commands run in and relative paths resolve against
    #[arg(long = "working-directory")]
    working_directory: Option<PathBuf>,

    /// Unix socket to listen on
    #[arg(long)]
    socket: Option<PathBuf>,

    /// TCP port to listen on (0 picks one)
    #[arg(long)]
    port: Option<u16>,

    /// TCP bind address
    #[arg(long, default_value = "127.0.0.1", requires = "port")]
    host: String,

    /// Location name used in logs
    #[arg(long, default_value = "default")]
    location: String,

    #[arg(long = "log-level", default_value = "info")]
    log_level: String,

    /// Comma-separated targets to capture at --log-level
    #[arg(long = "log-capture", value_delimiter = ',')]
    log_capture: Vec<String>,

    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_config = WorkerLogConfig {
        level: args.log_level.clone(),
        capture: args.log_capture.clone(),
        format: args.log_format,
    };
    let log_guard = log_config.init()?;

    let working_dir = match &args.working_directory {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let entry = match (&args.file, &args.module) {
        (Some(file), _) => EntryPoint::File(file.clone()),
        (None, Some(module)) => EntryPoint::Module(module.clone()),
        (None, None) => return Err("one of --file or --module is required".into()),
    };
    let bind = match (&args.socket, args.port) {
        (Some(path), _) => BindAddr::Unix(path.clone()),
        (None, Some(port)) => BindAddr::Tcp {
            host: args.host.clone(),
            port,
        },
        (None, None) => return Err("one of --socket or --port is required".into()),
    };

    let module_path = env::module_path();
    let definitions = loader::load(&entry, &working_dir, module_path.as_deref());
    match &definitions {
        Ok(repos) => info!(location = %args.location, %entry, repositories = repos.len(), "definitions loaded"),
        Err(e) => warn!(location = %args.location, %entry, error = %e, "definitions failed to load"),
    }

    let handler = Arc::new(Handler::new(
        UuidIdGen.next(),
        args.location.clone(),
        definitions,
        EvalContext {
            working_dir,
            command_timeout: env::user_command_timeout(),
        },
    ));
    let shutdown = handler.shutdown_signal();

    let server = match Server::bind(&bind).await {
        Ok(server) => server,
        Err(e) => {
            error!(location = %args.location, "failed to bind {:?}: {}", bind, e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(location = %args.location, worker_id = %handler.worker_id(), "listening on {}", server.local_addr());

    // Signal ready for the host waiting on our stdout
    match &bind {
        BindAddr::Unix(_) => println!("{}", READY_LINE),
        BindAddr::Tcp { .. } => println!("{} {}", READY_LINE, server.local_addr()),
    }

    tokio::select! {
        _ = server.run(Arc::clone(&handler)) => {}
        _ = shutdown.notified() => info!("shutting down on request"),
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    if let Some(path) = server.socket_path() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("failed to remove socket {}: {}", path.display(), e);
        }
    }

    drop(log_guard);
    Ok(())
}
