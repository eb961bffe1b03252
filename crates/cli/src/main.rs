// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! harbor - repository location host CLI

mod color;
mod commands;
mod env;
mod exit_error;
mod output;
mod table;

use std::io::{IsTerminal, Write};

use anyhow::Result;
use clap::{Arg, ArgAction, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::show::ShowArgs;
use commands::tick::{TickScheduleArgs, TickSensorArgs};
use commands::{locations, repos, show, tick, HostSession, Session, TargetArgs};
use harbor_adapters::WorkerAdapter;
use output::OutputFormat;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "harbor",
    version,
    disable_version_flag = true,
    about = "Load repository locations in isolated workers and inspect them",
    styles = color::styles()
)]
struct Cli {
    /// Output format
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        default_value_t,
        global = true
    )]
    output: OutputFormat,

    #[command(flatten)]
    target: TargetArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List locations with their load status
    Locations,
    /// List repositories across loaded locations
    Repos(ReposArgs),
    /// Show one repository's jobs, schedules and sensors
    Show(ShowArgs),
    /// Evaluate one schedule tick
    TickSchedule(TickScheduleArgs),
    /// Evaluate one sensor tick
    TickSensor(TickSensorArgs),
}

#[derive(Args, Debug, Clone)]
struct ReposArgs {
    /// Only this location
    #[arg(short = 'l', long = "location")]
    location: Option<String>,
}

/// Clap command with `-v`/`--version` (and a hidden `-V`)
fn cli_command() -> clap::Command {
    Cli::command()
        .arg(
            Arg::new("version")
                .short('v')
                .long("version")
                .action(ArgAction::Version)
                .help("Print version"),
        )
        .arg(
            Arg::new("version-upper")
                .short('V')
                .action(ArgAction::Version)
                .hide(true),
        )
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e
            .downcast_ref::<exit_error::ExitError>()
            .map_or(exit_error::GENERAL, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains every source message, the
/// "Caused by" chain is skipped.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

/// Log to stderr, filtered by `HARBOR_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_new(env::log_filter()).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!env::no_color() && std::io::stderr().is_terminal())
        .try_init();
}

async fn run() -> Result<()> {
    let matches = cli_command().get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let Some(command) = cli.command else {
        cli_command().print_help()?;
        println!();
        return Ok(());
    };

    init_logging();
    let session = HostSession::open(&cli.target).await?;
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr();
    let result = dispatch(&session, command, cli.output, &mut stdout, &mut stderr).await;
    stdout.flush()?;
    session.workspace.shutdown().await;
    result
}

async fn dispatch<A: WorkerAdapter>(
    session: &Session<A>,
    command: Commands,
    format: OutputFormat,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::Locations => locations::run(session, format, out),
        Commands::Repos(args) => repos::run(session, args.location.as_deref(), format, out, err),
        Commands::Show(args) => show::run(session, &args, format, out).await,
        Commands::TickSchedule(args) => tick::schedule(session, &args, format, out).await,
        Commands::TickSensor(args) => tick::sensor(session, &args, format, out).await,
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
