// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Worker process: loads one location's definitions and serves the
//! protocol over a Unix socket or TCP.

pub mod env;
pub mod evaluate;
pub mod handler;
pub mod loader;
pub mod logging;
pub mod protocol;
pub mod server;
mod user_command;

pub use evaluate::EvalContext;
pub use handler::Handler;
pub use loader::EntryPoint;
pub use logging::{LogFormat, WorkerLogConfig};
pub use protocol::{Envelope, ProtocolError, Request, Response, WireError, PROTOCOL_VERSION};
pub use server::{BindAddr, Server};

/// Line printed on stdout once the worker accepts connections
pub const READY_LINE: &str = "READY";
