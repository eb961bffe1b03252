// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Definition files: parsing, validation and module lookup

mod cron;
mod duration;
mod find;
mod parser;
mod template;
mod validate;

pub use cron::{CronError, CronSchedule};
pub use duration::{parse_duration, DurationError};
pub use find::{module_search_dirs, resolve_module, FindError};
pub use parser::{
    format_for_path, load_definitions, parse_definitions, DefinitionFile, Format, LoadError,
    ParseError,
};
pub use template::{interpolate, interpolate_value};
pub use validate::validate_repositories;
