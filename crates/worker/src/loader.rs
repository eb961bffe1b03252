// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolving and loading the worker's entry point

use std::path::{Path, PathBuf};

use harbor_core::{LocationError, Repository};
use harbor_defs::{load_definitions, module_search_dirs, resolve_module, LoadError};

/// What the worker was asked to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPoint {
    File(PathBuf),
    Module(String),
}

impl std::fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryPoint::File(path) => write!(f, "file {}", path.display()),
            EntryPoint::Module(name) => write!(f, "module {}", name),
        }
    }
}

/// Load and validate the entry point's definitions.
///
/// Relative files resolve against `working_dir`; modules are searched in
/// `working_dir` then `module_path`.
pub fn load(
    entry: &EntryPoint,
    working_dir: &Path,
    module_path: Option<&str>,
) -> Result<Vec<Repository>, LocationError> {
    let path = match entry {
        EntryPoint::File(path) => working_dir.join(path),
        EntryPoint::Module(name) => {
            let dirs = module_search_dirs(working_dir, module_path);
            resolve_module(name, &dirs).map_err(LoadError::from)?
        }
    };
    Ok(load_definitions(&path)?)
}
