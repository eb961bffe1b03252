// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `${var}` interpolation for run config templates

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Matches `${name}`; names are identifiers
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("constant regex pattern is valid")
});

/// Replace `${name}` placeholders with values from `vars`.
///
/// Unknown variables are left as-is.
pub fn interpolate(template: &str, vars: &HashMap<String, String>) -> String {
    VAR_PATTERN
        .replace_all(template, |caps: &regex::Captures| match vars.get(&caps[1]) {
            Some(val) => val.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Interpolate every string leaf of a JSON value (keys are untouched).
pub fn interpolate_value(value: &serde_json::Value, vars: &HashMap<String, String>) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::String(s) => Value::String(interpolate(s, vars)),
        Value::Array(items) => Value::Array(items.iter().map(|v| interpolate_value(v, vars)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), interpolate_value(v, vars)))
                .collect(),
        ),
        other => other.clone(),
    }
}
