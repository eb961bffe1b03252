// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable durations for sensor intervals and timeouts

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("invalid number in duration '{0}'")]
    Number(String),
    #[error("unknown duration unit '{unit}' in '{input}'")]
    Unit { input: String, unit: String },
}

/// Parse `"30s"`, `"5m"`, `"250ms"`, `"2h"`, `"1d"`. A bare number is seconds.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(DurationError::Empty);
    }

    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, unit) = text.split_at(split);

    let value: u64 = digits
        .parse()
        .map_err(|_| DurationError::Number(text.to_string()))?;

    let seconds_per_unit = match unit.trim() {
        "ms" | "millis" | "milliseconds" => return Ok(Duration::from_millis(value)),
        "" | "s" | "sec" | "secs" | "seconds" => 1,
        "m" | "min" | "mins" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hours" => 3_600,
        "d" | "day" | "days" => 86_400,
        other => {
            return Err(DurationError::Unit {
                input: text.to_string(),
                unit: other.to_string(),
            })
        }
    };

    Ok(Duration::from_secs(value.saturating_mul(seconds_per_unit)))
}
