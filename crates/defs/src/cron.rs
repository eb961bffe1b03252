// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Five-field cron expressions (UTC, minute resolution)
//!
//! Supports `*`, ranges (`1-5`), steps (`*/15`, `0-30/10`, `5/20`), lists,
//! month and weekday names, and the `@hourly`/`@daily`/`@midnight`/
//! `@weekly`/`@monthly`/`@yearly`/`@annually` shorthands. When both
//! day-of-month and day-of-week are restricted, a day matching either
//! one fires (classic cron semantics).

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CronError {
    #[error("expected 5 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid {field} field '{value}': {reason}")]
    Field {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("unknown shorthand '{0}'")]
    Shorthand(String),
}

struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
    names: &'static [&'static str],
}

const MINUTE: FieldSpec = FieldSpec {
    name: "minute",
    min: 0,
    max: 59,
    names: &[],
};
const HOUR: FieldSpec = FieldSpec {
    name: "hour",
    min: 0,
    max: 23,
    names: &[],
};
const DAY_OF_MONTH: FieldSpec = FieldSpec {
    name: "day-of-month",
    min: 1,
    max: 31,
    names: &[],
};
const MONTH: FieldSpec = FieldSpec {
    name: "month",
    min: 1,
    max: 12,
    names: &[
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ],
};
// 7 is accepted as an alias for Sunday and folded into 0
const DAY_OF_WEEK: FieldSpec = FieldSpec {
    name: "day-of-week",
    min: 0,
    max: 7,
    names: &["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"],
};

/// Upper bound on search steps in [`CronSchedule::next_after`]
const MAX_SEARCH_STEPS: usize = 100_000;

/// A parsed cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    source: String,
    minutes: u64,
    hours: u64,
    days_of_month: u64,
    months: u64,
    days_of_week: u64,
    dom_restricted: bool,
    dow_restricted: bool,
}

impl CronSchedule {
    pub fn parse(expr: &str) -> Result<Self, CronError> {
        let trimmed = expr.trim();
        let expanded = if trimmed.starts_with('@') {
            match trimmed {
                "@hourly" => "0 * * * *",
                "@daily" | "@midnight" => "0 0 * * *",
                "@weekly" => "0 0 * * 0",
                "@monthly" => "0 0 1 * *",
                "@yearly" | "@annually" => "0 0 1 1 *",
                other => return Err(CronError::Shorthand(other.to_string())),
            }
        } else {
            trimmed
        };

        let fields: Vec<&str> = expanded.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(CronError::FieldCount(fields.len()));
        }

        let minutes = parse_field(&MINUTE, fields[0])?;
        let hours = parse_field(&HOUR, fields[1])?;
        let days_of_month = parse_field(&DAY_OF_MONTH, fields[2])?;
        let months = parse_field(&MONTH, fields[3])?;
        let mut days_of_week = parse_field(&DAY_OF_WEEK, fields[4])?;
        if days_of_week & (1 << 7) != 0 {
            days_of_week = (days_of_week & !(1 << 7)) | 1;
        }

        Ok(Self {
            source: trimmed.to_string(),
            minutes,
            hours,
            days_of_month,
            months,
            days_of_week,
            dom_restricted: !fields[2].starts_with('*'),
            dow_restricted: !fields[4].starts_with('*'),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `time` falls on a tick (seconds are ignored).
    pub fn matches(&self, time: &DateTime<Utc>) -> bool {
        bit(self.minutes, time.minute())
            && bit(self.hours, time.hour())
            && bit(self.months, time.month())
            && self.day_matches(time.date_naive())
    }

    /// First tick strictly after `time`.
    ///
    /// Returns `None` for expressions that never fire (e.g. `0 0 30 2 *`).
    pub fn next_after(&self, time: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut candidate = truncate_to_minute(time)? + Duration::minutes(1);

        for _ in 0..MAX_SEARCH_STEPS {
            if !bit(self.months, candidate.month()) {
                candidate = first_of_next_month(&candidate)?;
                continue;
            }
            if !self.day_matches(candidate.date_naive()) {
                candidate = midnight(candidate.date_naive().succ_opt()?);
                continue;
            }
            if !bit(self.hours, candidate.hour()) {
                candidate = candidate.with_minute(0)? + Duration::hours(1);
                continue;
            }
            if !bit(self.minutes, candidate.minute()) {
                candidate += Duration::minutes(1);
                continue;
            }
            return Some(candidate);
        }
        None
    }

    /// Latest tick at or before `time`.
    pub fn latest_at_or_before(&self, time: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut candidate = truncate_to_minute(time)?;

        for _ in 0..MAX_SEARCH_STEPS {
            if !bit(self.months, candidate.month()) {
                candidate = midnight(candidate.date_naive().with_day(1)?) - Duration::minutes(1);
                continue;
            }
            if !self.day_matches(candidate.date_naive()) {
                candidate = midnight(candidate.date_naive()) - Duration::minutes(1);
                continue;
            }
            if !bit(self.hours, candidate.hour()) {
                candidate = candidate.with_minute(0)? - Duration::minutes(1);
                continue;
            }
            if !bit(self.minutes, candidate.minute()) {
                candidate -= Duration::minutes(1);
                continue;
            }
            return Some(candidate);
        }
        None
    }

    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = bit(self.days_of_month, date.day());
        let dow = bit(self.days_of_week, date.weekday().num_days_from_sunday());
        if self.dom_restricted && self.dow_restricted {
            dom || dow
        } else {
            dom && dow
        }
    }
}

impl std::fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn bit(mask: u64, value: u32) -> bool {
    value < 64 && mask & (1u64 << value) != 0
}

fn parse_field(spec: &FieldSpec, text: &str) -> Result<u64, CronError> {
    let err = |reason: String| CronError::Field {
        field: spec.name,
        value: text.to_string(),
        reason,
    };

    let mut mask = 0u64;
    for part in text.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => {
                let step: u32 = step
                    .parse()
                    .map_err(|_| err(format!("invalid step '{}'", step)))?;
                if step == 0 {
                    return Err(err("step must be positive".to_string()));
                }
                (range, Some(step))
            }
            None => (part, None),
        };

        let (lo, hi) = if range == "*" {
            (spec.min, spec.max)
        } else if let Some((a, b)) = range.split_once('-') {
            (field_value(spec, a).map_err(&err)?, field_value(spec, b).map_err(&err)?)
        } else {
            let v = field_value(spec, range).map_err(&err)?;
            // "5/20" means "from 5 through max, every 20"
            if step.is_some() {
                (v, spec.max)
            } else {
                (v, v)
            }
        };

        if lo > hi {
            return Err(err(format!("range {}-{} is reversed", lo, hi)));
        }

        let step = step.unwrap_or(1);
        let mut v = lo;
        while v <= hi {
            mask |= 1u64 << v;
            v += step;
        }
    }
    Ok(mask)
}

fn field_value(spec: &FieldSpec, text: &str) -> Result<u32, String> {
    if let Ok(v) = text.parse::<u32>() {
        if v < spec.min || v > spec.max {
            return Err(format!(
                "{} out of range {}-{}",
                v, spec.min, spec.max
            ));
        }
        return Ok(v);
    }
    let upper = text.to_ascii_uppercase();
    spec.names
        .iter()
        .position(|n| *n == upper)
        .map(|idx| idx as u32 + if spec.min == 1 { 1 } else { 0 })
        .ok_or_else(|| format!("unknown value '{}'", text))
}

fn truncate_to_minute(time: &DateTime<Utc>) -> Option<DateTime<Utc>> {
    time.with_second(0)?.with_nanosecond(0)
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

fn first_of_next_month(time: &DateTime<Utc>) -> Option<DateTime<Utc>> {
    let (year, month) = if time.month() == 12 {
        (time.year() + 1, 1)
    } else {
        (time.year(), time.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).map(midnight)
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
