// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

// =============================================================================
// parsing
// =============================================================================

#[yare::parameterized(
    every_minute = { "* * * * *" },
    nightly = { "0 0 * * *" },
    stepped = { "*/15 * * * *" },
    ranged_step = { "0-30/10 9-17 * * 1-5" },
    lists = { "0,30 8,20 1,15 * *" },
    names = { "0 12 * JAN-MAR mon,Wed,FRI" },
    sunday_seven = { "0 0 * * 7" },
    start_step = { "5/20 * * * *" },
    hourly = { "@hourly" },
    annually = { "@annually" },
)]
fn parses_valid_expressions(expr: &str) {
    assert!(CronSchedule::parse(expr).is_ok(), "failed: {}", expr);
}

#[yare::parameterized(
    too_few = { "0 0 * *" },
    too_many = { "0 0 * * * *" },
    minute_out_of_range = { "60 * * * *" },
    zero_day = { "0 0 0 * *" },
    zero_step = { "*/0 * * * *" },
    reversed = { "30-10 * * * *" },
    bad_name = { "0 0 * FOO *" },
    bad_macro = { "@fortnightly" },
    empty = { "" },
)]
fn rejects_invalid_expressions(expr: &str) {
    assert!(CronSchedule::parse(expr).is_err(), "accepted: {}", expr);
}

#[test]
fn field_error_names_the_field() {
    let err = CronSchedule::parse("0 25 * * *").unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid hour field '25': 25 out of range 0-23"
    );
}

#[test]
fn field_count_error() {
    assert_eq!(
        CronSchedule::parse("* *").unwrap_err(),
        CronError::FieldCount(2)
    );
}

#[test]
fn display_keeps_source_text() {
    let cron = CronSchedule::parse("  @daily ").unwrap();
    assert_eq!(cron.to_string(), "@daily");
}

// =============================================================================
// matching
// =============================================================================

#[test]
fn matches_ignores_seconds() {
    let cron = CronSchedule::parse("30 14 * * *").unwrap();
    assert!(cron.matches(&at("2026-03-01T14:30:00Z")));
    assert!(cron.matches(&at("2026-03-01T14:30:59Z")));
    assert!(!cron.matches(&at("2026-03-01T14:31:00Z")));
}

#[test]
fn sunday_as_seven_matches_sunday() {
    let cron = CronSchedule::parse("0 0 * * 7").unwrap();
    // 2026-03-01 is a Sunday
    assert!(cron.matches(&at("2026-03-01T00:00:00Z")));
    assert!(!cron.matches(&at("2026-03-02T00:00:00Z")));
}

#[test]
fn restricted_dom_and_dow_match_either() {
    let cron = CronSchedule::parse("0 0 13 * FRI").unwrap();
    // Friday the 6th
    assert!(cron.matches(&at("2026-03-06T00:00:00Z")));
    // Tuesday the 13th? 2026-01-13 is a Tuesday
    assert!(cron.matches(&at("2026-01-13T00:00:00Z")));
    // Wednesday the 4th
    assert!(!cron.matches(&at("2026-03-04T00:00:00Z")));
}

#[test]
fn unrestricted_dow_requires_dom() {
    let cron = CronSchedule::parse("0 0 1 * *").unwrap();
    assert!(cron.matches(&at("2026-04-01T00:00:00Z")));
    assert!(!cron.matches(&at("2026-04-02T00:00:00Z")));
}

// =============================================================================
// next_after
// =============================================================================

#[yare::parameterized(
    next_minute = { "* * * * *", "2026-03-01T10:00:30Z", "2026-03-01T10:01:00Z" },
    later_today = { "0 12 * * *", "2026-03-01T10:00:00Z", "2026-03-01T12:00:00Z" },
    tomorrow = { "0 0 * * *", "2026-03-01T00:00:00Z", "2026-03-02T00:00:00Z" },
    quarter_hour = { "*/15 * * * *", "2026-03-01T10:07:00Z", "2026-03-01T10:15:00Z" },
    year_rollover = { "0 0 1 1 *", "2026-06-15T08:00:00Z", "2027-01-01T00:00:00Z" },
    weekday = { "0 9 * * MON", "2026-03-01T10:00:00Z", "2026-03-02T09:00:00Z" },
    leap_day = { "0 0 29 2 *", "2026-03-01T00:00:00Z", "2028-02-29T00:00:00Z" },
)]
fn next_after_finds_following_tick(expr: &str, from: &str, expected: &str) {
    let cron = CronSchedule::parse(expr).unwrap();
    assert_eq!(cron.next_after(&at(from)), Some(at(expected)));
}

#[test]
fn next_after_is_strictly_later() {
    let cron = CronSchedule::parse("0 0 * * *").unwrap();
    let tick = at("2026-03-01T00:00:00Z");
    let next = cron.next_after(&tick).unwrap();
    assert!(next > tick);
    assert!(cron.matches(&next));
}

#[test]
fn impossible_date_never_fires() {
    let cron = CronSchedule::parse("0 0 30 2 *").unwrap();
    assert_eq!(cron.next_after(&at("2026-01-01T00:00:00Z")), None);
}

#[yare::parameterized(
    on_tick = { "0 0 * * *", "2026-03-01T00:00:00Z", "2026-03-01T00:00:00Z" },
    seconds_ignored = { "* * * * *", "2026-03-01T10:00:30Z", "2026-03-01T10:00:00Z" },
    earlier_today = { "0 0 * * *", "2026-03-01T15:42:00Z", "2026-03-01T00:00:00Z" },
    previous_hour = { "30 * * * *", "2026-03-01T10:10:00Z", "2026-03-01T09:30:00Z" },
    last_month = { "0 6 15 * *", "2026-03-01T00:00:00Z", "2026-02-15T06:00:00Z" },
    last_year = { "0 0 1 12 *", "2026-03-01T00:00:00Z", "2025-12-01T00:00:00Z" },
    weekday = { "0 9 * * MON", "2026-03-01T10:00:00Z", "2026-02-23T09:00:00Z" },
)]
fn latest_at_or_before_finds_preceding_tick(expr: &str, from: &str, expected: &str) {
    let cron = CronSchedule::parse(expr).unwrap();
    assert_eq!(cron.latest_at_or_before(&at(from)), Some(at(expected)));
}
