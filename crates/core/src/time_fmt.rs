// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time formatting shared by records, tags and progress output.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Format of `Snapshot::date_time` and of the snapshot tag value
pub const DATE_TIME_FORMAT: &str = "%Y/%m/%d_%H:%M:%S";

/// Format a UTC timestamp the way snapshot records and tags store it.
pub fn format_date_time(at: DateTime<Utc>) -> String {
    at.format(DATE_TIME_FORMAT).to_string()
}

/// Format a wait duration as a compact string ("45s", "2m 5s", "1h 3m").
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        let s = secs % 60;
        if s == 0 {
            format!("{}m", secs / 60)
        } else {
            format!("{}m {}s", secs / 60, s)
        }
    } else {
        let m = (secs % 3600) / 60;
        if m == 0 {
            format!("{}h", secs / 3600)
        } else {
            format!("{}h {}m", secs / 3600, m)
        }
    }
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
