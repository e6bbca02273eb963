// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded exponential backoff.
//!
//! Used for every wait on the cloud control plane (clone completion,
//! instance termination, instance start) and for retrying transient API
//! errors. The sum of all delays never exceeds `deadline`.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    pub multiplier: u32,
    pub deadline: Duration,
}

impl Backoff {
    pub const fn new(initial: Duration, max: Duration, deadline: Duration) -> Self {
        Self { initial, max, multiplier: 2, deadline }
    }

    crate::setters! {
        set {
            initial: Duration,
            max: Duration,
            multiplier: u32,
            deadline: Duration,
        }
    }

    /// The successive delays to sleep between attempts.
    pub fn delays(&self) -> Delays {
        Delays {
            next: self.initial.min(self.max),
            max: self.max,
            multiplier: self.multiplier.max(1),
            remaining: self.deadline,
        }
    }
}

impl Default for Backoff {
    /// 5s doubling up to 30s, for at most 20 minutes.
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(30), Duration::from_secs(20 * 60))
    }
}

/// Iterator over backoff delays; ends once the deadline budget is spent.
#[derive(Debug, Clone)]
pub struct Delays {
    next: Duration,
    max: Duration,
    multiplier: u32,
    remaining: Duration,
}

impl Iterator for Delays {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining.is_zero() || self.next.is_zero() {
            return None;
        }
        let delay = self.next.min(self.remaining);
        self.remaining -= delay;
        self.next = self.next.saturating_mul(self.multiplier).min(self.max);
        Some(delay)
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
