// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus-gated frame clock.
//!
//! [`FrameClock`] turns host timestamps into the elapsed milliseconds handed
//! to each step. While the owning group has lost input focus the clock is
//! frozen: [`tick`](FrameClock::tick) is simply not called, and on refocus
//! [`resync`](FrameClock::resync) moves the reference point to the focus
//! time so the first cycle afterwards does not see the whole unfocused gap.

use crate::time::{HostTime, Timebase};

/// Tracks the host time of the previous cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameClock {
    last: Option<HostTime>,
}

impl FrameClock {
    /// Creates a clock with no reference point.
    ///
    /// The first [`tick`](Self::tick) reports zero elapsed time.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Creates a clock whose reference point is `now`.
    #[must_use]
    pub const fn starting_at(now: HostTime) -> Self {
        Self { last: Some(now) }
    }

    /// Returns the host time of the previous tick or resync, if any.
    #[must_use]
    pub const fn last(&self) -> Option<HostTime> {
        self.last
    }

    /// Advances the reference point to `now` and returns the elapsed
    /// milliseconds since the previous reference point.
    ///
    /// Timestamps older than the reference point yield zero.
    pub fn tick(&mut self, now: HostTime, timebase: Timebase) -> f64 {
        let elapsed = match self.last {
            Some(last) => now.saturating_duration_since(last).as_millis_f64(timebase),
            None => 0.0,
        };
        self.last = Some(now);
        elapsed
    }

    /// Moves the reference point to `now` without reporting elapsed time.
    pub fn resync(&mut self, now: HostTime) {
        self.last = Some(now);
    }
}
