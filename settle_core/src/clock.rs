// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time sources for the canvas.
//!
//! A canvas reads one [`TimeSource`] for both its high-resolution perf
//! timings ([`TimeSource::now`]) and the coarse per-frame stamp
//! ([`TimeSource::frame_time`]). Two implementations are provided:
//!
//! - [`MonotonicClock`] reads [`std::time::Instant`], with its origin at
//!   construction.
//! - [`ManualClock`] only moves when told to. Clones share the same time, so
//!   a test or an offline exporter can keep a handle and step frames
//!   deterministically.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::time::{Duration, FrameTime, HostTime, Timebase};

/// A monotonic clock shared by a canvas and everything it animates.
pub trait TimeSource: Send + Sync + core::fmt::Debug {
    /// Current time in ticks since this clock's origin.
    fn now(&self) -> HostTime;

    /// Conversion factor from this clock's ticks to nanoseconds.
    fn timebase(&self) -> Timebase;

    /// Current time in whole milliseconds since the origin.
    fn frame_time(&self) -> FrameTime {
        self.now().to_frame_time(self.timebase())
    }
}

/// Wall-clock monotonic time backed by [`Instant`], in nanosecond ticks.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Starts a clock whose origin is now.
    #[must_use]
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::start()
    }
}

impl TimeSource for MonotonicClock {
    fn now(&self) -> HostTime {
        let nanos = self.origin.elapsed().as_nanos();
        HostTime(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    fn timebase(&self) -> Timebase {
        Timebase::NANOS
    }
}

/// A clock that only advances when asked, in nanosecond ticks.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock at its origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `millis` milliseconds.
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis, Timebase::NANOS));
    }

    /// Moves the clock forward by `duration` ticks.
    pub fn advance(&self, duration: Duration) {
        self.nanos.fetch_add(duration.ticks(), Ordering::Relaxed);
    }

    /// Sets the clock to an absolute time.
    pub fn set(&self, time: HostTime) {
        self.nanos.store(time.ticks(), Ordering::Relaxed);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> HostTime {
        HostTime(self.nanos.load(Ordering::Relaxed))
    }

    fn timebase(&self) -> Timebase {
        Timebase::NANOS
    }
}
