// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic tick time, tick durations, and the per-frame millisecond stamp.
//!
//! Three units are in play:
//!
//! - [`HostTime`]: a point on a clock's high-resolution tick axis, counted
//!   from the clock's origin (canvas creation for [`MonotonicClock`]).
//! - [`Duration`]: a span in the same ticks, used for perf samples.
//! - [`FrameTime`]: whole milliseconds since the origin. This is the coarse
//!   value stamped on every animatable during a frame and the unit in which
//!   [`Animation`](crate::motion::Animation) durations are expressed.
//!
//! [`Timebase`] converts ticks to nanoseconds (`nanos = ticks * numer /
//! denom`). Arithmetic uses `u128` intermediates to avoid overflow.
//!
//! [`MonotonicClock`]: crate::clock::MonotonicClock

use core::fmt;
use core::ops::{Add, Sub};

const NANOS_PER_MILLI: u64 = 1_000_000;

/// A point in time expressed as clock ticks since the clock's origin.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Returns the duration between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }

    /// Truncates this time to whole milliseconds since the origin.
    #[inline]
    #[must_use]
    pub const fn to_frame_time(self, timebase: Timebase) -> FrameTime {
        FrameTime(timebase.ticks_to_nanos(self.0) / NANOS_PER_MILLI)
    }
}

impl Add<Duration> for HostTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for HostTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({})", self.0)
    }
}

/// Rational conversion factor from ticks to nanoseconds.
///
/// `nanoseconds = ticks * numer / denom`
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timebase {
    /// Numerator of the ticks-to-nanoseconds ratio.
    pub numer: u32,
    /// Denominator of the ticks-to-nanoseconds ratio.
    pub denom: u32,
}

impl Timebase {
    /// A timebase where ticks are already nanoseconds (1:1).
    pub const NANOS: Self = Self { numer: 1, denom: 1 };

    /// Creates a new timebase with the given numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if either part is zero.
    #[inline]
    #[must_use]
    pub const fn new(numer: u32, denom: u32) -> Self {
        assert!(denom != 0, "timebase denominator must not be zero");
        assert!(numer != 0, "timebase numerator must not be zero");
        Self { numer, denom }
    }

    /// Converts a tick count to nanoseconds.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn ticks_to_nanos(self, ticks: u64) -> u64 {
        let wide = ticks as u128 * self.numer as u128 / self.denom as u128;
        wide as u64
    }

    /// Converts nanoseconds to a tick count.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn nanos_to_ticks(self, nanos: u64) -> u64 {
        let wide = nanos as u128 * self.denom as u128 / self.numer as u128;
        wide as u64
    }

    /// Number of ticks in one millisecond, as a float for averaging.
    #[inline]
    #[must_use]
    pub fn ticks_per_milli(self) -> f64 {
        NANOS_PER_MILLI as f64 * f64::from(self.denom) / f64::from(self.numer)
    }
}

impl fmt::Debug for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timebase({}/{})", self.numer, self.denom)
    }
}

/// A duration in clock ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Creates a duration of `millis` milliseconds in the given timebase.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64, timebase: Timebase) -> Self {
        Self(timebase.nanos_to_ticks(millis * NANOS_PER_MILLI))
    }

    /// Returns the tick count as a signed sample for the perf buffers,
    /// saturating at `i64::MAX`.
    #[inline]
    #[must_use]
    pub fn as_sample(self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }
}

impl Add for Duration {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({})", self.0)
    }
}

/// Whole milliseconds since the clock origin, stamped once per frame.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameTime(pub u64);

impl FrameTime {
    /// The clock origin.
    pub const ZERO: Self = Self(0);

    /// Returns the value in milliseconds.
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, or zero if `earlier` is later.
    #[inline]
    #[must_use]
    pub const fn saturating_millis_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Debug for FrameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameTime({}ms)", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_time_truncates_to_millis() {
        let t = HostTime(16_999_999);
        assert_eq!(t.to_frame_time(Timebase::NANOS), FrameTime(16));
    }

    #[test]
    fn frame_time_with_coarse_timebase() {
        // 100ns ticks, the classic performance-counter resolution.
        let tb = Timebase::new(100, 1);
        assert_eq!(HostTime(20_000).to_frame_time(tb), FrameTime(2));
        assert!((tb.ticks_per_milli() - 10_000.0).abs() < 1e-9, "1ms = 1e4 ticks");
    }

    #[test]
    fn duration_from_millis_round_trips() {
        let tb = Timebase::new(125, 3);
        let d = Duration::from_millis(2, tb);
        assert_eq!(tb.ticks_to_nanos(d.ticks()), 2_000_000);
    }

    #[test]
    fn sample_saturates() {
        assert_eq!(Duration(u64::MAX).as_sample(), i64::MAX);
        assert_eq!(Duration(42).as_sample(), 42);
    }

    #[test]
    fn host_time_duration_ops() {
        let t = HostTime(1000);
        assert_eq!((t + Duration(200)).ticks(), 1200);
        assert_eq!(t - HostTime(400), Duration(600));
        assert_eq!(t.saturating_duration_since(HostTime(1500)), Duration::ZERO);
    }

    #[test]
    fn frame_time_elapsed_saturates() {
        assert_eq!(FrameTime(30).saturating_millis_since(FrameTime(10)), 20);
        assert_eq!(FrameTime(10).saturating_millis_since(FrameTime(30)), 0);
    }

    #[test]
    #[should_panic(expected = "timebase denominator must not be zero")]
    fn zero_denominator_panics() {
        let _ = Timebase::new(1, 0);
    }
}
