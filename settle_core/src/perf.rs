// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rolling frame-cost samples.
//!
//! [`PerfSampler`] keeps one fixed-capacity [`RingBuffer`] per
//! [`PerfMetric`]. Buffers are pre-filled with an expected value so the
//! average is meaningful from the first frame, and appending never
//! allocates.

use core::fmt::Write as _;

use crate::time::{Duration, Timebase};

/// Largest accepted ring-buffer degree (`1 << 20` samples).
pub const MAX_DEGREE: u32 = 20;

/// Which phase a sample measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PerfMetric {
    /// Time spent waiting for the canvas lock at the start of a frame.
    DrawLock,
    /// Time spent drawing a frame, lock wait excluded.
    Draw,
    /// Chart measure pass, reported by the host.
    Measure,
    /// Measure pass for visual elements, reported by the host.
    MeasureVisuals,
}

impl PerfMetric {
    /// All metrics, in summary order.
    pub const ALL: [Self; 4] = [
        Self::DrawLock,
        Self::Draw,
        Self::Measure,
        Self::MeasureVisuals,
    ];

    /// Label used in the formatted summary.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DrawLock => "Draw lock time",
            Self::Draw => "Draw time",
            Self::Measure => "Measure time",
            Self::MeasureVisuals => "Measure visuals time",
        }
    }

    /// Expected cost in milliseconds, used to pre-fill the buffer.
    #[must_use]
    pub const fn default_millis(self) -> u64 {
        match self {
            Self::DrawLock => 0,
            Self::Draw | Self::MeasureVisuals => 2,
            Self::Measure => 3,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::DrawLock => 0,
            Self::Draw => 1,
            Self::Measure => 2,
            Self::MeasureVisuals => 3,
        }
    }
}

/// Fixed-capacity circular buffer of `i64` samples.
///
/// Capacity is a power of two so the write index wraps with a mask. Once
/// full, each append overwrites the oldest sample.
#[derive(Clone, Debug)]
pub struct RingBuffer {
    data: Box<[i64]>,
    mask: usize,
    next: usize,
}

impl RingBuffer {
    /// Creates a buffer of `1 << degree` samples, all set to `default`.
    ///
    /// # Panics
    ///
    /// Panics if `degree` exceeds [`MAX_DEGREE`].
    #[must_use]
    pub fn new(degree: u32, default: i64) -> Self {
        assert!(
            degree <= MAX_DEGREE,
            "ring buffer degree {degree} exceeds {MAX_DEGREE}"
        );
        let capacity = 1_usize << degree;
        Self {
            data: vec![default; capacity].into_boxed_slice(),
            mask: capacity - 1,
            next: 0,
        }
    }

    /// Writes a sample over the oldest one.
    #[inline]
    pub fn append(&mut self, value: i64) {
        self.data[self.next] = value;
        self.next = (self.next + 1) & self.mask;
    }

    /// Number of samples held.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Raw storage, in slot order (not chronological).
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    /// Mean of every held sample.
    #[must_use]
    pub fn average(&self) -> f64 {
        let sum: i128 = self.data.iter().map(|&v| i128::from(v)).sum();
        sum as f64 / self.data.len() as f64
    }
}

/// Four rolling buffers of frame-phase costs plus a reusable text buffer.
#[derive(Clone, Debug)]
pub struct PerfSampler {
    buffers: [RingBuffer; 4],
    timebase: Timebase,
    text: String,
}

impl PerfSampler {
    /// Creates a sampler with `1 << degree` samples per metric.
    ///
    /// Each buffer is pre-filled with its metric's
    /// [`default_millis`](PerfMetric::default_millis), converted with
    /// `timebase`.
    #[must_use]
    pub fn new(degree: u32, timebase: Timebase) -> Self {
        let buffers = PerfMetric::ALL.map(|metric| {
            RingBuffer::new(
                degree,
                Duration::from_millis(metric.default_millis(), timebase).as_sample(),
            )
        });
        Self {
            buffers,
            timebase,
            text: String::new(),
        }
    }

    /// Appends a sample for `metric`.
    #[inline]
    pub fn record(&mut self, metric: PerfMetric, sample: Duration) {
        self.buffers[metric.index()].append(sample.as_sample());
    }

    /// The buffer backing `metric`.
    #[must_use]
    pub fn buffer(&self, metric: PerfMetric) -> &RingBuffer {
        &self.buffers[metric.index()]
    }

    /// Timebase used to convert samples to milliseconds.
    #[must_use]
    pub const fn timebase(&self) -> Timebase {
        self.timebase
    }

    /// Mean of `metric` in milliseconds.
    #[must_use]
    pub fn average_millis(&self, metric: PerfMetric) -> f64 {
        self.buffer(metric).average() / self.timebase.ticks_per_milli()
    }

    /// Renders every metric as `label: mean` with four decimals.
    ///
    /// Entries are joined by `"; "` when `single_line` is set and by newlines
    /// otherwise. The returned text lives in a buffer reused across calls.
    pub fn format_summary(&mut self, single_line: bool) -> &str {
        let separator = if single_line { "; " } else { "\n" };
        let mut text = core::mem::take(&mut self.text);
        text.clear();
        for (i, metric) in PerfMetric::ALL.into_iter().enumerate() {
            if i > 0 {
                text.push_str(separator);
            }
            // Writing to a String cannot fail.
            _ = write!(
                text,
                "{}: {:.4}",
                metric.label(),
                self.average_millis(metric)
            );
        }
        self.text = text;
        &self.text
    }
}
