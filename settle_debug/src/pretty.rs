// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Tick values
//! are converted to microseconds using a [`Timebase`].

use std::io::Write;

use settle_core::time::{HostTime, Timebase};
use settle_core::trace::{
    FrameBeginEvent, FrameEndEvent, NotifyEvent, NotifyKind, PhaseBeginEvent, PhaseEndEvent,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write + Send>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn host_us(&self, t: HostTime) -> f64 {
        self.ticks_to_us(t.ticks())
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:begin] frame={} t={}ms tasks={} lock={:.1}µs",
            e.frame_index,
            e.frame_time.as_millis(),
            e.task_count,
            self.ticks_to_us(e.lock_wait.ticks()),
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {} at {:.1}µs",
            e.frame_index,
            e.phase.name(),
            self.host_us(e.timestamp),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {} at {:.1}µs",
            e.frame_index,
            e.phase.name(),
            self.host_us(e.timestamp),
        );
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        let state = if e.is_valid { "settled" } else { "animating" };
        let _ = writeln!(
            self.writer,
            "[frame:end] frame={} {state} tasks={} geometries={} removed={}+{} draw={:.1}µs",
            e.frame_index,
            e.tasks_visited,
            e.geometries_visited,
            e.geometries_removed,
            e.tasks_removed,
            self.ticks_to_us(e.draw.ticks()),
        );
    }

    fn on_notify(&mut self, e: &NotifyEvent) {
        let kind = match e.kind {
            NotifyKind::Invalidated => "invalidated",
            NotifyKind::Validated => "validated",
        };
        let _ = writeln!(self.writer, "[notify] frame={} {kind}", e.frame_index);
    }

    fn on_perf_summary(&mut self, frame_index: u64, summary: &str) {
        let _ = writeln!(self.writer, "[perf] frame={frame_index} {summary}");
    }
}
