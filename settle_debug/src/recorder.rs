// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records. [`decode`] reads them back as an
//! iterator of [`RecordedEvent`].
//!
//! Every record is fixed-size except the perf summary, which stores its text
//! as a `u32` byte length followed by UTF-8.

use settle_core::time::{Duration, FrameTime, HostTime};
use settle_core::trace::{
    FrameBeginEvent, FrameEndEvent, NotifyEvent, NotifyKind, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME_BEGIN: u8 = 1;
const TAG_PHASE_BEGIN: u8 = 2;
const TAG_PHASE_END: u8 = 3;
const TAG_FRAME_END: u8 = 4;
const TAG_NOTIFY: u8 = 5;
const TAG_PERF_SUMMARY: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::Tasks => 0,
            PhaseKind::Trackers => 1,
            PhaseKind::Removal => 2,
            PhaseKind::Overlay => 3,
        });
    }

    fn write_str(&mut self, s: &str) {
        // Longer text is cut at a char boundary.
        let mut len = s.len().min(u32::MAX as usize);
        while !s.is_char_boundary(len) {
            len -= 1;
        }
        self.write_u32(u32::try_from(len).unwrap_or(u32::MAX));
        self.buf.extend_from_slice(&s.as_bytes()[..len]);
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.write_u8(TAG_FRAME_BEGIN);
        self.write_u64(e.frame_index);
        self.write_u64(e.frame_time.as_millis());
        self.write_u64(e.timestamp.ticks());
        self.write_u64(e.lock_wait.ticks());
        self.write_u32(e.task_count);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
        self.write_u64(e.timestamp.ticks());
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        self.write_u8(TAG_FRAME_END);
        self.write_u64(e.frame_index);
        self.write_u64(e.timestamp.ticks());
        self.write_u8(u8::from(e.is_valid));
        self.write_u32(e.tasks_visited);
        self.write_u32(e.geometries_visited);
        self.write_u32(e.geometries_removed);
        self.write_u32(e.tasks_removed);
        self.write_u64(e.draw.ticks());
    }

    fn on_notify(&mut self, e: &NotifyEvent) {
        self.write_u8(TAG_NOTIFY);
        self.write_u64(e.frame_index);
        self.write_u8(match e.kind {
            NotifyKind::Invalidated => 0,
            NotifyKind::Validated => 1,
        });
    }

    fn on_perf_summary(&mut self, frame_index: u64, summary: &str) {
        self.write_u8(TAG_PERF_SUMMARY);
        self.write_u64(frame_index);
        self.write_str(summary);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`FrameBeginEvent`].
    FrameBegin(FrameBeginEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`FrameEndEvent`].
    FrameEnd(FrameEndEvent),
    /// A [`NotifyEvent`].
    Notify(NotifyEvent),
    /// A perf summary line.
    PerfSummary {
        /// Frame counter.
        frame_index: u64,
        /// Summary text.
        summary: String,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take(&mut self, n: usize) -> Option<&[u8]> {
        let bytes = self.data.get(self.pos..self.pos.checked_add(n)?)?;
        self.pos += n;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.take(4)?.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.take(8)?.try_into().ok()?))
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        match self.read_u8()? {
            0 => Some(PhaseKind::Tasks),
            1 => Some(PhaseKind::Trackers),
            2 => Some(PhaseKind::Removal),
            3 => Some(PhaseKind::Overlay),
            _ => None, // corrupt phase → stop iteration
        }
    }

    fn read_string(&mut self) -> Option<String> {
        let len = usize::try_from(self.read_u32()?).ok()?;
        let bytes = self.take(len)?;
        Some(String::from_utf8_lossy(bytes).into_owned())
    }

    fn decode_frame_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameBegin(FrameBeginEvent {
            frame_index: self.read_u64()?,
            frame_time: FrameTime(self.read_u64()?),
            timestamp: HostTime(self.read_u64()?),
            lock_wait: Duration(self.read_u64()?),
            task_count: self.read_u32()?,
        }))
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
            timestamp: HostTime(self.read_u64()?),
        }))
    }

    fn decode_frame_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameEnd(FrameEndEvent {
            frame_index: self.read_u64()?,
            timestamp: HostTime(self.read_u64()?),
            is_valid: self.read_u8()? != 0,
            tasks_visited: self.read_u32()?,
            geometries_visited: self.read_u32()?,
            geometries_removed: self.read_u32()?,
            tasks_removed: self.read_u32()?,
            draw: Duration(self.read_u64()?),
        }))
    }

    fn decode_notify(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let kind = match self.read_u8()? {
            0 => NotifyKind::Invalidated,
            _ => NotifyKind::Validated,
        };
        Some(RecordedEvent::Notify(NotifyEvent { frame_index, kind }))
    }

    fn decode_perf_summary(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let summary = self.read_string()?;
        Some(RecordedEvent::PerfSummary {
            frame_index,
            summary,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FRAME_BEGIN => self.decode_frame_begin(),
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_FRAME_END => self.decode_frame_end(),
            TAG_NOTIFY => self.decode_notify(),
            TAG_PERF_SUMMARY => self.decode_perf_summary(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
