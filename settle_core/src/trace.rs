// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the canvas calls at each stage of [`draw_frame`]. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Events only flow when the canvas has a sink installed *and*
//! [`CanvasConfig::verbose_logging`] is set.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//!
//! [`draw_frame`]: crate::canvas::MotionCanvas::draw_frame
//! [`CanvasConfig::verbose_logging`]: crate::config::CanvasConfig::verbose_logging

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::time::{Duration, FrameTime, HostTime};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which part of a frame is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Drawing paint tasks and their geometries.
    Tasks,
    /// Advancing standalone trackers.
    Trackers,
    /// Applying deferred geometry and task removals.
    Removal,
    /// Drawing the perf overlay.
    Overlay,
}

impl PhaseKind {
    /// Short lowercase name, used by text and JSON sinks.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Trackers => "trackers",
            Self::Removal => "removal",
            Self::Overlay => "overlay",
        }
    }
}

/// Which host notification a frame raised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotifyKind {
    /// Something needs another frame.
    Invalidated,
    /// The last frame was static.
    Validated,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted once the canvas lock is held and the frame time is stamped.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// Stamp applied to every animatable this frame.
    pub frame_time: FrameTime,
    /// Host time after the lock was acquired.
    pub timestamp: HostTime,
    /// Time spent waiting for the lock.
    pub lock_wait: Duration,
    /// Tasks present at the start of the frame.
    pub task_count: u32,
}

/// Marks the beginning of a frame phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
    /// Host time at the start of the phase.
    pub timestamp: HostTime,
}

/// Marks the end of a frame phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// Host time at the end of the phase.
    pub timestamp: HostTime,
}

/// Emitted after `end_frame`, before the lock is released.
#[derive(Clone, Copy, Debug)]
pub struct FrameEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Host time at the end of the frame.
    pub timestamp: HostTime,
    /// Whether the frame settled.
    pub is_valid: bool,
    /// Tasks visited.
    pub tasks_visited: u32,
    /// Geometries visited, drawn or not.
    pub geometries_visited: u32,
    /// One-shot geometries detached this frame.
    pub geometries_removed: u32,
    /// One-shot tasks detached this frame.
    pub tasks_removed: u32,
    /// Time spent drawing, lock wait excluded.
    pub draw: Duration,
}

/// Emitted when a frame or a mutation raises a host notification.
#[derive(Clone, Copy, Debug)]
pub struct NotifyEvent {
    /// Frame counter at the time of the notification.
    pub frame_index: u64,
    /// Which notification.
    pub kind: NotifyKind,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the start of a frame.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called at the beginning of a frame phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a frame phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called at the end of a frame.
    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        _ = e;
    }

    /// Called when a host notification is about to be raised.
    fn on_notify(&mut self, e: &NotifyEvent) {
        _ = e;
    }

    /// Called with the single-line perf summary, at most once per
    /// configured interval.
    fn on_perf_summary(&mut self, frame_index: u64, summary: &str) {
        _ = (frame_index, summary);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// SharedSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] shared between the canvas and its host.
///
/// The canvas owns the sink it is given. Installing a clone of a
/// `SharedSink` lets the host keep the other handle and inspect the inner
/// sink (for example, to read a recording) while the canvas keeps writing.
pub struct SharedSink<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> core::fmt::Debug for SharedSink<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedSink").finish_non_exhaustive()
    }
}

impl<S: TraceSink> SharedSink<S> {
    /// Wraps `sink` for sharing.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    /// Runs `f` with exclusive access to the inner sink.
    ///
    /// Blocks while the canvas is emitting an event.
    pub fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, S> {
        // A sink that panicked mid-event is still safe to append to.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: TraceSink> TraceSink for SharedSink<S> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.lock().on_frame_begin(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.lock().on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.lock().on_phase_end(e);
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        self.lock().on_frame_end(e);
    }

    fn on_notify(&mut self, e: &NotifyEvent) {
        self.lock().on_notify(e);
    }

    fn on_perf_summary(&mut self, frame_index: u64, summary: &str) {
        self.lock().on_perf_summary(frame_index, summary);
    }
}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to `sink`, or discards everything
    /// when `sink` is `None`.
    #[inline]
    #[must_use]
    pub fn new(sink: Option<&'a mut dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::new(None)
    }

    /// Whether events reach a sink. Always `false` without the `trace`
    /// feature.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameEndEvent`].
    #[inline]
    pub fn frame_end(&mut self, e: &FrameEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NotifyEvent`].
    #[inline]
    pub fn notify(&mut self, e: &NotifyEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_notify(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits the perf summary text.
    #[inline]
    pub fn perf_summary(&mut self, frame_index: u64, summary: &str) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_perf_summary(frame_index, summary);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (frame_index, summary);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
