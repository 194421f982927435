// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The animated drawing surface.
//!
//! [`MotionCanvas`] owns a [`Scene`] behind one mutex and draws it on demand.
//! Every frame:
//!
//! ```text
//!   lock ──► begin_frame ──► tasks (z-order) ──► trackers ──► removals
//!                                                               │
//!   validated? ◄── unlock ◄── end_frame ◄── perf overlay ◄──────┘
//! ```
//!
//! The host drives the loop. It draws when notified through
//! [`on_invalidated`](MotionCanvas::on_invalidated), keeps drawing while
//! [`is_valid`](MotionCanvas::is_valid) is `false`, and can stop once
//! [`on_validated`](MotionCanvas::on_validated) fires.
//!
//! Notifications are raised after the lock is released, so a handler may
//! call back into the canvas.

mod listeners;

#[cfg(test)]
mod tests;

pub use listeners::ListenerId;

use core::fmt;
use core::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kurbo::Point;

use crate::backend::{DrawContext, Paint, PerfOverlay};
use crate::clock::{MonotonicClock, TimeSource};
use crate::config::CanvasConfig;
use crate::motion::Animatable;
use crate::perf::{PerfMetric, PerfSampler};
use crate::scene::{PassStats, Scene, TaskId, TrackerId};
use crate::time::{Duration, FrameTime, HostTime};
use crate::trace::{
    FrameBeginEvent, FrameEndEvent, NotifyEvent, NotifyKind, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, TraceSink, Tracer,
};
use listeners::Listeners;

/// Everything guarded by the canvas lock.
struct Inner<C> {
    scene: Scene<C>,
    perf: PerfSampler,
    overlay: Option<PerfOverlay<C>>,
    sink: Option<Box<dyn TraceSink + Send>>,
    config: CanvasConfig,
    frame_index: u64,
    last_perf_log: Option<FrameTime>,
    start_point: Option<Point>,
}

/// Retained-mode surface that animates a scene against a clock.
///
/// `C` is the backend drawing context. The canvas is `Send + Sync` for any
/// `C`: tasks, geometries, and trackers are required to be `Send`.
pub struct MotionCanvas<C> {
    inner: Mutex<Inner<C>>,
    clock: Box<dyn TimeSource>,
    is_valid: AtomicBool,
    listeners: Mutex<Listeners<C>>,
}

impl<C: 'static> fmt::Debug for MotionCanvas<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionCanvas")
            .field("clock", &self.clock)
            .field("is_valid", &self.is_valid())
            .finish_non_exhaustive()
    }
}

impl<C: 'static> MotionCanvas<C> {
    /// Creates an empty canvas timed by a [`MonotonicClock`] started now.
    #[must_use]
    pub fn new(config: CanvasConfig) -> Self {
        Self::with_clock(config, MonotonicClock::start())
    }

    /// Creates an empty canvas timed by `clock`.
    ///
    /// # Panics
    ///
    /// Panics if `config.perf_buffer_degree` exceeds
    /// [`perf::MAX_DEGREE`](crate::perf::MAX_DEGREE).
    #[must_use]
    pub fn with_clock(config: CanvasConfig, clock: impl TimeSource + 'static) -> Self {
        let perf = PerfSampler::new(config.perf_buffer_degree, clock.timebase());
        Self {
            inner: Mutex::new(Inner {
                scene: Scene::new(),
                perf,
                overlay: None,
                sink: None,
                config,
                frame_index: 0,
                last_perf_log: None,
                start_point: None,
            }),
            clock: Box::new(clock),
            is_valid: AtomicBool::new(false),
            listeners: Mutex::new(Listeners::new()),
        }
    }

    // -- Locking ------------------------------------------------------------

    /// Acquires the canvas lock for several scene mutations at once.
    ///
    /// A frame cannot start while the guard is alive. Notifications are not
    /// raised by scene mutations; call [`invalidate`](Self::invalidate)
    /// after dropping the guard if the change should be drawn.
    ///
    /// # Panics
    ///
    /// Panics if a previous holder of the lock panicked.
    pub fn lock(&self) -> SceneGuard<'_, C> {
        SceneGuard {
            guard: self.lock_inner(),
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner<C>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("canvas lock poisoned: a previous frame panicked mid-draw"),
        }
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Listeners<C>> {
        // Handlers never run under this lock, so the registry is always
        // consistent.
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // -- Tasks --------------------------------------------------------------

    /// Adds a paint task. See [`Scene::insert_task`].
    pub fn add_task(&self, paint: Box<dyn Paint<C>>) -> TaskId {
        self.lock_inner().scene.insert_task(paint)
    }

    /// Detaches and removes a task. See [`Scene::remove_task`].
    pub fn remove_task(&self, id: TaskId) -> Option<Box<dyn Paint<C>>> {
        self.lock_inner().scene.remove_task(id)
    }

    /// Swaps the whole task set under one lock acquisition.
    pub fn replace_tasks<I>(&self, paints: I) -> Vec<TaskId>
    where
        I: IntoIterator<Item = Box<dyn Paint<C>>>,
    {
        self.lock_inner().scene.replace_tasks(paints)
    }

    /// Detaches every task, then [`invalidate`](Self::invalidate)s.
    pub fn clear(&self) {
        {
            let mut guard = self.lock_inner();
            let inner = &mut *guard;
            inner.scene.clear_tasks();
            let frame_index = inner.frame_index;
            Self::tracer(inner.config, &mut inner.sink).notify(&NotifyEvent {
                frame_index,
                kind: NotifyKind::Invalidated,
            });
        }
        self.invalidate();
    }

    /// Number of paint tasks.
    #[must_use]
    pub fn drawables_count(&self) -> usize {
        self.lock_inner().scene.task_count()
    }

    /// Number of geometries across every task.
    #[must_use]
    pub fn geometry_count(&self) -> usize {
        self.lock_inner().scene.geometry_count()
    }

    // -- Trackers -----------------------------------------------------------

    /// Registers an animation tracker.
    pub fn add_tracker(&self, tracker: Box<dyn Animatable>) -> TrackerId {
        self.lock_inner().scene.insert_tracker(tracker)
    }

    /// Unregisters an animation tracker.
    pub fn remove_tracker(&self, id: TrackerId) -> Option<Box<dyn Animatable>> {
        self.lock_inner().scene.remove_tracker(id)
    }

    // -- Validity -----------------------------------------------------------

    /// Whether the last frame was static. `false` until the first frame.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid.load(Ordering::Acquire)
    }

    /// Marks the canvas as needing a frame and notifies invalidated
    /// listeners. Does not take the canvas lock.
    pub fn invalidate(&self) {
        self.is_valid.store(false, Ordering::Release);
        self.notify(NotifyKind::Invalidated);
    }

    /// Calls `f` after every [`invalidate`](Self::invalidate).
    pub fn on_invalidated<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Self) + Send + Sync + 'static,
    {
        self.lock_listeners()
            .add(NotifyKind::Invalidated, Arc::new(f))
    }

    /// Calls `f` after every frame that turned out static.
    pub fn on_validated<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&Self) + Send + Sync + 'static,
    {
        self.lock_listeners().add(NotifyKind::Validated, Arc::new(f))
    }

    /// Unregisters a listener. Returns `false` if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.lock_listeners().remove(id)
    }

    fn notify(&self, kind: NotifyKind) {
        let handlers = self.lock_listeners().snapshot(kind);
        for (_, handler) in handlers.iter() {
            handler(self);
        }
    }

    // -- Perf and diagnostics -----------------------------------------------

    /// Current high-resolution time of the canvas clock.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.clock.now()
    }

    /// The canvas clock.
    #[must_use]
    pub fn clock(&self) -> &dyn TimeSource {
        &*self.clock
    }

    /// Records the cost of a chart measure pass.
    pub fn record_measure_time(&self, time: Duration) {
        self.lock_inner().perf.record(PerfMetric::Measure, time);
    }

    /// Records the cost of measuring visual elements.
    pub fn record_measure_visuals_time(&self, time: Duration) {
        self.lock_inner()
            .perf
            .record(PerfMetric::MeasureVisuals, time);
    }

    /// The single-line perf summary.
    #[must_use]
    pub fn perf_summary(&self) -> String {
        self.lock_inner().perf.format_summary(true).to_owned()
    }

    /// Installs or removes the trace sink.
    ///
    /// Events reach it only while
    /// [`CanvasConfig::verbose_logging`] is set.
    pub fn set_trace_sink(&self, sink: Option<Box<dyn TraceSink + Send>>) {
        self.lock_inner().sink = sink;
    }

    /// Takes the trace sink back out of the canvas.
    pub fn take_trace_sink(&self) -> Option<Box<dyn TraceSink + Send>> {
        self.lock_inner().sink.take()
    }

    /// Installs or removes the perf overlay.
    pub fn set_perf_overlay(&self, overlay: Option<PerfOverlay<C>>) {
        self.lock_inner().overlay = overlay;
    }

    // -- Configuration ------------------------------------------------------

    /// The current configuration.
    #[must_use]
    pub fn config(&self) -> CanvasConfig {
        self.lock_inner().config
    }

    /// Replaces the configuration from the next frame on.
    ///
    /// The perf buffer size is fixed at construction and is not changed.
    pub fn set_config(&self, config: CanvasConfig) {
        self.lock_inner().config = config;
    }

    /// Where drawing starts, for backends that offset the frame.
    #[must_use]
    pub fn start_point(&self) -> Option<Point> {
        self.lock_inner().start_point
    }

    /// Sets the drawing origin.
    pub fn set_start_point(&self, point: Option<Point>) {
        self.lock_inner().start_point = point;
    }

    // -- Teardown -----------------------------------------------------------

    /// Detaches every task and tracker and marks the canvas valid.
    ///
    /// Raises no notification.
    pub fn dispose(&self) {
        let mut guard = self.lock_inner();
        guard.scene.clear_tasks();
        guard.scene.clear_trackers();
        self.is_valid.store(true, Ordering::Release);
    }

    fn tracer(config: CanvasConfig, sink: &mut Option<Box<dyn TraceSink + Send>>) -> Tracer<'_> {
        let sink = sink
            .as_deref_mut()
            .filter(|_| config.verbose_logging)
            .map(|sink| sink as &mut dyn TraceSink);
        Tracer::new(sink)
    }

    fn phase_begin(&self, tracer: &mut Tracer<'_>, frame_index: u64, phase: PhaseKind) {
        if tracer.is_active() {
            tracer.phase_begin(&PhaseBeginEvent {
                frame_index,
                phase,
                timestamp: self.clock.now(),
            });
        }
    }

    fn phase_end(&self, tracer: &mut Tracer<'_>, frame_index: u64, phase: PhaseKind) {
        if tracer.is_active() {
            tracer.phase_end(&PhaseEndEvent {
                frame_index,
                phase,
                timestamp: self.clock.now(),
            });
        }
    }
}

impl<C: DrawContext + 'static> MotionCanvas<C> {
    /// Draws one frame and updates [`is_valid`](Self::is_valid).
    ///
    /// Blocks while another thread holds the canvas lock. Validated
    /// listeners run after the lock is released, before this returns.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned. A panic from the backend or from a
    /// task propagates and poisons the lock.
    pub fn draw_frame(&self, ctx: &mut C) {
        let lock_start = self.clock.now();
        let mut guard = self.lock_inner();
        let inner = &mut *guard;
        let locked_at = self.clock.now();
        let lock_wait = locked_at.saturating_duration_since(lock_start);
        inner.perf.record(PerfMetric::DrawLock, lock_wait);

        inner.frame_index += 1;
        let frame_index = inner.frame_index;
        let config = inner.config;
        let snap = config.disable_animations;

        ctx.begin_frame();
        let frame_time = locked_at.to_frame_time(self.clock.timebase());

        let mut tracer = Self::tracer(config, &mut inner.sink);
        tracer.frame_begin(&FrameBeginEvent {
            frame_index,
            frame_time,
            timestamp: locked_at,
            lock_wait,
            task_count: saturating_u32(inner.scene.task_count()),
        });

        let mut stats = PassStats::new();
        self.phase_begin(&mut tracer, frame_index, PhaseKind::Tasks);
        inner.scene.draw_tasks(ctx, frame_time, snap, &mut stats);
        self.phase_end(&mut tracer, frame_index, PhaseKind::Tasks);

        self.phase_begin(&mut tracer, frame_index, PhaseKind::Trackers);
        inner.scene.advance_trackers(frame_time, snap, &mut stats);
        self.phase_end(&mut tracer, frame_index, PhaseKind::Trackers);

        self.phase_begin(&mut tracer, frame_index, PhaseKind::Removal);
        inner.scene.apply_removals(&mut stats);
        self.phase_end(&mut tracer, frame_index, PhaseKind::Removal);

        if let Some(overlay) = &mut inner.overlay {
            self.phase_begin(&mut tracer, frame_index, PhaseKind::Overlay);
            overlay.label.set_text(inner.perf.format_summary(false));
            overlay.paint.motion_mut().set_current_time(frame_time);
            overlay.label.motion_mut().set_current_time(frame_time);
            overlay.paint.initialize(ctx);
            overlay.label.draw(ctx);
            overlay.paint.dispose(ctx);
            self.phase_end(&mut tracer, frame_index, PhaseKind::Overlay);
        }

        ctx.end_frame();
        let ended_at = self.clock.now();
        let draw = ended_at.saturating_duration_since(locked_at);
        inner.perf.record(PerfMetric::Draw, draw);

        let is_valid = stats.is_valid;
        tracer.frame_end(&FrameEndEvent {
            frame_index,
            timestamp: ended_at,
            is_valid,
            tasks_visited: stats.tasks_visited,
            geometries_visited: stats.geometries_visited,
            geometries_removed: stats.geometries_removed,
            tasks_removed: stats.tasks_removed,
            draw,
        });

        if tracer.is_active()
            && inner.last_perf_log.is_none_or(|last| {
                frame_time.saturating_millis_since(last) >= config.perf_log_interval_ms
            })
        {
            inner.last_perf_log = Some(frame_time);
            tracer.perf_summary(frame_index, inner.perf.format_summary(true));
        }
        if is_valid {
            tracer.notify(&NotifyEvent {
                frame_index,
                kind: NotifyKind::Validated,
            });
        }

        self.is_valid.store(is_valid, Ordering::Release);
        drop(guard);

        if is_valid {
            self.notify(NotifyKind::Validated);
        }
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Exclusive access to a canvas's [`Scene`].
///
/// Obtained from [`MotionCanvas::lock`]. Frames wait until it is dropped.
pub struct SceneGuard<'a, C> {
    guard: MutexGuard<'a, Inner<C>>,
}

impl<C> fmt::Debug for SceneGuard<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SceneGuard")
            .field(&self.guard.scene)
            .finish()
    }
}

impl<C> Deref for SceneGuard<'_, C> {
    type Target = Scene<C>;

    fn deref(&self) -> &Scene<C> {
        &self.guard.scene
    }
}

impl<C> DerefMut for SceneGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut Scene<C> {
        &mut self.guard.scene
    }
}
