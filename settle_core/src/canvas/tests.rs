// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use super::*;
use crate::backend::Drawable;
use crate::clock::ManualClock;
use crate::motion::MotionState;
use crate::test_support::{
    CountingTracker, Event, RecordingContext, ScriptedGeometry, SlidingDot, TestLabel, TestPaint,
};
use crate::time::Timebase;

type Canvas = MotionCanvas<RecordingContext>;

fn canvas_with_clock(config: CanvasConfig) -> (Canvas, ManualClock) {
    let clock = ManualClock::new();
    (Canvas::with_clock(config, clock.clone()), clock)
}

fn paint(name: &'static str) -> Box<dyn Paint<RecordingContext>> {
    Box::new(TestPaint::new(name))
}

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

#[test]
fn canvas_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Canvas>();
}

#[test]
fn new_canvas_is_invalid_until_first_frame() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::default());
    assert!(!canvas.is_valid());
    canvas.draw_frame(&mut RecordingContext::default());
    assert!(canvas.is_valid(), "an empty frame is static");
}

#[test]
fn one_shot_geometry_three_frame_scenario() {
    let (canvas, clock) = canvas_with_clock(CanvasConfig::default());
    let task = canvas.add_task(paint("series"));
    let _ = canvas
        .lock()
        .add_geometry(task, Box::new(ScriptedGeometry::new("point", 3).one_shot()));
    let mut ctx = RecordingContext::default();

    let mut validity = Vec::new();
    for _ in 0..4 {
        canvas.draw_frame(&mut ctx);
        validity.push(canvas.is_valid());
        clock.advance_millis(16);
    }
    assert_eq!(validity, [false, false, false, true]);
    assert_eq!(canvas.geometry_count(), 0);
    assert_eq!(canvas.drawables_count(), 1, "the task itself stays");
    assert_eq!(ctx.drawn(), vec!["point"; 3]);
}

#[test]
fn disabled_animations_settle_on_first_frame() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::snapshot());
    let task = canvas.add_task(paint("series"));
    let _ = canvas
        .lock()
        .add_geometry(task, Box::new(ScriptedGeometry::new("slow", 10)));
    let _ = canvas.add_tracker(Box::new(CountingTracker::new(10)));

    canvas.draw_frame(&mut RecordingContext::default());
    assert!(canvas.is_valid());
}

#[test]
fn set_config_applies_from_next_frame() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::interactive());
    let task = canvas.add_task(paint("series"));
    let _ = canvas
        .lock()
        .add_geometry(task, Box::new(ScriptedGeometry::new("slow", 10)));
    let mut ctx = RecordingContext::default();

    canvas.draw_frame(&mut ctx);
    assert!(!canvas.is_valid());
    canvas.set_config(CanvasConfig::snapshot());
    assert!(canvas.config().disable_animations);
    canvas.draw_frame(&mut ctx);
    assert!(canvas.is_valid());
}

#[test]
fn settled_canvas_stays_settled() {
    let (canvas, clock) = canvas_with_clock(CanvasConfig::default());
    let task = canvas.add_task(paint("series"));
    let g = canvas
        .lock()
        .add_geometry(task, Box::new(ScriptedGeometry::new("bar", 2)));
    let mut ctx = RecordingContext::default();

    canvas.draw_frame(&mut ctx);
    canvas.draw_frame(&mut ctx);
    assert!(canvas.is_valid());
    for _ in 0..5 {
        clock.advance_millis(16);
        canvas.draw_frame(&mut ctx);
        assert!(canvas.is_valid(), "no mutation, no motion");
    }

    // Re-arming a transition makes the next frame invalid again.
    canvas
        .lock()
        .geometry_mut::<ScriptedGeometry>(task, g)
        .expect("geometry is still attached")
        .rearm(2);
    canvas.draw_frame(&mut ctx);
    assert!(!canvas.is_valid());
    canvas.draw_frame(&mut ctx);
    assert!(canvas.is_valid());
}

#[test]
fn tasks_render_in_z_order() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::default());
    let _ = canvas.add_task(Box::new(TestPaint::new("front").with_z_index(10)));
    let _ = canvas.add_task(Box::new(TestPaint::new("back").with_z_index(-10)));
    let _ = canvas.add_task(Box::new(TestPaint::new("middle")));
    let mut ctx = RecordingContext::default();
    canvas.draw_frame(&mut ctx);
    assert_eq!(ctx.initialized(), vec!["back", "middle", "front"]);
}

#[test]
fn frame_is_bracketed_by_backend_calls() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::default());
    let task = canvas.add_task(paint("p"));
    let _ = canvas
        .lock()
        .add_geometry(task, Box::new(ScriptedGeometry::new("g", 0)));
    let mut ctx = RecordingContext::default();
    canvas.draw_frame(&mut ctx);
    assert_eq!(
        ctx.events,
        vec![
            Event::BeginFrame,
            Event::Init("p"),
            Event::Draw("g"),
            Event::Dispose("p"),
            Event::EndFrame,
        ]
    );
}

#[test]
fn motion_property_animates_over_frame_time() {
    let (canvas, clock) = canvas_with_clock(CanvasConfig::default());
    let task = canvas.add_task(paint("series"));
    let dot = {
        let mut scene = canvas.lock();
        let dot = scene.add_geometry(task, Box::new(SlidingDot::new(100)));
        scene
            .geometry_mut::<SlidingDot>(task, dot)
            .expect("just added")
            .slide_to(10.0);
        dot
    };
    let mut ctx = RecordingContext::default();
    let x = |canvas: &Canvas| {
        canvas
            .lock()
            .geometry::<SlidingDot>(task, dot)
            .map(|d| d.last_x)
    };

    clock.advance_millis(1_000);
    canvas.draw_frame(&mut ctx);
    assert_eq!(x(&canvas), Some(0.0), "start latched on first draw");
    assert!(!canvas.is_valid());

    clock.advance_millis(50);
    canvas.draw_frame(&mut ctx);
    let mid = x(&canvas).expect("dot attached");
    assert!((mid - 5.0).abs() < 1e-9, "halfway, got {mid}");
    assert!(!canvas.is_valid());

    clock.advance_millis(50);
    canvas.draw_frame(&mut ctx);
    assert_eq!(x(&canvas), Some(10.0));
    assert!(canvas.is_valid());
}

#[test]
fn validated_fires_only_for_static_frames() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::default());
    let task = canvas.add_task(paint("series"));
    let _ = canvas
        .lock()
        .add_geometry(task, Box::new(ScriptedGeometry::new("g", 2)));
    let fired = counter();
    let seen = Arc::clone(&fired);
    let _ = canvas.on_validated(move |_| {
        seen.fetch_add(1, Ordering::Relaxed);
    });
    let mut ctx = RecordingContext::default();

    canvas.draw_frame(&mut ctx);
    assert_eq!(fired.load(Ordering::Relaxed), 0);
    canvas.draw_frame(&mut ctx);
    assert_eq!(fired.load(Ordering::Relaxed), 1);
}

#[test]
fn validated_handler_can_reenter_canvas() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::default());
    let _ = canvas.add_task(paint("series"));
    let count = counter();
    let seen = Arc::clone(&count);
    let _ = canvas.on_validated(move |canvas| {
        seen.store(canvas.drawables_count(), Ordering::Relaxed);
        // Registering from inside a handler must not deadlock either.
        let _ = canvas.on_invalidated(|_| {});
    });
    canvas.draw_frame(&mut RecordingContext::default());
    assert_eq!(count.load(Ordering::Relaxed), 1);
}

#[test]
fn invalidated_fires_on_invalidate_and_clear() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::default());
    let fired = counter();
    let seen = Arc::clone(&fired);
    let id = canvas.on_invalidated(move |canvas| {
        assert!(!canvas.is_valid());
        seen.fetch_add(1, Ordering::Relaxed);
    });

    canvas.draw_frame(&mut RecordingContext::default());
    assert!(canvas.is_valid());
    canvas.invalidate();
    canvas.invalidate();
    assert_eq!(fired.load(Ordering::Relaxed), 2, "fires on every call");

    let _ = canvas.add_task(paint("p"));
    canvas.clear();
    assert_eq!(fired.load(Ordering::Relaxed), 3);
    assert_eq!(canvas.drawables_count(), 0);

    assert!(canvas.remove_listener(id));
    assert!(!canvas.remove_listener(id), "already removed");
    canvas.invalidate();
    assert_eq!(fired.load(Ordering::Relaxed), 3);
}

#[test]
fn listeners_run_in_registration_order() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::default());
    let order = Arc::new(Mutex::new(Vec::new()));
    for n in 0..3 {
        let order = Arc::clone(&order);
        let _ = canvas.on_invalidated(move |_| {
            order.lock().expect("not poisoned").push(n);
        });
    }
    canvas.invalidate();
    assert_eq!(*order.lock().expect("not poisoned"), vec![0, 1, 2]);
}

#[test]
fn removing_a_task_detaches_it() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::default());
    let task = canvas.add_task(paint("series"));
    let removed = canvas.remove_task(task).expect("task present");
    assert!(canvas.remove_task(task).is_none());
    let removed: Box<dyn core::any::Any> = removed;
    let removed = removed.downcast::<TestPaint>().expect("concrete type");
    assert_eq!(removed.detached_count(), 1);
}

#[test]
fn replace_tasks_swaps_the_set() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::default());
    let old = canvas.add_task(paint("old"));
    let ids = canvas.replace_tasks([paint("a"), paint("b")]);
    assert_eq!(ids.len(), 2);
    assert_eq!(canvas.drawables_count(), 2);
    assert!(!canvas.lock().contains_task(old));

    let mut ctx = RecordingContext::default();
    canvas.draw_frame(&mut ctx);
    assert_eq!(ctx.initialized(), vec!["a", "b"]);
}

#[test]
fn dispose_empties_and_validates() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::default());
    let task = canvas.add_task(paint("series"));
    let _ = canvas
        .lock()
        .add_geometry(task, Box::new(ScriptedGeometry::new("g", 5)));
    let _ = canvas.add_tracker(Box::new(CountingTracker::new(5)));
    canvas.draw_frame(&mut RecordingContext::default());
    assert!(!canvas.is_valid());

    canvas.dispose();
    assert!(canvas.is_valid());
    assert_eq!(canvas.drawables_count(), 0);
    assert_eq!(canvas.geometry_count(), 0);
    assert_eq!(canvas.lock().tracker_count(), 0);
}

#[test]
fn trackers_can_be_removed() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::default());
    let id = canvas.add_tracker(Box::new(CountingTracker::new(100)));
    canvas.draw_frame(&mut RecordingContext::default());
    assert!(!canvas.is_valid());
    assert!(canvas.remove_tracker(id).is_some());
    canvas.draw_frame(&mut RecordingContext::default());
    assert!(canvas.is_valid());
}

#[test]
fn perf_overlay_draws_summary_last() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::default());
    let _ = canvas.add_task(paint("series"));
    canvas.set_perf_overlay(Some(PerfOverlay {
        paint: Box::new(TestPaint::new("overlay")),
        label: Box::new(TestLabel::default()),
    }));
    let mut ctx = RecordingContext::default();
    canvas.draw_frame(&mut ctx);

    let n = ctx.events.len();
    assert_eq!(ctx.events[n - 1], Event::EndFrame);
    assert_eq!(ctx.events[n - 2], Event::Dispose("overlay"));
    let Event::Label(text) = &ctx.events[n - 3] else {
        panic!("expected label, got {:?}", ctx.events[n - 3]);
    };
    assert_eq!(text.lines().count(), 4, "one metric per line: {text}");
    assert!(text.starts_with("Draw lock time: "));
    assert_eq!(ctx.initialized(), vec!["series", "overlay"]);
    assert!(canvas.is_valid(), "overlay does not affect validity");
}

#[test]
fn measure_times_feed_the_summary() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig {
        perf_buffer_degree: 0,
        ..CanvasConfig::default()
    });
    canvas.record_measure_time(Duration::from_millis(7, Timebase::NANOS));
    canvas.record_measure_visuals_time(Duration::from_millis(1, Timebase::NANOS));
    canvas.draw_frame(&mut RecordingContext::default());
    // A manual clock never moves during a frame.
    assert_eq!(
        canvas.perf_summary(),
        "Draw lock time: 0.0000; Draw time: 0.0000; Measure time: 7.0000; Measure visuals time: 1.0000"
    );
}

#[test]
fn now_reads_the_canvas_clock() {
    let (canvas, clock) = canvas_with_clock(CanvasConfig::default());
    clock.advance_millis(3);
    assert_eq!(canvas.now(), HostTime(3_000_000));
    assert_eq!(canvas.clock().frame_time(), FrameTime(3));
}

#[test]
fn start_point_round_trips() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::default());
    assert_eq!(canvas.start_point(), None);
    canvas.set_start_point(Some(Point::new(4.0, 2.0)));
    assert_eq!(canvas.start_point(), Some(Point::new(4.0, 2.0)));
}

#[derive(Debug, Default)]
struct ExplodingGeometry {
    motion: MotionState,
}

impl Animatable for ExplodingGeometry {
    fn motion(&self) -> &MotionState {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut MotionState {
        &mut self.motion
    }

    fn complete_transition(&mut self) {}
}

impl Drawable<RecordingContext> for ExplodingGeometry {
    fn draw(&mut self, _ctx: &mut RecordingContext) {
        panic!("backend failure");
    }
}

#[test]
#[should_panic(expected = "canvas lock poisoned")]
fn panic_mid_draw_poisons_the_canvas() {
    let (canvas, _clock) = canvas_with_clock(CanvasConfig::default());
    let task = canvas.add_task(paint("series"));
    let _ = canvas
        .lock()
        .add_geometry(task, Box::new(ExplodingGeometry::default()));
    let result = catch_unwind(AssertUnwindSafe(|| {
        canvas.draw_frame(&mut RecordingContext::default());
    }));
    assert!(result.is_err());
    let _ = canvas.drawables_count();
}

/// Backend that counts frames whose bracketing overlaps another frame.
#[derive(Debug)]
struct ExclusiveContext {
    active: Arc<AtomicUsize>,
    overlaps: Arc<AtomicUsize>,
    frames: usize,
}

impl DrawContext for ExclusiveContext {
    fn begin_frame(&mut self) {
        if self.active.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        thread::sleep(core::time::Duration::from_micros(200));
    }

    fn end_frame(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.frames += 1;
    }
}

fn run_frames<C: DrawContext + 'static>(canvas: &MotionCanvas<C>, ctx: &mut C, frames: usize) {
    for _ in 0..frames {
        canvas.draw_frame(ctx);
    }
}

#[test]
fn held_scene_guard_blocks_draw_frame() {
    let canvas = Arc::new(Canvas::with_clock(
        CanvasConfig::default(),
        ManualClock::new(),
    ));
    let finished = Arc::new(AtomicBool::new(false));
    let barrier = Arc::new(Barrier::new(2));

    let guard = canvas.lock();
    let handle = {
        let canvas = Arc::clone(&canvas);
        let finished = Arc::clone(&finished);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            canvas.draw_frame(&mut RecordingContext::default());
            finished.store(true, Ordering::SeqCst);
        })
    };
    barrier.wait();
    thread::sleep(core::time::Duration::from_millis(50));
    assert!(
        !finished.load(Ordering::SeqCst),
        "frame ran while the scene was locked"
    );
    assert_eq!(guard.task_count(), 0);
    drop(guard);

    handle.join().expect("draw thread panicked");
    assert!(finished.load(Ordering::SeqCst));
    assert!(canvas.is_valid());
}

#[test]
fn concurrent_frames_never_overlap() {
    const FRAMES: usize = 20;
    let canvas: Arc<MotionCanvas<ExclusiveContext>> = Arc::new(MotionCanvas::with_clock(
        CanvasConfig::default(),
        ManualClock::new(),
    ));
    let active = counter();
    let overlaps = counter();
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let canvas = Arc::clone(&canvas);
            let barrier = Arc::clone(&barrier);
            let mut ctx = ExclusiveContext {
                active: Arc::clone(&active),
                overlaps: Arc::clone(&overlaps),
                frames: 0,
            };
            thread::spawn(move || {
                barrier.wait();
                run_frames(&canvas, &mut ctx, FRAMES);
                ctx.frames
            })
        })
        .collect();

    let drawn: usize = handles
        .into_iter()
        .map(|h| h.join().expect("draw thread panicked"))
        .sum();
    assert_eq!(drawn, 2 * FRAMES);
    assert_eq!(overlaps.load(Ordering::SeqCst), 0, "frames overlapped");
    assert_eq!(active.load(Ordering::SeqCst), 0);
}

#[cfg(feature = "trace")]
mod trace {
    use std::sync::Mutex;

    use super::*;
    use crate::trace::{FrameBeginEvent, FrameEndEvent, NotifyEvent, PhaseBeginEvent};

    #[derive(Clone, Default)]
    struct SharedLog(Arc<Mutex<Vec<String>>>);

    impl SharedLog {
        fn lines(&self) -> Vec<String> {
            self.0.lock().expect("not poisoned").clone()
        }

        fn push(&self, line: String) {
            self.0.lock().expect("not poisoned").push(line);
        }
    }

    impl TraceSink for SharedLog {
        fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
            self.push(format!("begin {} t={}", e.frame_index, e.frame_time.as_millis()));
        }

        fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
            self.push(format!("phase {}", e.phase.name()));
        }

        fn on_frame_end(&mut self, e: &FrameEndEvent) {
            self.push(format!("end {} valid={}", e.frame_index, e.is_valid));
        }

        fn on_notify(&mut self, e: &NotifyEvent) {
            self.push(format!("notify {:?}", e.kind));
        }

        fn on_perf_summary(&mut self, frame_index: u64, summary: &str) {
            assert!(summary.contains("; "), "single-line summary");
            self.push(format!("perf {frame_index}"));
        }
    }

    #[test]
    fn verbose_frames_emit_events() {
        let (canvas, _clock) =
            canvas_with_clock(CanvasConfig::default().with_verbose_logging(true));
        let log = SharedLog::default();
        canvas.set_trace_sink(Some(Box::new(log.clone())));
        canvas.draw_frame(&mut RecordingContext::default());
        assert_eq!(
            log.lines(),
            [
                "begin 1 t=0",
                "phase tasks",
                "phase trackers",
                "phase removal",
                "end 1 valid=true",
                "perf 1",
                "notify Validated",
            ]
        );
    }

    #[test]
    fn perf_summary_is_rate_limited() {
        let (canvas, clock) =
            canvas_with_clock(CanvasConfig::default().with_verbose_logging(true));
        let log = SharedLog::default();
        canvas.set_trace_sink(Some(Box::new(log.clone())));
        for _ in 0..7 {
            canvas.draw_frame(&mut RecordingContext::default());
            clock.advance_millis(100);
        }
        let perf: Vec<_> = log
            .lines()
            .into_iter()
            .filter(|l| l.starts_with("perf"))
            .collect();
        // Frame times 0, 100, ..., 600: logged at 0 and 500.
        assert_eq!(perf, ["perf 1", "perf 6"]);
    }

    #[test]
    fn quiet_config_emits_nothing() {
        let (canvas, _clock) = canvas_with_clock(CanvasConfig::default());
        let log = SharedLog::default();
        canvas.set_trace_sink(Some(Box::new(log.clone())));
        canvas.draw_frame(&mut RecordingContext::default());
        canvas.clear();
        assert!(log.lines().is_empty());
    }

    #[test]
    fn clear_is_traced() {
        let (canvas, _clock) =
            canvas_with_clock(CanvasConfig::default().with_verbose_logging(true));
        let log = SharedLog::default();
        canvas.set_trace_sink(Some(Box::new(log.clone())));
        canvas.clear();
        assert_eq!(log.lines(), ["notify Invalidated"]);
        assert!(canvas.take_trace_sink().is_some());
    }
}
