// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated host redraw loop over an animated bar chart.
//!
//! A [`ManualClock`] stands in for the display: each host frame advances it
//! by 16 ms. The host draws only while the canvas reports that something is
//! still moving, mirroring how a UI toolkit would schedule redraws from the
//! invalidated/validated notifications.
//!
//! Events go to a [`PrettyPrintSink`] on stdout and to a [`RecorderSink`],
//! whose bytes are exported as Chrome trace JSON at the end (default path
//! `trace.json`, or the first command-line argument).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use kurbo::{Point, Rect};

use settle_core::backend::{DrawContext, Drawable, Label, Paint, PerfOverlay};
use settle_core::canvas::MotionCanvas;
use settle_core::clock::{ManualClock, TimeSource};
use settle_core::config::CanvasConfig;
use settle_core::motion::{Animatable, Animation, Easing, MotionProperty, MotionState};
use settle_core::scene::{GeometryId, TaskId};
use settle_core::time::{Duration, Timebase};
use settle_core::trace::{
    FrameBeginEvent, FrameEndEvent, NotifyEvent, PhaseBeginEvent, PhaseEndEvent, SharedSink,
    TraceSink,
};

use settle_debug::pretty::PrettyPrintSink;
use settle_debug::recorder::RecorderSink;

const FRAME_MS: u64 = 16;
/// Safety net so a never-settling scene cannot spin forever.
const MAX_FRAMES_PER_BURST: u32 = 240;

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Counts primitives instead of rasterizing them.
#[derive(Debug, Default)]
struct CountingBackend {
    frames: u32,
    primitives: u32,
    highlight: Option<Point>,
    overlay_text: String,
}

impl DrawContext for CountingBackend {
    fn begin_frame(&mut self) {
        self.primitives = 0;
        self.highlight = None;
    }

    fn end_frame(&mut self) {
        self.frames += 1;
    }
}

// ---------------------------------------------------------------------------
// Paints and geometries
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct FillPaint {
    motion: MotionState,
    z_index: i32,
}

impl FillPaint {
    fn new(z_index: i32) -> Self {
        Self {
            motion: MotionState::new(),
            z_index,
        }
    }
}

impl Animatable for FillPaint {
    fn motion(&self) -> &MotionState {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut MotionState {
        &mut self.motion
    }

    fn complete_transition(&mut self) {}
}

impl Paint<CountingBackend> for FillPaint {
    fn z_index(&self) -> i32 {
        self.z_index
    }

    fn initialize(&mut self, _ctx: &mut CountingBackend) {}
}

/// A bar whose rectangle eases toward its data value.
#[derive(Debug)]
struct Bar {
    motion: MotionState,
    rect: MotionProperty<Rect>,
}

impl Bar {
    fn new(x: f64) -> Self {
        let baseline = Rect::new(x, 200.0, x + 20.0, 200.0);
        Self {
            motion: MotionState::new(),
            rect: MotionProperty::new(baseline)
                .with_animation(Animation::new(400, Easing::CubicOut)),
        }
    }

    fn set_value(&mut self, value: f64) {
        let r = self.rect.target();
        self.rect
            .set(Rect::new(r.x0, 200.0 - value, r.x1, 200.0), &mut self.motion);
    }
}

impl Animatable for Bar {
    fn motion(&self) -> &MotionState {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut MotionState {
        &mut self.motion
    }

    fn complete_transition(&mut self) {
        self.rect.complete();
    }
}

impl Drawable<CountingBackend> for Bar {
    fn draw(&mut self, ctx: &mut CountingBackend) {
        let rect = self.rect.get(&mut self.motion);
        if rect.height() > 0.0 {
            ctx.primitives += 1;
        }
    }
}

/// A highlight ring that grows once around a point, then removes itself.
#[derive(Debug)]
struct Ripple {
    motion: MotionState,
    center: Point,
    radius: MotionProperty<f64>,
}

impl Ripple {
    fn at(center: Point) -> Self {
        let mut motion = MotionState::one_shot();
        let mut radius =
            MotionProperty::new(0.0).with_animation(Animation::new(250, Easing::QuadraticOut));
        radius.set(24.0, &mut motion);
        Self {
            motion,
            center,
            radius,
        }
    }
}

impl Animatable for Ripple {
    fn motion(&self) -> &MotionState {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut MotionState {
        &mut self.motion
    }

    fn complete_transition(&mut self) {
        self.radius.complete();
    }
}

impl Drawable<CountingBackend> for Ripple {
    fn draw(&mut self, ctx: &mut CountingBackend) {
        let radius = self.radius.get(&mut self.motion);
        if radius > 0.0 {
            ctx.primitives += 1;
            ctx.highlight = Some(self.center);
        }
    }
}

/// Overlay label that keeps the most recent perf summary.
#[derive(Debug, Default)]
struct OverlayText {
    motion: MotionState,
    text: String,
}

impl Animatable for OverlayText {
    fn motion(&self) -> &MotionState {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut MotionState {
        &mut self.motion
    }

    fn complete_transition(&mut self) {}
}

impl Drawable<CountingBackend> for OverlayText {
    fn draw(&mut self, ctx: &mut CountingBackend) {
        ctx.overlay_text.clone_from(&self.text);
    }
}

impl Label<CountingBackend> for OverlayText {
    fn set_text(&mut self, text: &str) {
        text.clone_into(&mut self.text);
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Forwards every event to both the pretty printer and the recorder.
#[derive(Debug)]
struct Tee {
    pretty: PrettyPrintSink,
    recorder: RecorderSink,
}

impl TraceSink for Tee {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.pretty.on_frame_begin(e);
        self.recorder.on_frame_begin(e);
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.pretty.on_phase_begin(e);
        self.recorder.on_phase_begin(e);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.pretty.on_phase_end(e);
        self.recorder.on_phase_end(e);
    }

    fn on_frame_end(&mut self, e: &FrameEndEvent) {
        self.pretty.on_frame_end(e);
        self.recorder.on_frame_end(e);
    }

    fn on_notify(&mut self, e: &NotifyEvent) {
        self.pretty.on_notify(e);
        self.recorder.on_notify(e);
    }

    fn on_perf_summary(&mut self, frame_index: u64, summary: &str) {
        self.pretty.on_perf_summary(frame_index, summary);
        self.recorder.on_perf_summary(frame_index, summary);
    }
}

// ---------------------------------------------------------------------------
// Host loop
// ---------------------------------------------------------------------------

/// Redraws until the canvas settles; returns the number of frames drawn.
fn run_until_settled(
    canvas: &MotionCanvas<CountingBackend>,
    clock: &ManualClock,
    backend: &mut CountingBackend,
) -> u32 {
    let mut frames = 0;
    while !canvas.is_valid() && frames < MAX_FRAMES_PER_BURST {
        clock.advance_millis(FRAME_MS);
        let measure_start = canvas.now();
        // Stands in for layout work done by the chart before drawing.
        clock.advance(Duration(250_000));
        canvas.record_measure_time(canvas.now().saturating_duration_since(measure_start));
        canvas.draw_frame(backend);
        frames += 1;
    }
    frames
}

fn main() {
    let out_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "trace.json".to_owned());

    let clock = ManualClock::new();
    let timebase: Timebase = clock.timebase();
    let config = CanvasConfig::interactive().with_verbose_logging(true);
    let canvas: MotionCanvas<CountingBackend> =
        MotionCanvas::with_clock(config, clock.clone());

    let tee = SharedSink::new(Tee {
        pretty: PrettyPrintSink::new(Box::new(std::io::stdout()), timebase),
        recorder: RecorderSink::new(),
    });
    canvas.set_trace_sink(Some(Box::new(tee.clone())));
    canvas.set_perf_overlay(Some(PerfOverlay {
        paint: Box::new(FillPaint::new(i32::MAX)),
        label: Box::new(OverlayText::default()),
    }));

    let invalidations = Arc::new(AtomicU32::new(0));
    let settles = Arc::new(AtomicU32::new(0));
    {
        let invalidations = Arc::clone(&invalidations);
        canvas.on_invalidated(move |_| {
            invalidations.fetch_add(1, Ordering::Relaxed);
        });
        let settles = Arc::clone(&settles);
        canvas.on_validated(move |_| {
            settles.fetch_add(1, Ordering::Relaxed);
        });
    }

    // -- model --------------------------------------------------------------
    let values = [[40.0, 120.0, 80.0], [150.0, 60.0, 100.0]];
    let bars_task: TaskId = canvas.add_task(Box::new(FillPaint::new(0)));
    let highlights: TaskId = canvas.add_task(Box::new(FillPaint::new(1)));
    let bar_ids: Vec<GeometryId> = {
        let mut scene = canvas.lock();
        (0..values[0].len())
            .map(|i| {
                let mut bar = Bar::new(30.0 * i as f64);
                bar.set_value(values[0][i]);
                scene.add_geometry(bars_task, Box::new(bar))
            })
            .collect()
    };
    canvas.invalidate();

    let mut backend = CountingBackend::default();
    let first = run_until_settled(&canvas, &clock, &mut backend);
    println!("-- initial layout settled after {first} frames");

    // -- data update --------------------------------------------------------
    {
        let mut scene = canvas.lock();
        for (i, id) in bar_ids.iter().enumerate() {
            if let Some(bar) = scene.geometry_mut::<Bar>(bars_task, *id) {
                bar.set_value(values[1][i]);
            }
        }
        scene.add_geometry(highlights, Box::new(Ripple::at(Point::new(40.0, 50.0))));
    }
    canvas.invalidate();
    let second = run_until_settled(&canvas, &clock, &mut backend);
    println!(
        "-- update settled after {second} frames, {} geometries left",
        canvas.geometry_count()
    );

    // -- same update with animations disabled -------------------------------
    canvas.set_config(CanvasConfig::snapshot().with_verbose_logging(true));
    {
        let mut scene = canvas.lock();
        for (i, id) in bar_ids.iter().enumerate() {
            if let Some(bar) = scene.geometry_mut::<Bar>(bars_task, *id) {
                bar.set_value(values[0][i]);
            }
        }
    }
    canvas.invalidate();
    let third = run_until_settled(&canvas, &clock, &mut backend);
    println!("-- snapshot settled after {third} frame(s)");

    println!(
        "-- {} frames drawn, {} invalidations, {} settles",
        backend.frames,
        invalidations.load(Ordering::Relaxed),
        settles.load(Ordering::Relaxed),
    );
    println!(
        "-- last frame: {} primitives, highlight {:?}",
        backend.primitives, backend.highlight
    );
    println!("-- overlay:\n{}", backend.overlay_text);

    // -- export Chrome trace ------------------------------------------------
    canvas.dispose();
    drop(canvas.take_trace_sink());
    let bytes = tee.with(|t| t.recorder.as_bytes().to_vec());
    let file = File::create(&out_path).expect("failed to create trace file");
    let mut writer = BufWriter::new(file);
    settle_debug::chrome::export(&bytes, timebase, &mut writer)
        .expect("failed to write Chrome trace");
    writer.flush().expect("failed to flush Chrome trace");

    println!("Wrote {out_path} ({} bytes recorded)", bytes.len());
}
