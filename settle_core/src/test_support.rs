// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles shared by the unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{DrawContext, Drawable, Label, Paint};
use crate::motion::{Animatable, Animation, Easing, MotionProperty, MotionState};

/// One backend call seen by a [`RecordingContext`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Event {
    BeginFrame,
    EndFrame,
    Init(&'static str),
    Draw(&'static str),
    Dispose(&'static str),
    Label(String),
}

/// A backend that records every call.
#[derive(Debug, Default)]
pub(crate) struct RecordingContext {
    pub(crate) events: Vec<Event>,
}

impl RecordingContext {
    /// Paint names, in `initialize` order.
    pub(crate) fn initialized(&self) -> Vec<&'static str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Init(name) => Some(*name),
                _ => None,
            })
            .collect()
    }

    /// Geometry names, in draw order.
    pub(crate) fn drawn(&self) -> Vec<&'static str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Draw(name) => Some(*name),
                _ => None,
            })
            .collect()
    }
}

impl DrawContext for RecordingContext {
    fn begin_frame(&mut self) {
        self.events.push(Event::BeginFrame);
    }

    fn end_frame(&mut self) {
        self.events.push(Event::EndFrame);
    }
}

/// Counts down once per step; invalid while anything is left.
fn step(state: &mut MotionState, remaining: &mut u32) {
    *remaining = remaining.saturating_sub(1);
    if *remaining > 0 {
        state.invalidate();
    }
}

/// A paint whose own transition takes a scripted number of frames.
#[derive(Debug)]
pub(crate) struct TestPaint {
    name: &'static str,
    motion: MotionState,
    z_index: i32,
    paused: bool,
    remaining: u32,
    detached: Arc<AtomicUsize>,
}

impl TestPaint {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            motion: MotionState::new(),
            z_index: 0,
            paused: false,
            remaining: 0,
            detached: Arc::default(),
        }
    }

    pub(crate) fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub(crate) fn paused(mut self) -> Self {
        self.paused = true;
        self
    }

    pub(crate) fn one_shot(mut self) -> Self {
        self.motion.set_remove_on_completed(true);
        self
    }

    /// Stays unsettled for `frames` initializations.
    pub(crate) fn settling_after(mut self, frames: u32) -> Self {
        self.remaining = frames;
        self
    }

    pub(crate) fn set_z_index(&mut self, z_index: i32) {
        self.z_index = z_index;
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn detached_count(&self) -> usize {
        self.detached.load(Ordering::Relaxed)
    }

    pub(crate) fn detached_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.detached)
    }
}

impl Animatable for TestPaint {
    fn motion(&self) -> &MotionState {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut MotionState {
        &mut self.motion
    }

    fn complete_transition(&mut self) {
        self.remaining = 0;
    }
}

impl Paint<RecordingContext> for TestPaint {
    fn z_index(&self) -> i32 {
        self.z_index
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn initialize(&mut self, ctx: &mut RecordingContext) {
        ctx.events.push(Event::Init(self.name));
        step(&mut self.motion, &mut self.remaining);
    }

    fn dispose(&mut self, ctx: &mut RecordingContext) {
        ctx.events.push(Event::Dispose(self.name));
    }

    fn on_detached(&mut self) {
        self.detached.fetch_add(1, Ordering::Relaxed);
    }
}

/// A geometry that settles after a scripted number of draws.
#[derive(Debug)]
pub(crate) struct ScriptedGeometry {
    name: &'static str,
    motion: MotionState,
    remaining: u32,
}

impl ScriptedGeometry {
    pub(crate) fn new(name: &'static str, frames: u32) -> Self {
        Self {
            name,
            motion: MotionState::new(),
            remaining: frames,
        }
    }

    pub(crate) fn one_shot(mut self) -> Self {
        self.motion.set_remove_on_completed(true);
        self
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    /// Starts a new transition lasting `frames` draws.
    pub(crate) fn rearm(&mut self, frames: u32) {
        self.remaining = frames;
        self.motion.invalidate();
    }
}

impl Animatable for ScriptedGeometry {
    fn motion(&self) -> &MotionState {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut MotionState {
        &mut self.motion
    }

    fn complete_transition(&mut self) {
        self.remaining = 0;
    }
}

impl Drawable<RecordingContext> for ScriptedGeometry {
    fn draw(&mut self, ctx: &mut RecordingContext) {
        ctx.events.push(Event::Draw(self.name));
        step(&mut self.motion, &mut self.remaining);
    }
}

/// A geometry driven by a real [`MotionProperty`].
#[derive(Debug)]
pub(crate) struct SlidingDot {
    motion: MotionState,
    x: MotionProperty<f64>,
    pub(crate) last_x: f64,
}

impl SlidingDot {
    pub(crate) fn new(duration_ms: u64) -> Self {
        Self {
            motion: MotionState::new(),
            x: MotionProperty::new(0.0).with_animation(Animation::new(duration_ms, Easing::Linear)),
            last_x: 0.0,
        }
    }

    pub(crate) fn slide_to(&mut self, x: f64) {
        self.x.set(x, &mut self.motion);
    }
}

impl Animatable for SlidingDot {
    fn motion(&self) -> &MotionState {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut MotionState {
        &mut self.motion
    }

    fn complete_transition(&mut self) {
        self.x.complete();
    }
}

impl Drawable<RecordingContext> for SlidingDot {
    fn draw(&mut self, ctx: &mut RecordingContext) {
        self.last_x = self.x.get(&mut self.motion);
        ctx.events.push(Event::Draw("dot"));
    }
}

/// A tracker that needs a scripted number of updates to settle.
#[derive(Debug)]
pub(crate) struct CountingTracker {
    motion: MotionState,
    remaining: u32,
}

impl CountingTracker {
    pub(crate) fn new(frames: u32) -> Self {
        Self {
            motion: MotionState::new(),
            remaining: frames,
        }
    }
}

impl Animatable for CountingTracker {
    fn motion(&self) -> &MotionState {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut MotionState {
        &mut self.motion
    }

    fn complete_transition(&mut self) {
        self.remaining = 0;
    }

    fn update(&mut self) {
        step(&mut self.motion, &mut self.remaining);
    }
}

/// A label that records the text it draws.
#[derive(Debug, Default)]
pub(crate) struct TestLabel {
    motion: MotionState,
    text: String,
}

impl Animatable for TestLabel {
    fn motion(&self) -> &MotionState {
        &self.motion
    }

    fn motion_mut(&mut self) -> &mut MotionState {
        &mut self.motion
    }

    fn complete_transition(&mut self) {}
}

impl Drawable<RecordingContext> for TestLabel {
    fn draw(&mut self, ctx: &mut RecordingContext) {
        ctx.events.push(Event::Label(self.text.clone()));
    }
}

impl Label<RecordingContext> for TestLabel {
    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }
}
