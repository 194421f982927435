// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract between the canvas and a drawing backend.
//!
//! The canvas never inspects the backend. It needs three capabilities:
//!
//! - **Frame bracketing**: [`DrawContext::begin_frame`] and
//!   [`DrawContext::end_frame`] surround everything drawn in one frame.
//! - **Paint setup**: a [`Paint`] prepares per-frame backend resources
//!   (brushes, shaders, clip state) in [`Paint::initialize`] and releases them
//!   in [`Paint::dispose`]. Its geometries draw in between.
//! - **Geometry rendering**: a [`Drawable`] renders itself against the
//!   context and reports through its [`MotionState`] whether it is still
//!   animating.
//!
//! The chart model decides *what* to draw; backend crates decide *how*. Both
//! meet here.
//!
//! # Frame loop pseudocode
//!
//! ```rust,ignore
//! canvas.on_invalidated(|_| host.request_redraw());
//! canvas.on_validated(|_| host.stop_redraw_loop());
//!
//! fn on_redraw(ctx: &mut SkiaContext) {
//!     canvas.draw_frame(ctx);
//!     if !canvas.is_valid() {
//!         host.request_redraw();
//!     }
//! }
//! ```
//!
//! [`MotionState`]: crate::motion::MotionState

use core::any::Any;

use crate::motion::Animatable;

/// A backend frame target.
pub trait DrawContext {
    /// Called once, under the canvas lock, before anything is drawn.
    fn begin_frame(&mut self);

    /// Called once, under the canvas lock, after everything is drawn.
    fn end_frame(&mut self);
}

/// A geometry that renders itself against a backend context `C`.
pub trait Drawable<C>: Animatable + Any {
    /// Renders at the current frame time.
    ///
    /// Implementations read their animated values here; a value still in
    /// transition clears the settle flag.
    fn draw(&mut self, ctx: &mut C);
}

/// Paint behaviour of a task: z-order, pause state, and per-frame resources.
pub trait Paint<C>: Animatable + Any {
    /// Draw-order key. Lower values draw first.
    fn z_index(&self) -> i32 {
        0
    }

    /// A paused paint keeps its geometries animating in the bookkeeping
    /// sense but does not render them.
    fn is_paused(&self) -> bool {
        false
    }

    /// Prepares backend resources before the task's geometries draw.
    fn initialize(&mut self, ctx: &mut C);

    /// Releases per-frame resources. Runs after every draw, including the
    /// frame in which the task is removed.
    fn dispose(&mut self, ctx: &mut C) {
        _ = ctx;
    }

    /// Called when the task leaves its canvas, so the paint can drop any
    /// state tied to that canvas.
    fn on_detached(&mut self) {}
}

/// A drawable text geometry, used for the perf overlay.
pub trait Label<C>: Drawable<C> {
    /// Replaces the displayed text.
    fn set_text(&mut self, text: &str);
}

/// Optional diagnostic overlay drawn on top of every frame.
///
/// The label shows the canvas perf summary. It is drawn after all tasks and
/// does not contribute to frame validity.
pub struct PerfOverlay<C> {
    /// Paint the label is drawn with.
    pub paint: Box<dyn Paint<C>>,
    /// Label receiving the summary text.
    pub label: Box<dyn Label<C>>,
}

impl<C> core::fmt::Debug for PerfOverlay<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PerfOverlay").finish_non_exhaustive()
    }
}
