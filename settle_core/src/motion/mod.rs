// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation state shared by every entity the canvas advances.
//!
//! Each animatable (paint task, geometry, tracker) carries a [`MotionState`]:
//!
//! - `is_valid`: settled; no further visual change without new input. The
//!   canvas sets it to `true` before each visit and the entity clears it
//!   again while any of its [`MotionProperty`] values is still moving.
//! - `current_time`: the frame stamp written by the canvas.
//! - `remove_on_completed`: one-shot entities the canvas detaches once
//!   settled.
//!
//! A typical geometry keeps its animated values as [`MotionProperty`] fields
//! next to its state and reads them while drawing:
//!
//! ```rust,ignore
//! fn draw(&mut self, ctx: &mut Ctx) {
//!     let x = self.x.get(&mut self.motion);
//!     ctx.fill_circle(x, self.y, self.radius);
//! }
//! ```

mod easing;
mod property;

pub use easing::Easing;
pub use property::{Animation, Interpolate, MotionProperty};

use crate::time::FrameTime;

/// Settle flag, frame stamp, and one-shot flag of an animatable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionState {
    is_valid: bool,
    current_time: FrameTime,
    remove_on_completed: bool,
}

impl Default for MotionState {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionState {
    /// A fresh state. It starts invalid so the first frame always draws.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            is_valid: false,
            current_time: FrameTime::ZERO,
            remove_on_completed: false,
        }
    }

    /// A state flagged for removal once it settles.
    #[must_use]
    pub const fn one_shot() -> Self {
        Self {
            remove_on_completed: true,
            ..Self::new()
        }
    }

    /// Whether the entity has settled.
    #[inline]
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Sets the settle flag.
    #[inline]
    pub fn set_valid(&mut self, valid: bool) {
        self.is_valid = valid;
    }

    /// Clears the settle flag, re-arming the entity for the next frame.
    #[inline]
    pub fn invalidate(&mut self) {
        self.is_valid = false;
    }

    /// The frame stamp written by the canvas on its last visit.
    #[inline]
    #[must_use]
    pub const fn current_time(&self) -> FrameTime {
        self.current_time
    }

    /// Stamps the frame time.
    #[inline]
    pub fn set_current_time(&mut self, time: FrameTime) {
        self.current_time = time;
    }

    /// Whether the canvas should detach the entity once it settles.
    #[inline]
    #[must_use]
    pub const fn remove_on_completed(&self) -> bool {
        self.remove_on_completed
    }

    /// Sets the one-shot flag.
    #[inline]
    pub fn set_remove_on_completed(&mut self, remove: bool) {
        self.remove_on_completed = remove;
    }
}

/// An entity whose state advances with the frame clock.
///
/// Implemented by paint behaviours, geometries, and standalone trackers.
/// Trackers have no visual of their own; the canvas calls
/// [`update`](Self::update) on them once per frame after stamping the time.
pub trait Animatable: Send {
    /// The entity's motion state.
    fn motion(&self) -> &MotionState;

    /// Mutable access to the motion state.
    fn motion_mut(&mut self) -> &mut MotionState;

    /// Snaps every running transition to its final value.
    fn complete_transition(&mut self);

    /// Advances a tracker against its freshly stamped time.
    ///
    /// Geometries and paints advance while drawing, so the default does
    /// nothing.
    fn update(&mut self) {}
}
